use crate::config::toml_config::{ModelsConfig, TomlConfig, DEFAULT_DEPTH_COLUMN};
use crate::domain::features::FeatureVector;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{QuakeError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_source, Validate,
};
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Parser)]
#[command(name = "quake-depth")]
#[command(about = "Classify earthquake hypocenter depth as shallow, intermediate or deep")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify depth values given in kilometres
    Classify(ClassifyArgs),
    /// Classify the depth column of a catalog CSV file or URL
    Batch(BatchArgs),
    /// Ask the trained models for the depth class of one event
    Predict(PredictArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// Depth values; anything non-numeric is reported as invalid
    #[arg(required = true, allow_negative_numbers = true)]
    pub depths: Vec<String>,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(long, conflicts_with = "json", help = "Print valid results as CSV")]
    pub csv: bool,

    #[arg(long, help = "Include the danger tier in CSV output")]
    pub danger: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BatchArgs {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Catalog CSV path or http(s) URL
    #[arg(short, long)]
    pub input: Option<String>,

    #[arg(short, long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub depth_column: Option<String>,

    #[arg(long, help = "Add a danger tier column")]
    pub danger: bool,

    /// Bundle outputs into this ZIP file
    #[arg(long)]
    pub zip: Option<String>,

    #[arg(long)]
    pub delimiter: Option<char>,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl BatchArgs {
    /// 將命令列參數覆蓋到 TOML 配置
    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(input) = &self.input {
            config.source.input = input.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if let Some(column) = &self.depth_column {
            config.source.depth_column = Some(column.clone());
        }
        if self.danger {
            config.load.include_danger = Some(true);
        }
        if let Some(zip) = &self.zip {
            config.load.compression = Some(crate::config::toml_config::CompressionConfig {
                enabled: true,
                filename: zip.clone(),
            });
        }
        if let Some(delimiter) = self.delimiter {
            config.source.delimiter = Some(delimiter);
        }
    }
}

impl ConfigProvider for BatchArgs {
    fn source(&self) -> &str {
        self.input.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn depth_column(&self) -> &str {
        self.depth_column.as_deref().unwrap_or(DEFAULT_DEPTH_COLUMN)
    }

    fn include_danger(&self) -> bool {
        self.danger
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    fn delimiter(&self) -> u8 {
        match self.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            _ => b',',
        }
    }
}

impl Validate for BatchArgs {
    fn validate(&self) -> Result<()> {
        let input = self
            .input
            .as_deref()
            .ok_or_else(|| QuakeError::MissingConfigError {
                field: "input".to_string(),
            })?;
        validate_source("input", input)?;
        validate_path("output_path", self.output_path())?;
        validate_non_empty_string("depth_column", self.depth_column())?;
        if let Some(zip) = &self.zip {
            validate_file_extensions("zip", &[zip.clone()], &["zip"])?;
        }
        if matches!(self.delimiter, Some(c) if !c.is_ascii()) {
            return Err(QuakeError::InvalidConfigValueError {
                field: "delimiter".to_string(),
                value: self.delimiter.unwrap_or_default().to_string(),
                reason: "Delimiter must be a single ASCII character".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// JSON file with the ten catalog features; overrides the feature flags
    #[arg(long)]
    pub features: Option<String>,

    #[arg(long, default_value_t = 2023.0)]
    pub year: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub latitude: f64,
    #[arg(long, default_value_t = 120.0)]
    pub longitude: f64,
    #[arg(long, default_value_t = 5.0)]
    pub mag: f64,
    #[arg(long, default_value_t = 80.0)]
    pub gap: f64,
    #[arg(long, default_value_t = 2.0)]
    pub dmin: f64,
    #[arg(long, default_value_t = 0.7)]
    pub rms: f64,
    #[arg(long, default_value_t = 8.0)]
    pub horizontal_error: f64,
    #[arg(long, default_value_t = 5.0)]
    pub depth_error: f64,
    #[arg(long, default_value_t = 0.1)]
    pub mag_error: f64,

    /// TOML configuration file; only the [models] section is used
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub tree_endpoint: Option<String>,

    #[arg(long)]
    pub sequence_endpoint: Option<String>,

    /// Scaler parameters JSON for the sequence model
    #[arg(long)]
    pub scaler: Option<String>,

    #[arg(long, help = "Model request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,
}

impl PredictArgs {
    pub fn feature_vector(&self) -> Result<FeatureVector> {
        let features = match &self.features {
            Some(path) => FeatureVector::from_json_str(&std::fs::read_to_string(path)?)?,
            None => FeatureVector::from_slice(&[
                self.year,
                self.latitude,
                self.longitude,
                self.mag,
                self.gap,
                self.dmin,
                self.rms,
                self.horizontal_error,
                self.depth_error,
                self.mag_error,
            ])?,
        };
        features.validate()?;
        Ok(features)
    }

    pub fn models_config(&self) -> Result<ModelsConfig> {
        let mut models = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.models,
            None => ModelsConfig::default(),
        };

        if let Some(endpoint) = &self.tree_endpoint {
            models.tree_endpoint = Some(endpoint.clone());
        }
        if let Some(endpoint) = &self.sequence_endpoint {
            models.sequence_endpoint = Some(endpoint.clone());
        }
        if let Some(scaler) = &self.scaler {
            models.scaler_path = Some(scaler.clone());
        }
        if let Some(timeout) = self.timeout {
            models.timeout_seconds = Some(timeout);
        }

        models.validate()?;
        Ok(models)
    }
}
