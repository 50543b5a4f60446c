use crate::domain::ports::ConfigProvider;
use crate::utils::error::{QuakeError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_source,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEPTH_COLUMN: &str = "depth";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// CSV 路徑或 http(s) 網址
    pub input: String,
    pub depth_column: Option<String>,
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub tree_endpoint: Option<String>,
    pub sequence_endpoint: Option<String>,
    pub scaler_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl ModelsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS))
    }
}

impl Validate for ModelsConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.tree_endpoint {
            validate_url("models.tree_endpoint", endpoint)?;
        }
        if let Some(endpoint) = &self.sequence_endpoint {
            validate_url("models.sequence_endpoint", endpoint)?;
        }
        if let Some(path) = &self.scaler_path {
            validate_path("models.scaler_path", path)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("models.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub include_danger: Option<bool>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuakeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuakeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_HOST})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuakeError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> &str {
        &self.source.input
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn depth_column(&self) -> &str {
        self.source
            .depth_column
            .as_deref()
            .unwrap_or(DEFAULT_DEPTH_COLUMN)
    }

    fn include_danger(&self) -> bool {
        self.load.include_danger.unwrap_or(false)
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn delimiter(&self) -> u8 {
        match self.source.delimiter {
            Some(c) if c.is_ascii() => c as u8,
            _ => b',',
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_source("source.input", &self.source.input)?;
        validate_non_empty_string("source.depth_column", self.depth_column())?;

        if let Some(c) = self.source.delimiter {
            if !c.is_ascii() {
                return Err(QuakeError::InvalidConfigValueError {
                    field: "source.delimiter".to_string(),
                    value: c.to_string(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                });
            }
        }

        validate_path("load.output_path", &self.load.output_path)?;
        if let Some(name) = self.archive_name() {
            crate::utils::validation::validate_file_extensions(
                "load.compression.filename",
                &[name.to_string()],
                &["zip"],
            )?;
        }

        self.models.validate()
    }
}
