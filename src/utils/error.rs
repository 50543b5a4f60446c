use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuakeError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Expected {expected} features, got {actual}")]
    FeatureArityError { expected: usize, actual: usize },

    #[error("Model '{model}' unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Model '{model}' returned an unusable prediction: {message}")]
    PredictionError { model: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Data,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuakeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuakeError::HttpError(_) => ErrorCategory::Network,
            QuakeError::IoError(_) | QuakeError::ZipError(_) => ErrorCategory::Io,
            QuakeError::ConfigError { .. }
            | QuakeError::MissingConfigError { .. }
            | QuakeError::InvalidConfigValueError { .. }
            | QuakeError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            QuakeError::CsvError(_)
            | QuakeError::SerializationError(_)
            | QuakeError::ProcessingError { .. }
            | QuakeError::ValidationError { .. }
            | QuakeError::FeatureArityError { .. } => ErrorCategory::Data,
            QuakeError::ModelUnavailable { .. } | QuakeError::PredictionError { .. } => {
                ErrorCategory::Model
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 模型錯誤只會降級輸出，不會中斷流程
            ErrorCategory::Model => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            QuakeError::HttpError(_) => {
                "Check network connectivity and that the catalog or model endpoint is reachable"
            }
            QuakeError::IoError(_) | QuakeError::ZipError(_) => {
                "Check that the input file exists and the output directory is writable"
            }
            QuakeError::CsvError(_) => "Make sure the catalog is a well-formed CSV file with a header row",
            QuakeError::SerializationError(_) => "Check the JSON file or response format",
            QuakeError::ConfigError { .. }
            | QuakeError::MissingConfigError { .. }
            | QuakeError::InvalidConfigValueError { .. }
            | QuakeError::ConfigValidationError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            QuakeError::ProcessingError { .. } | QuakeError::ValidationError { .. } => {
                "Verify the depth column name and the input data"
            }
            QuakeError::FeatureArityError { .. } => {
                "Provide exactly the ten catalog features in the documented order"
            }
            QuakeError::ModelUnavailable { .. } | QuakeError::PredictionError { .. } => {
                "Check the model endpoint and scaler settings; rule-based classification still works"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            QuakeError::HttpError(e) => format!("Could not reach remote service: {}", e),
            QuakeError::IoError(e) => format!("File operation failed: {}", e),
            QuakeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            QuakeError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuakeError>;
