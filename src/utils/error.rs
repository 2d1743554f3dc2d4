use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream API error: {status}")]
    UpstreamStatus { status: u16 },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Configuration,
    Request,
    System,
}

impl RelayError {
    /// 錯誤分類，只用於伺服器端日誌；客戶端一律只看到通用的 500
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::ApiError(_) | RelayError::UpstreamStatus { .. } => ErrorCategory::Upstream,
            RelayError::ConfigError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::InvalidConfigValueError { .. }
            | RelayError::ConfigValidationError { .. }
            | RelayError::UrlError(_) => ErrorCategory::Configuration,
            RelayError::SerializationError(_) | RelayError::InvalidRequest { .. } => {
                ErrorCategory::Request
            }
            RelayError::IoError(_) => ErrorCategory::System,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
