use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinanceClientError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown resource: {name}")]
    UnknownResource { name: String },

    #[error("Calculation error: {message}")]
    Calculation { message: String },
}

impl FinanceClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn calculation(message: impl Into<String>) -> Self {
        Self::Calculation {
            message: message.into(),
        }
    }

    /// True for failures that happened talking to the service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::HttpStatus { .. } | Self::InvalidJson { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Request(e) if e.is_timeout() => {
                "The service did not answer in time; raise --timeout-seconds or retry later"
            }
            Self::Request(_) => "Check the base URL and that the service is reachable",
            Self::HttpStatus { status, .. } if *status >= 500 => {
                "The service reported an internal error; retry later"
            }
            Self::HttpStatus { .. } => "Check the resource path against the service's API index",
            Self::InvalidJson { .. } => {
                "The endpoint did not return JSON; verify the resource path and base URL"
            }
            Self::Serialization(_) => "Check that the input file is valid JSON for this command",
            Self::Io(_) => "Check that the output directory exists and is writable",
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } => {
                "Fix the configuration file or command-line arguments"
            }
            Self::UnknownResource { .. } => "Use one of the configured resource names",
            Self::Calculation { .. } => "Check the projection inputs (years must be at least 1)",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValue { .. }
            | Self::UnknownResource { .. } => 2,
            e if e.is_remote() => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FinanceClientError>;
