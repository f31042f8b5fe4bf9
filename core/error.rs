use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Configuration file '{}' not found. Make sure it exists in the working directory.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Configuration Parsing Error: Path '{path}', Error: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration Key Error: '{key}' {reason}")]
    ConfigKey { key: &'static str, reason: String },

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The file {reference} was not found in any of the configured projects.")]
    NotFound { reference: String },

    #[error("The path '{}' is not inside any of the configured projects.", .path.display())]
    Containment { path: PathBuf },

    #[error("Data Loading Error: {0}")]
    DataLoading(String),
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        AppError::DataLoading(format!("UTF-8 decoding error: {}", err))
    }
}

impl AppError {
    /// True for the resolution failures raised while mapping a reference to a root.
    pub fn is_resolution(&self) -> bool {
        matches!(self, AppError::NotFound { .. } | AppError::Containment { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::ConfigNotFound(_)
                | AppError::ConfigParse { .. }
                | AppError::ConfigKey { .. }
        )
    }
}
