use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetProbeError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet '{name}' could not be read: {message}")]
    WorksheetUnreadable { name: String, message: String },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid column reference: {0}")]
    InvalidColumn(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetProbeError>;
