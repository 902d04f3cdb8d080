use thiserror::Error;

#[derive(Debug, Error)]
pub enum KerbError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Rest(#[from] kerbside_rest::RestError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
