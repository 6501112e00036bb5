use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutopostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration value: {key}")]
    MissingSetting { key: &'static str },
}

pub type Result<T> = std::result::Result<T, AutopostError>;
