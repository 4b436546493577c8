use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsfError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
    #[error("Provisioning failed: {0}")]
    ProvisionError(String),
    #[error("{0}")]
    RenderError(String),
}
