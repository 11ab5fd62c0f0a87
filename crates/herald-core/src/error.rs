//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Missing required context key: {key}")]
    MissingKey { key: String },

    #[error("Missing credential `{name}`: set it in the configuration or export {env_var}")]
    MissingCredential { name: String, env_var: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
