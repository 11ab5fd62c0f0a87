//! Error types for target processing

use herald_core::CoreError;
use herald_engine::{EngineError, TemplateError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised before any target runs (model resolution)
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Pipeline stage a target was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Context,
    Render,
    Deliver,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Context => "context",
            Self::Render => "render",
            Self::Deliver => "deliver",
        };
        write!(f, "{}", s)
    }
}

/// Failure of a single pipeline stage
#[derive(Debug, Error)]
pub enum StageError {
    /// Missing key, missing credential, disabled-but-requested target
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("template error in `{field}`: {source}")]
    Template {
        field: String,
        #[source]
        source: TemplateError,
    },

    #[error("delivery failed: {0}")]
    Delivery(#[from] SendError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap an engine failure, naming the offending field or template
    pub fn template(field: &str, err: EngineError) -> Self {
        match err {
            EngineError::Template(source) => Self::Template {
                field: field.to_string(),
                source,
            },
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template { .. })
    }
}

impl From<CoreError> for StageError {
    fn from(err: CoreError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// A stage failure tagged with the target it belongs to
#[derive(Debug, Error)]
#[error("{target} failed during {stage}: {error}")]
pub struct TargetFailure {
    pub target: String,
    pub stage: Stage,
    #[source]
    pub error: StageError,
}

/// Network delivery errors, surfaced verbatim
#[derive(Debug, Error)]
pub enum SendError {
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Credential not available: {name}")]
    Credentials { name: String },
}

impl SendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}
