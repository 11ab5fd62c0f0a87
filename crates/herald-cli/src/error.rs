//! CLI error types with exit code handling

use herald_core::CoreError;
use herald_engine::EngineError;
use herald_publish::{PublishError, StageError, TargetFailure};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration file missing or invalid, setting or credential absent
    #[error("Configuration error: {message}")]
    #[diagnostic(code(herald::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Template error: {message}")]
    #[diagnostic(code(herald::cli::template))]
    Template {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A fail-fast run stopped on a failed target
    #[error("{failed} target(s) failed: {first}")]
    #[diagnostic(code(herald::cli::run))]
    RunFailed {
        failed: usize,
        first: String,
        exit_code: i32,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(herald::cli::io))]
    Io { message: String },

    /// Invalid arguments or options
    #[error("{message}")]
    #[diagnostic(code(herald::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Template { .. } => exit_codes::TEMPLATE_ERROR,
            CliError::RunFailed { exit_code, .. } => *exit_code,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
        }
    }

    pub fn usage(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Summarize a failed run by its first failure
    pub fn run_failed<'a>(mut failures: impl Iterator<Item = &'a TargetFailure>) -> Self {
        let Some(first) = failures.next() else {
            return Self::RunFailed {
                failed: 0,
                first: "no failure recorded".to_string(),
                exit_code: exit_codes::ERROR,
            };
        };

        Self::RunFailed {
            failed: 1 + failures.count(),
            first: first.to_string(),
            exit_code: stage_exit_code(&first.error),
        }
    }
}

fn stage_exit_code(error: &StageError) -> i32 {
    match error {
        StageError::Configuration { .. } => exit_codes::CONFIG_ERROR,
        StageError::Template { .. } => exit_codes::TEMPLATE_ERROR,
        StageError::Delivery(_) => exit_codes::DELIVERY_ERROR,
        StageError::Io { .. } => exit_codes::IO_ERROR,
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigNotFound { .. } => CliError::Config {
                message: err.to_string(),
                help: Some("Create herald.yml or point --config at your release file".to_string()),
            },
            CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            other => CliError::Config {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

impl From<PublishError> for CliError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Core(e) => e.into(),
            PublishError::Engine(EngineError::Template(e)) => CliError::Template {
                message: e.message,
                help: e.suggestion,
            },
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use herald_publish::{SendError, Stage};

    fn failure(error: StageError) -> TargetFailure {
        TargetFailure {
            target: "zulip".to_string(),
            stage: Stage::Deliver,
            error,
        }
    }

    #[test]
    fn test_run_failed_exit_code_follows_first_failure() {
        let failures = [
            failure(StageError::Delivery(SendError::Http {
                status: 500,
                body: "boom".to_string(),
            })),
            failure(StageError::configuration("later")),
        ];

        let err = CliError::run_failed(failures.iter());
        assert_eq!(err.exit_code(), exit_codes::DELIVERY_ERROR);
        assert!(err.to_string().starts_with("2 target(s) failed"));
    }

    #[test]
    fn test_config_not_found_has_help() {
        let err = CliError::from(CoreError::ConfigNotFound {
            path: "herald.yml".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
        assert!(matches!(err, CliError::Config { help: Some(_), .. }));
    }
}
