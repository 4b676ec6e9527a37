//! CLI error types with exit code handling
//!
//! Library errors are folded into one diagnostic type that knows which exit
//! code to use.

use chartpush_core::CoreError;
use chartpush_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The archive could not be read as a packaged chart
    #[error("Chart error: {message}")]
    #[diagnostic(
        code(chartpush::cli::chart),
        help("Pass a packaged chart (.tgz) as produced by `helm package`")
    )]
    Chart { message: String },

    /// Publishing configuration is missing or invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(chartpush::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// One or more uploads failed
    #[error("Publishing failed for {failed} of {total} repositories")]
    #[diagnostic(code(chartpush::cli::publish))]
    PublishFailed { failed: usize, total: usize },

    /// Invalid arguments
    #[error("{message}")]
    #[diagnostic(code(chartpush::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartpush::cli::io))]
    Io { message: String },

    /// Any other repository error
    #[error(transparent)]
    #[diagnostic(code(chartpush::cli::repo))]
    Repo(RepoError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::PublishFailed { .. } => exit_codes::PUBLISH_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Repo(_) => exit_codes::ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            other => CliError::Chart {
                message: other.to_string(),
            },
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::IncompleteRepository { .. }
            | RepoError::InvalidRepositoryUrl { .. }
            | RepoError::InvalidConfig { .. }
            | RepoError::Serialization(_) => CliError::Config {
                message: err.to_string(),
                help: Some("Check the publishing configuration file".to_string()),
            },
            RepoError::RepositoryNotFound { ref name } => CliError::Config {
                help: Some(format!(
                    "Add it with: chartpush repo add {} <url>",
                    name
                )),
                message: err.to_string(),
            },
            RepoError::RepositoryAlreadyExists { .. } => CliError::Usage {
                message: err.to_string(),
                help: Some("Remove it first with: chartpush repo remove <name>".to_string()),
            },
            RepoError::Io(e) => e.into(),
            other => CliError::Repo(other),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
