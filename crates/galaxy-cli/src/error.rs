//! CLI error types with exit code handling

use galaxy_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Failure reported by the core library
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    /// `--log-level` is not a valid filter
    #[error("Invalid log level '{level}': {message}")]
    #[diagnostic(
        code(galaxy::cli::log_level),
        help("use one of error, warn, info, debug, trace, or a tracing filter directive")
    )]
    LogLevel { level: String, message: String },

    /// Plan output could not be serialized
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(galaxy::cli::output))]
    Output { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(err) => match err.root() {
                CoreError::ConfigRead { .. }
                | CoreError::ConfigParse { .. }
                | CoreError::InvalidNamespace { .. }
                | CoreError::InvalidBaseDir { .. }
                | CoreError::EnvironmentNotFound { .. } => exit_codes::CONFIG_ERROR,
                CoreError::DirectoryNotFound { .. }
                | CoreError::UnrecognizedFileFormat { .. }
                | CoreError::Glob { .. }
                | CoreError::Io { .. } => exit_codes::INVENTORY_ERROR,
                CoreError::FileSuffixParse { .. } | CoreError::Interpolation { .. } => {
                    exit_codes::PLAN_ERROR
                }
                CoreError::Environment { .. } | CoreError::Apply { .. } => exit_codes::ERROR,
            },
            CliError::LogLevel { .. } | CliError::Output { .. } => exit_codes::ERROR,
        }
    }

    pub fn output(err: impl std::fmt::Display) -> Self {
        Self::Output {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
