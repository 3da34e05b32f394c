//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("no command given (see --help)")]
    UnknownCommand,
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownCommand => exitcode::UNKNOWN_COMMAND,
            CliError::Infra(e) => match e {
                InfraError::LibraryLoad { .. } | InfraError::MissingSymbol { .. } => {
                    exitcode::UNAVAILABLE
                }
                InfraError::Encoding { .. } => exitcode::FAILED,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(_) => exitcode::USAGE,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::ActivationFailed { .. }
                    | ApplicationError::NativeCallFailed { .. }
                    | ApplicationError::OperationFailed { .. } => exitcode::FAILED,
                    ApplicationError::InitializationFailed
                    | ApplicationError::EmulationFailed { .. } => exitcode::SECONDARY_FAILED,
                },
            },
        }
    }
}
