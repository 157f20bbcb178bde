//! CLI-level errors (wraps infrastructure errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
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
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(DomainError::CycleDetected(_))
                    | ApplicationError::Domain(DomainError::MassOverflow(_))
                    | ApplicationError::RejectedLines { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_domain_errors_when_mapping_then_data_vs_internal() {
        let cycle: CliError = ApplicationError::from(DomainError::CycleDetected("A".into())).into();
        assert_eq!(cycle.exit_code(), exitcode::DATAERR);

        let dangling: CliError = ApplicationError::from(DomainError::DanglingReference {
            owner: "A".into(),
        })
        .into();
        assert_eq!(dangling.exit_code(), exitcode::SOFTWARE);
    }

    #[test]
    fn given_missing_input_when_mapping_then_noinput() {
        let err = CliError::from(InfraError::io(
            "open input",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        ));
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
        assert_eq!(CliError::Usage("x".into()).exit_code(), exitcode::USAGE);
    }
}
