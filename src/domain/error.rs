//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the balancing invariants.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in scale references at: {0}")]
    CycleDetected(String),

    #[error("internal error: scale {owner} references a scale that does not exist")]
    DanglingReference { owner: String },

    #[error("internal error: no scale stored under handle {0}")]
    MissingScale(String),

    #[error("mass overflow while balancing scale: {0}")]
    MassOverflow(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
