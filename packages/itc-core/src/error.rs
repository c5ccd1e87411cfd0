use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),
    #[error("non-canonical input: {0}")]
    NonCanonical(String),
    #[error("counter overflow: {0}")]
    Overflow(String),
    #[error("parse error: {0}")]
    Parse(String),
}
