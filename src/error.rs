use thiserror::Error;

use crate::status::Status;

/// Failures of the harness itself, as opposed to statuses returned across the
/// boundary.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("could not acquire a handle: {0}")]
    Acquire(Status),

    #[error("fixture does not fit the index type")]
    Fixture,

    #[error("{what}[{index}]: expected {expected}, got {actual}")]
    Mismatch {
        what: &'static str,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("backend reported {0} nonzeros for the product")]
    BadNnz(i64),

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },

    #[error("no GPU adapter available")]
    NoAdapter,
}
