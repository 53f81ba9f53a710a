//! Defines the crate-wide error type.

use thiserror::Error;


/// Errors reported by rollout sampling, policy training,
/// and the outer learning loop.
/// Configuration and I/O failures are fatal for a run;
/// degenerate-sample conditions are not errors
/// (the offending row or stage is skipped with a warning instead).
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid or inconsistent configuration value.
    /// E.g., an unknown reward-rule name,
    /// or full-enumeration rollouts combined with a cascaded policy.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An I/O failure on a rollout, step-log, result, or checkpoint file.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A checkpoint file that cannot be parsed,
    /// or a resume request pointing at a missing file.
    #[error("bad checkpoint: {0}")]
    Checkpoint(String),
}
