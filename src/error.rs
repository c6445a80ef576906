use thiserror::Error;

use crate::types::Outcome;

#[derive(Error, Debug)]
pub enum HeistError {
    #[error("{0} is not a selectable round count (expected 3, 5, 7 or 10)")]
    InvalidRoundTarget(u32),
    #[error("could not parse round count from {0:?}")]
    UnparsableRoundTarget(String),
    #[error("replay finished with {actual_red}-{actual_blue} ({actual}), log recorded {expected_red}-{expected_blue} ({expected})")]
    ReplayMismatch {
        expected: Outcome,
        actual: Outcome,
        expected_red: u32,
        expected_blue: u32,
        actual_red: u32,
        actual_blue: u32,
    },
    #[error("match log has no outcome: game did not finish")]
    UnfinishedMatch,
    #[error("failed to serialize match log: {0}")]
    Serialization(#[from] serde_json::Error),
}
