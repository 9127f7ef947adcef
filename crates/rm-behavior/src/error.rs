use thiserror::Error;

use rm_core::PathIndex;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("path {path} out of range for a table of {len} paths")]
    PathOutOfRange { path: PathIndex, len: usize },

    #[error("travel time must be finite and non-negative, got {0}")]
    InvalidTravelTime(f64),

    #[error("cost table has no paths to choose from")]
    EmptyTable,
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
