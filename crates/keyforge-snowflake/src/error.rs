use jiff::Timestamp;
use thiserror::Error;

/// Errors returned by Snowflake configuration and ID generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid node id {value:?}; expected a non-negative integer")]
    InvalidNodeId { value: String },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    #[error("overtime limit")]
    OverTimeLimit,
}
