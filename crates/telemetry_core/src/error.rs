use thiserror::Error;

/// Errors raised by the step table when callers address rows or columns
/// that do not exist, or try to append rows out of time order.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("row index {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("step time {time} is earlier than the previous row time {prev}")]
    NonMonotonicTime { time: f64, prev: f64 },
}

/// Errors raised by match-info lookups.
#[derive(Error, Debug)]
pub enum MatchInfoError {
    #[error("no team with id {0}")]
    TeamIdNotFound(String),

    #[error("no team with color {0:?}")]
    TeamColorNotFound(crate::match_info::TeamColor),

    #[error("no additional data for platform {0:?}")]
    PlatformDataNotFound(String),

    #[error("match has no steps")]
    NoSteps,
}
