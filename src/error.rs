use std::fmt;

/// The public error surface. `TimeUp` and `Cancelled` are handled internally
/// by the search loop via `search::SearchOutcome` and never escape as this
/// kind — they only appear here if a caller somehow observes one directly
/// (e.g. through a lower-level API), which should not normally happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    IllegalMove(String),
    InvalidArgument(String),
    Cancelled,
    TimeUp,
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::IllegalMove(detail) => write!(f, "illegal move: {detail}"),
            EngineError::InvalidArgument(detail) => write!(f, "invalid argument: {detail}"),
            EngineError::Cancelled => write!(f, "search cancelled"),
            EngineError::TimeUp => write!(f, "search deadline reached"),
            EngineError::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for EngineError {}
