use thiserror::Error;

/// Everything that can go wrong on the board. None of these are fatal; callers
/// surface them as a message and carry on with unchanged state.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),
    #[error("at most {limit} subtasks per task")]
    LimitExceeded { limit: usize },
    #[error("position {index} out of range (len {len})")]
    Index { index: usize, len: usize },
    #[error("cannot load board data: {0}")]
    Load(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("session error: {0}")]
    Session(String),
}

impl From<std::io::Error> for BoardError {
    fn from(e: std::io::Error) -> Self {
        BoardError::Storage(e.to_string())
    }
}

pub type Result<T, E = BoardError> = std::result::Result<T, E>;
