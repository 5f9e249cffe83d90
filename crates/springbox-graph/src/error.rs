pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateId { id: String },

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error("invalid node `{id}`: {message}")]
    Validation { id: String, message: String },

    #[error("parse error on line {line}: {message} (`{text}`)")]
    Parse {
        line: usize,
        text: String,
        message: String,
    },
}

impl Error {
    /// The 1-based line number for [`Error::Parse`], `None` for every other variant.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
