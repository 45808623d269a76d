use super::Error;

/// Error when an index cannot be created because another index already
/// occupies its name or its key pattern with different options.
#[derive(Debug)]
pub(super) struct IndexConflictError {
    pub(super) message: Box<str>,
}

impl std::error::Error for IndexConflictError {}

impl core::fmt::Display for IndexConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "index conflict: {}", self.message)
    }
}

impl Error {
    pub fn index_conflict(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::IndexConflict(IndexConflictError {
            message: message.into().into(),
        }))
    }

    pub fn is_index_conflict(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::IndexConflict(_))
    }
}
