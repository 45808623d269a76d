use super::Error;

/// Error when a unique index cannot be built because existing documents
/// already violate it.
#[derive(Debug)]
pub(super) struct DuplicateDataError {
    pub(super) message: Box<str>,
}

impl std::error::Error for DuplicateDataError {}

impl core::fmt::Display for DuplicateDataError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "duplicate data: {}", self.message)
    }
}

impl Error {
    /// Creates a duplicate data error.
    ///
    /// The collection is left untouched; the offending documents have to be
    /// cleaned up before the constraint can be enforced.
    pub fn duplicate_data(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DuplicateData(DuplicateDataError {
            message: message.into().into(),
        }))
    }

    pub fn is_duplicate_data(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::DuplicateData(_))
    }
}
