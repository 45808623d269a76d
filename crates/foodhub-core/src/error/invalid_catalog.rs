use super::Error;

/// Error when an index catalog is internally inconsistent, e.g. two entries
/// declare the same key sequence on the same collection.
#[derive(Debug)]
pub(super) struct InvalidCatalog {
    pub(super) message: Box<str>,
}

impl std::error::Error for InvalidCatalog {}

impl core::fmt::Display for InvalidCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid index catalog: {}", self.message)
    }
}

impl Error {
    pub fn invalid_catalog(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidCatalog(InvalidCatalog {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_catalog(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::InvalidCatalog(_))
    }
}
