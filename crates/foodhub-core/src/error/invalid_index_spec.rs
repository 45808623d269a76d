use super::Error;

/// Error when a single index spec is malformed (no fields, empty names,
/// repeated fields, unsupported option combinations).
#[derive(Debug)]
pub(super) struct InvalidIndexSpec {
    pub(super) message: Box<str>,
}

impl std::error::Error for InvalidIndexSpec {}

impl core::fmt::Display for InvalidIndexSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid index spec: {}", self.message)
    }
}

impl Error {
    pub fn invalid_index_spec(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidIndexSpec(InvalidIndexSpec {
            message: message.into().into(),
        }))
    }

    pub fn is_invalid_index_spec(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::InvalidIndexSpec(_))
    }
}
