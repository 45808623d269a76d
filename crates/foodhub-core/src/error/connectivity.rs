use super::Error;

/// Error when the database cannot be reached (I/O failure, no suitable server,
/// connection pool cleared).
#[derive(Debug)]
pub(super) struct ConnectivityError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ConnectivityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "database unreachable: {}", self.inner)
    }
}

impl Error {
    pub fn connectivity(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Connectivity(ConnectivityError {
            inner: Box::new(err),
        }))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self.root_kind(), super::ErrorKind::Connectivity(_))
    }
}
