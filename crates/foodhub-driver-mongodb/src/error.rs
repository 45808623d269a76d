use foodhub_core::Error;

use mongodb::error::{ErrorKind, WriteFailure};

const NAMESPACE_NOT_FOUND: i32 = 26;
const INDEX_ALREADY_EXISTS: i32 = 68;
const INDEX_OPTIONS_CONFLICT: i32 = 85;
const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
const DUPLICATE_KEY: i32 = 11000;
const DUPLICATE_KEY_LEGACY: i32 = 11001;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ServerFailure {
    DuplicateData,
    IndexConflict,
    NamespaceNotFound,
}

/// Maps a server error code onto the failures foodhub distinguishes.
pub(crate) fn server_failure(code: i32) -> Option<ServerFailure> {
    match code {
        DUPLICATE_KEY | DUPLICATE_KEY_LEGACY => Some(ServerFailure::DuplicateData),
        INDEX_ALREADY_EXISTS | INDEX_OPTIONS_CONFLICT | INDEX_KEY_SPECS_CONFLICT => {
            Some(ServerFailure::IndexConflict)
        }
        NAMESPACE_NOT_FOUND => Some(ServerFailure::NamespaceNotFound),
        _ => None,
    }
}

pub(crate) fn server_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        _ => None,
    }
}

pub(crate) fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    server_code(err).and_then(server_failure) == Some(ServerFailure::NamespaceNotFound)
}

fn is_unreachable(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Io(_)
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. }
    )
}

pub(crate) fn into_error(err: mongodb::error::Error) -> Error {
    if is_unreachable(&err) {
        return Error::connectivity(err);
    }

    match server_code(&err).and_then(server_failure) {
        Some(ServerFailure::DuplicateData) => Error::duplicate_data(err.to_string()),
        Some(ServerFailure::IndexConflict) => Error::index_conflict(err.to_string()),
        _ => Error::driver_operation_failed(err),
    }
}

/// Maps a failure to parse a connection string. `mongodb+srv` hosts are
/// resolved during parsing, so DNS and I/O failures surface here too.
pub(crate) fn from_parse_error(err: mongodb::error::Error) -> Error {
    if is_unreachable(&err) {
        Error::connectivity(err)
    } else {
        Error::invalid_connection_url(err.to_string())
    }
}
