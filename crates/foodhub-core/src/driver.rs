use crate::{async_trait, ExistingIndex, IndexSpec};

use std::fmt::Debug;

/// A handle to a document database, as seen by the index provisioner.
///
/// Implementations map their client's failures onto foodhub error kinds:
/// [`Error::connectivity`](crate::Error::connectivity) when the server cannot be
/// reached, [`Error::duplicate_data`](crate::Error::duplicate_data) when a
/// unique index is violated by existing documents, and
/// [`Error::index_conflict`](crate::Error::index_conflict) when an index name
/// or key pattern clashes with an existing index.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Lightweight liveness check.
    async fn ping(&self) -> crate::Result<()>;

    /// Indexes currently defined on `collection`, including `_id_`. A
    /// collection that does not exist yet has no indexes.
    async fn list_indexes(&self, collection: &str) -> crate::Result<Vec<ExistingIndex>>;

    /// Create the index described by `spec`, returning the name the database
    /// assigned to it.
    async fn create_index(&self, spec: &IndexSpec) -> crate::Result<String>;

    /// Release the connection. Further calls may fail.
    async fn close(&self) -> crate::Result<()> {
        Ok(())
    }
}
