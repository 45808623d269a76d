mod connect;

use crate::{provision, Collection, Config, Driver, ExistingIndex, IndexCatalog, ProvisionReport, Result};

use std::sync::Arc;

/// Handle to the application database.
///
/// Constructed once at startup and passed to whatever needs it. Cloning is
/// cheap and shares the underlying driver.
#[derive(Debug, Clone)]
pub struct Db {
    driver: Arc<dyn Driver>,

    /// Redacted connection target, for display
    target: Arc<str>,
}

impl Db {
    /// Wrap an already constructed driver.
    ///
    /// Applications that need typed collection handles build the
    /// [`MongoDb`](crate::MongoDb) driver themselves, keep a clone, and hand
    /// the other to `Db`.
    pub fn new<D: Driver>(driver: D) -> Self {
        Self::with_target(driver, std::any::type_name::<D>())
    }

    pub(crate) fn with_target(driver: impl Driver, target: impl Into<Arc<str>>) -> Self {
        Self {
            driver: Arc::new(driver),
            target: target.into(),
        }
    }

    /// Open the database described by `config`.
    ///
    /// The MongoDB client connects lazily, so an unreachable server does not
    /// fail here; use [`ping`](Self::ping) to find out.
    pub async fn connect(config: &Config) -> Result<Self> {
        connect::connect(config).await
    }

    /// Connect, check liveness and provision `catalog`.
    ///
    /// Returns an error only when no handle can be built: a bad
    /// configuration, or a `mongodb+srv` host that cannot be resolved
    /// ([`Error::is_connectivity`](crate::Error::is_connectivity)). A server
    /// that is down or failed indexes are logged and show up in the report;
    /// the caller decides whether to serve.
    pub async fn bootstrap(config: &Config, catalog: &IndexCatalog) -> Result<(Self, ProvisionReport)> {
        let db = Self::connect(config).await?;
        let report = db.startup(catalog).await;
        Ok((db, report))
    }

    async fn startup(&self, catalog: &IndexCatalog) -> ProvisionReport {
        if self.ping().await {
            tracing::info!(database = %self.target, "connected to database");
        }

        self.ensure_indexes(catalog).await
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    /// Where this handle points, with credentials redacted.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The collections the application stores its documents in.
    pub fn collections(&self) -> &'static [Collection] {
        &Collection::ALL
    }

    /// Liveness check. Returns `false` when the database cannot be reached;
    /// never fails.
    pub async fn ping(&self) -> bool {
        match self.driver.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(database = %self.target, error = %err, "database ping failed");
                false
            }
        }
    }

    /// Make sure every index in `catalog` exists. See [`ensure_indexes`](crate::ensure_indexes).
    pub async fn ensure_indexes(&self, catalog: &IndexCatalog) -> ProvisionReport {
        provision::ensure_indexes(self.driver(), catalog).await
    }

    /// Indexes currently defined on `collection`.
    pub async fn list_indexes(&self, collection: impl AsRef<str>) -> Result<Vec<ExistingIndex>> {
        self.driver.list_indexes(collection.as_ref()).await
    }

    /// Release the connection. Other clones of this handle stop working.
    pub async fn close(self) -> Result<()> {
        self.driver.close().await?;
        tracing::debug!(database = %self.target, "database connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexSpec, Outcome};
    use foodhub_driver_memory::Memory;

    fn catalog() -> IndexCatalog {
        IndexCatalog::new([
            IndexSpec::new("users").asc("email").unique(),
            IndexSpec::new("orders").asc("userId"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn startup_provisions_reachable_database() {
        let driver = Memory::new();
        let report = Db::new(driver.clone()).startup(&catalog()).await;

        assert!(report.is_clean());
        assert_eq!(report.created(), 2);
        assert_eq!(driver.index_count("users"), 2);
    }

    #[tokio::test]
    async fn startup_reports_unreachable_database() {
        let driver = Memory::new();
        driver.set_reachable(false);

        let report = Db::new(driver.clone()).startup(&catalog()).await;

        assert!(report.aborted());
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|e| matches!(e.outcome, Outcome::SkippedError(_))));
        assert_eq!(driver.create_calls(), 0);
    }
}
