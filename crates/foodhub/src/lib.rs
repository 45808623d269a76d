//! Database bootstrap for the food-delivery service.
//!
//! [`Db`] is the explicit context object the rest of the application receives
//! at startup: it owns the driver, exposes the named collections, checks
//! liveness and provisions the secondary indexes the application relies on.
//!
//! ```no_run
//! # async fn startup() -> foodhub::Result<()> {
//! use foodhub::{Config, Db, IndexCatalog};
//!
//! let config = Config::from_env()?;
//! let db = Db::connect(&config).await?;
//!
//! if !db.ping().await {
//!     // serve in degraded mode, health checks report the outage
//! }
//!
//! let report = db.ensure_indexes(&IndexCatalog::food_delivery()).await;
//! for entry in report.errors() {
//!     eprintln!("{entry}");
//! }
//!
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::{redact_url_password, Config};

pub mod db;
pub use db::Db;

mod provision;
pub use provision::ensure_indexes;

pub use foodhub_core::{
    async_trait, driver, err, Collection, Direction, Driver, Error, ExistingIndex, IndexCatalog,
    IndexField, IndexOp, IndexSpec, Outcome, ProvisionReport, ReportEntry, Result, SkipReason,
};

#[cfg(feature = "memory")]
pub use foodhub_driver_memory::Memory;

#[cfg(feature = "mongodb")]
pub use foodhub_driver_mongodb::MongoDb;
