pub mod catalog;
pub use catalog::{Collection, IndexCatalog};

pub mod driver;
pub use driver::Driver;

mod error;
pub use error::Error;

pub mod index;
pub use index::{Direction, ExistingIndex, IndexField, IndexOp, IndexSpec};

pub mod report;
pub use report::{Outcome, ProvisionReport, ReportEntry, SkipReason};

/// A Result type alias that uses foodhub's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
