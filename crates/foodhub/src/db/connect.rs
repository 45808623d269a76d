use super::Db;
use crate::{Config, Error, Result};

pub(super) async fn connect(config: &Config) -> Result<Db> {
    let target = config.redacted_uri();

    match config.uri.split_once("://").map(|(scheme, _)| scheme) {
        Some("mongodb" | "mongodb+srv") => connect_mongodb(config, target).await,
        Some("memory") => connect_memory(target),
        Some(scheme) => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={target}"
        ))),
        None => Err(Error::invalid_connection_url(format!(
            "missing scheme; url={target}"
        ))),
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(config: &Config, target: String) -> Result<Db> {
    let driver = foodhub_driver_mongodb::MongoDb::connect_with_database(
        &config.uri,
        config.database.as_deref(),
    )
    .await?;

    let target = format!("{target} (database `{}`)", driver.database().name());
    Ok(Db::with_target(driver, target))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_config: &Config, _target: String) -> Result<Db> {
    Err(Error::invalid_connection_url("`mongodb` feature not enabled"))
}

#[cfg(feature = "memory")]
fn connect_memory(target: String) -> Result<Db> {
    Ok(Db::with_target(foodhub_driver_memory::Memory::new(), target))
}

#[cfg(not(feature = "memory"))]
fn connect_memory(_target: String) -> Result<Db> {
    Err(Error::invalid_connection_url("`memory` feature not enabled"))
}
