use crate::{error, MongoDb};
use bson::doc;
use foodhub_core::Result;

pub async fn execute(driver: &MongoDb) -> Result<()> {
    driver
        .client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(error::into_error)?;

    Ok(())
}
