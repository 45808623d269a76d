use crate::{error, index, MongoDb};
use foodhub_core::{ExistingIndex, Result};
use futures::TryStreamExt;

pub async fn execute(driver: &MongoDb, collection: &str) -> Result<Vec<ExistingIndex>> {
    let collection = driver.database.collection::<bson::Document>(collection);

    let cursor = match collection.list_indexes().await {
        Ok(cursor) => cursor,
        // The collection has not been created yet
        Err(err) if error::is_namespace_not_found(&err) => return Ok(vec![]),
        Err(err) => return Err(error::into_error(err)),
    };

    let models: Vec<_> = cursor.try_collect().await.map_err(error::into_error)?;

    Ok(models.iter().map(index::existing_index).collect())
}
