use crate::{error, index, MongoDb};
use foodhub_core::{IndexSpec, Result};

pub async fn execute(driver: &MongoDb, spec: &IndexSpec) -> Result<String> {
    let collection = driver.database.collection::<bson::Document>(&spec.collection);
    let model = index::index_model(spec);

    let created = collection
        .create_index(model)
        .await
        .map_err(error::into_error)?;

    Ok(created.index_name)
}
