mod error;
mod index;
mod op;

use foodhub_core::{async_trait, Collection, Driver, Error, ExistingIndex, IndexSpec, Result};

use mongodb::{options::ClientOptions, Client, Database};

/// Database used when neither the configuration nor the URI names one.
pub const DEFAULT_DATABASE: &str = "foodhub";

const SCHEMES: [&str; 2] = ["mongodb", "mongodb+srv"];

#[derive(Debug, Clone)]
pub struct MongoDb {
    client: Client,
    database: Database,
}

impl MongoDb {
    /// Connects using the database named in the URI path, or
    /// [`DEFAULT_DATABASE`].
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_database(url, None).await
    }

    /// Connects to `url`, selecting `database` when given. An explicit
    /// database takes precedence over the one in the URI path.
    ///
    /// The client connects lazily: an unreachable server is reported by the
    /// first operation (or [`ping`](Driver::ping)), not here. The exception
    /// is `mongodb+srv`, whose hosts are looked up in DNS while parsing the
    /// URL; a failed lookup is a connectivity error.
    pub async fn connect_with_database(url: &str, database: Option<&str>) -> Result<Self> {
        let scheme = url.split_once("://").map(|(scheme, _)| scheme);

        if !scheme.is_some_and(|scheme| SCHEMES.contains(&scheme)) {
            return Err(Error::invalid_connection_url(
                "connection URL does not have a `mongodb` or `mongodb+srv` scheme",
            ));
        }

        let mut options = ClientOptions::parse(url)
            .await
            .map_err(error::from_parse_error)?;

        if options.app_name.is_none() {
            options.app_name = Some("foodhub".to_string());
        }

        let db_name = database
            .map(str::to_string)
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options).map_err(error::into_error)?;
        let database = client.database(&db_name);

        tracing::debug!(database = %db_name, "mongodb client created");

        Ok(Self { client, database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Typed handle to one of the application's collections.
    pub fn collection<T: Send + Sync>(&self, collection: Collection) -> mongodb::Collection<T> {
        self.database.collection(collection.name())
    }

    pub fn collection_named<T: Send + Sync>(&self, name: &str) -> mongodb::Collection<T> {
        self.database.collection(name)
    }
}

#[async_trait]
impl Driver for MongoDb {
    async fn ping(&self) -> Result<()> {
        op::ping::execute(self).await
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<ExistingIndex>> {
        op::list_indexes::execute(self, collection).await
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<String> {
        op::create_index::execute(self, spec).await
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_foreign_scheme() {
        let err = MongoDb::connect("postgresql://localhost/foodhub").await.unwrap_err();
        assert!(err.is_invalid_connection_url());
    }

    #[tokio::test]
    async fn malformed_options_are_invalid_url() {
        let err = MongoDb::connect("mongodb://localhost:27017/?maxPoolSize=lots")
            .await
            .unwrap_err();
        assert!(err.is_invalid_connection_url(), "{err}");
        assert!(!err.is_connectivity());
    }

    #[tokio::test]
    async fn failed_srv_lookup_is_connectivity() {
        let err = MongoDb::connect("mongodb+srv://app:pw@cluster0.does-not-exist.invalid/shop")
            .await
            .unwrap_err();
        assert!(err.is_connectivity(), "{err}");
        assert!(!err.is_invalid_connection_url());
    }

    #[tokio::test]
    async fn database_from_uri_path() {
        let db = MongoDb::connect("mongodb://localhost:27017/shop").await.unwrap();
        assert_eq!(db.database().name(), "shop");
    }

    #[tokio::test]
    async fn explicit_database_wins() {
        let db = MongoDb::connect_with_database("mongodb://localhost:27017/shop", Some("food"))
            .await
            .unwrap();
        assert_eq!(db.database().name(), "food");
    }

    #[tokio::test]
    async fn default_database() {
        let db = MongoDb::connect("mongodb://localhost:27017").await.unwrap();
        assert_eq!(db.database().name(), DEFAULT_DATABASE);
        assert_eq!(
            db.collection::<bson::Document>(Collection::Cart).name(),
            "cart"
        );
    }
}
