use foodhub_core::{async_trait, err, Driver, Error, ExistingIndex, IndexSpec, Result};

use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// An in-process document store that follows MongoDB's index rules closely
/// enough to exercise the provisioner: implicit collection creation, an `_id_`
/// index per collection, name and key-pattern conflicts, a single text index
/// per collection, and unique indexes that refuse to build over duplicate
/// values.
///
/// Clones share the same store, so several handles behave like several
/// processes talking to one database. Index reads and writes yield to the
/// scheduler first, so concurrent passes interleave the way round trips to
/// a server would.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    store: Arc<Mutex<Store>>,
}

#[derive(Debug)]
struct Store {
    collections: HashMap<String, MemCollection>,

    /// When `false`, every operation fails with a connectivity error
    reachable: bool,

    /// Number of `create_index` calls that reached the store
    create_calls: usize,

    /// One-shot failures returned by the next `create_index` on a collection
    failures: HashMap<String, Error>,

    /// Indexes another "process" creates right before the next
    /// `create_index` on a collection
    races: HashMap<String, ExistingIndex>,
}

#[derive(Debug)]
struct MemCollection {
    indexes: Vec<ExistingIndex>,
    documents: Vec<Value>,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            collections: HashMap::new(),
            reachable: true,
            create_calls: 0,
            failures: HashMap::new(),
            races: HashMap::new(),
        }
    }
}

impl MemCollection {
    fn new() -> Self {
        MemCollection {
            indexes: vec![ExistingIndex::primary_key()],
            documents: vec![],
        }
    }

    fn create_index(&mut self, collection: &str, spec: &IndexSpec) -> Result<String> {
        let name = spec.index_name();

        if let Some(existing) = self.indexes.iter().find(|i| spec.is_satisfied_by(i)) {
            if existing.name == name && existing.unique == spec.unique {
                return Ok(name);
            }

            return Err(Error::index_conflict(format!(
                "index with the same keys already exists with a different name or options: {}",
                existing.name
            )));
        }

        if self.indexes.iter().any(|i| i.name == name) {
            return Err(Error::index_conflict(format!(
                "an existing index named `{name}` has different keys"
            )));
        }

        let is_text = spec.fields.iter().any(|f| f.op.is_text());
        if is_text {
            if let Some(text) = self
                .indexes
                .iter()
                .find(|i| i.fields.iter().any(|f| f.op.is_text()))
            {
                return Err(Error::index_conflict(format!(
                    "only one text index per collection allowed, found existing text index `{}`",
                    text.name
                )));
            }
        }

        let index = ExistingIndex {
            name: name.clone(),
            fields: spec.fields.clone(),
            unique: spec.unique,
        };

        if index.unique {
            if let Some(dup) = first_duplicate(&index, &self.documents) {
                return Err(Error::duplicate_data(format!(
                    "E11000 duplicate key error collection: {collection} index: {name} dup key: {dup}"
                )));
            }
        }

        self.indexes.push(index);
        Ok(name)
    }

    fn insert(&mut self, collection: &str, document: Value) -> Result<()> {
        if !document.is_object() {
            return Err(err!("document must be a JSON object; got {document}"));
        }

        for index in self.indexes.iter().filter(|i| i.unique && !i.is_primary_key()) {
            let key = index_key(index, &document);
            if self.documents.iter().any(|doc| index_key(index, doc) == key) {
                return Err(Error::duplicate_data(format!(
                    "E11000 duplicate key error collection: {collection} index: {} dup key: {key}",
                    index.name
                )));
            }
        }

        self.documents.push(document);
        Ok(())
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates the database going away (`false`) or coming back (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        self.store().reachable = reachable;
    }

    /// Inserts a document, creating the collection if needed. Unique indexes
    /// are enforced.
    pub fn insert(&self, collection: &str, document: Value) -> Result<()> {
        let mut store = self.store();
        store.check_reachable()?;
        store
            .collections
            .entry(collection.to_string())
            .or_insert_with(MemCollection::new)
            .insert(collection, document)
    }

    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.store()
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    pub fn drop_index(&self, collection: &str, name: &str) -> Result<()> {
        let mut store = self.store();
        store.check_reachable()?;

        let Some(coll) = store.collections.get_mut(collection) else {
            return Err(err!("ns not found: {collection}"));
        };

        if name == "_id_" {
            return Err(err!("cannot drop _id index"));
        }

        let before = coll.indexes.len();
        coll.indexes.retain(|i| i.name != name);

        if coll.indexes.len() == before {
            return Err(err!("index not found with name [{name}]"));
        }

        Ok(())
    }

    /// Creates an index directly, bypassing the provisioner. Used to seed
    /// prior state.
    pub fn seed_index(&self, spec: &IndexSpec) -> Result<String> {
        let mut store = self.store();
        store.collection_mut(&spec.collection).create_index(&spec.collection, spec)
    }

    /// Number of indexes on `collection`, including `_id_`.
    pub fn index_count(&self, collection: &str) -> usize {
        self.store()
            .collections
            .get(collection)
            .map(|c| c.indexes.len())
            .unwrap_or(0)
    }

    /// Number of `create_index` calls that reached the store.
    pub fn create_calls(&self) -> usize {
        self.store().create_calls
    }

    /// Makes the next `create_index` on `collection` fail with `error`.
    pub fn fail_next_create(&self, collection: &str, error: Error) {
        self.store().failures.insert(collection.to_string(), error);
    }

    /// Makes `index` appear on `collection` right before the next
    /// `create_index` there, as if a concurrent process had created it.
    pub fn race_next_create(&self, collection: &str, index: ExistingIndex) {
        self.store().races.insert(collection.to_string(), index);
    }
}

impl Store {
    fn check_reachable(&self) -> Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(Error::connectivity(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        }
    }

    fn collection_mut(&mut self, name: &str) -> &mut MemCollection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(MemCollection::new)
    }
}

#[async_trait]
impl Driver for Memory {
    async fn ping(&self) -> Result<()> {
        self.store().check_reachable()
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<ExistingIndex>> {
        tokio::task::yield_now().await;

        let store = self.store();
        store.check_reachable()?;

        Ok(store
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<String> {
        tokio::task::yield_now().await;

        let mut store = self.store();
        store.check_reachable()?;
        store.create_calls += 1;

        if let Some(err) = store.failures.remove(&spec.collection) {
            return Err(err);
        }

        if let Some(index) = store.races.remove(&spec.collection) {
            store.collection_mut(&spec.collection).indexes.push(index);
        }

        store
            .collection_mut(&spec.collection)
            .create_index(&spec.collection, spec)
    }
}

static NULL: Value = Value::Null;

/// Value of a dotted field path; missing fields index as `null`.
fn field_value<'a>(document: &'a Value, path: &str) -> &'a Value {
    path.split('.')
        .try_fold(document, |value, segment| value.get(segment))
        .unwrap_or(&NULL)
}

fn index_key(index: &ExistingIndex, document: &Value) -> Value {
    Value::Array(
        index
            .fields
            .iter()
            .map(|f| field_value(document, &f.field).clone())
            .collect(),
    )
}

fn first_duplicate(index: &ExistingIndex, documents: &[Value]) -> Option<Value> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .map(|doc| index_key(index, doc))
        .find(|key| !seen.insert(key.to_string()))
}
