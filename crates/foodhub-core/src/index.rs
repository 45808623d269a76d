use crate::{Error, Result};

use std::{collections::HashSet, fmt};

/// Sort direction of an index key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

/// How a single field participates in an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexOp {
    /// Ordered index key.
    Sort(Direction),

    /// Full-text index key.
    Text,

    /// Any other index kind reported by the database (`hashed`, `2dsphere`,
    /// ...). Never requested by a catalog, so it never satisfies one.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexField {
    /// Field path, dotted for nested documents (`menu.items.name`)
    pub field: String,

    pub op: IndexOp,
}

/// A desired index on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Name of the collection being indexed
    pub collection: String,

    /// Ordered key sequence. Never empty once validated.
    pub fields: Vec<IndexField>,

    /// When `true`, indexed entries are unique
    pub unique: bool,

    /// Explicit index name. When `None`, the database default name is used.
    pub name: Option<String>,
}

/// An index read back from the live database. Only used for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingIndex {
    pub name: String,
    pub fields: Vec<IndexField>,
    pub unique: bool,
}

impl IndexOp {
    /// The value MongoDB uses for this op in a key document and in default
    /// index names.
    pub fn as_key_str(&self) -> &str {
        match self {
            IndexOp::Sort(Direction::Asc) => "1",
            IndexOp::Sort(Direction::Desc) => "-1",
            IndexOp::Text => "text",
            IndexOp::Other(kind) => kind.as_str(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, IndexOp::Text)
    }
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexOp::Sort(Direction::Asc) => f.write_str("asc"),
            IndexOp::Sort(Direction::Desc) => f.write_str("desc"),
            IndexOp::Text => f.write_str("text"),
            IndexOp::Other(kind) => f.write_str(kind),
        }
    }
}

impl IndexField {
    pub fn new(field: impl Into<String>, op: IndexOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }
}

impl fmt::Display for IndexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.op)
    }
}

impl IndexSpec {
    /// Start an index spec on `collection`. Add keys with [`asc`](Self::asc),
    /// [`desc`](Self::desc) and [`text`](Self::text).
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: vec![],
            unique: false,
            name: None,
        }
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.field(field, IndexOp::Sort(Direction::Asc))
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.field(field, IndexOp::Sort(Direction::Desc))
    }

    pub fn text(self, field: impl Into<String>) -> Self {
        self.field(field, IndexOp::Text)
    }

    pub fn field(mut self, field: impl Into<String>, op: IndexOp) -> Self {
        self.fields.push(IndexField::new(field, op));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The name the index has (or will have) in the database: the explicit
    /// name, or MongoDB's default of `<field>_<op>` pairs joined by `_`.
    pub fn index_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        default_index_name(&self.fields)
    }

    /// Returns `true` when `fields` is the same key sequence as this spec:
    /// same length, same field names and ops, in the same order.
    pub fn matches_keys(&self, fields: &[IndexField]) -> bool {
        self.fields == fields
    }

    pub fn is_satisfied_by(&self, existing: &ExistingIndex) -> bool {
        self.matches_keys(&existing.fields)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection.is_empty() {
            return Err(Error::invalid_index_spec("collection name is empty"));
        }

        if self.fields.is_empty() {
            return Err(Error::invalid_index_spec(format!(
                "index on `{}` has no fields",
                self.collection
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.field.is_empty() {
                return Err(Error::invalid_index_spec(format!(
                    "index on `{}` has an empty field name",
                    self.collection
                )));
            }

            if !seen.insert(field.field.as_str()) {
                return Err(Error::invalid_index_spec(format!(
                    "field `{}` appears more than once in index on `{}`",
                    field.field, self.collection
                )));
            }

            if let IndexOp::Other(kind) = &field.op {
                return Err(Error::invalid_index_spec(format!(
                    "unsupported index kind `{kind}` for field `{}`",
                    field.field
                )));
            }
        }

        if self.unique && self.fields.iter().any(|f| f.op.is_text()) {
            return Err(Error::invalid_index_spec(format!(
                "text index on `{}` cannot be unique",
                self.collection
            )));
        }

        if matches!(&self.name, Some(name) if name.is_empty()) {
            return Err(Error::invalid_index_spec(format!(
                "explicit index name on `{}` is empty",
                self.collection
            )));
        }

        Ok(())
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.index_name())
    }
}

impl ExistingIndex {
    pub fn new(name: impl Into<String>, fields: Vec<IndexField>) -> Self {
        Self {
            name: name.into(),
            fields,
            unique: false,
        }
    }

    /// The `_id` index MongoDB maintains on every collection.
    pub fn primary_key() -> Self {
        Self {
            name: "_id_".to_string(),
            fields: vec![IndexField::new("_id", IndexOp::Sort(Direction::Asc))],
            unique: true,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.name == "_id_"
    }
}

pub fn default_index_name(fields: &[IndexField]) -> String {
    fields
        .iter()
        .map(|f| format!("{}_{}", f.field, f.op.as_key_str()))
        .collect::<Vec<_>>()
        .join("_")
}
