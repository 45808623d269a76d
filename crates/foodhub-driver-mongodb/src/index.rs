use bson::{Bson, Document};
use foodhub_core::{index::default_index_name, Direction, ExistingIndex, IndexField, IndexOp, IndexSpec};
use mongodb::{options::IndexOptions, IndexModel};

/// Key a text index is stored under; the indexed fields live in `weights`.
const TEXT_KEY: &str = "_fts";
const TEXT_META_KEY: &str = "_ftsx";

pub(crate) fn index_model(spec: &IndexSpec) -> IndexModel {
    let mut keys = Document::new();
    for field in &spec.fields {
        let value = match &field.op {
            IndexOp::Sort(Direction::Asc) => Bson::Int32(1),
            IndexOp::Sort(Direction::Desc) => Bson::Int32(-1),
            IndexOp::Text => Bson::String("text".to_string()),
            IndexOp::Other(kind) => Bson::String(kind.clone()),
        };
        keys.insert(&field.field, value);
    }

    let mut options = IndexOptions::default();
    options.unique = spec.unique.then_some(true);
    options.name = spec.name.clone();

    IndexModel::builder().keys(keys).options(options).build()
}

pub(crate) fn existing_index(model: &IndexModel) -> ExistingIndex {
    let options = model.options.as_ref();
    let mut fields = vec![];

    for (key, value) in &model.keys {
        match key.as_str() {
            TEXT_KEY => {
                let weights = options.and_then(|options| options.weights.as_ref());
                for (field, _) in weights.into_iter().flatten() {
                    fields.push(IndexField::new(field, IndexOp::Text));
                }
            }
            TEXT_META_KEY => {}
            _ => fields.push(IndexField::new(key, index_op(value))),
        }
    }

    let name = options
        .and_then(|options| options.name.clone())
        .unwrap_or_else(|| default_index_name(&fields));

    ExistingIndex {
        name,
        fields,
        unique: options.and_then(|options| options.unique).unwrap_or(false),
    }
}

fn index_op(value: &Bson) -> IndexOp {
    let direction = |n: f64| {
        if n < 0.0 {
            IndexOp::Sort(Direction::Desc)
        } else {
            IndexOp::Sort(Direction::Asc)
        }
    };

    match value {
        Bson::Int32(n) => direction(*n as f64),
        Bson::Int64(n) => direction(*n as f64),
        Bson::Double(n) => direction(*n),
        Bson::String(kind) if kind == "text" => IndexOp::Text,
        Bson::String(kind) => IndexOp::Other(kind.clone()),
        other => IndexOp::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    fn listed(keys: Document, options: IndexOptions) -> IndexModel {
        IndexModel::builder().keys(keys).options(options).build()
    }

    fn named(name: &str) -> IndexOptions {
        let mut options = IndexOptions::default();
        options.name = Some(name.to_string());
        options
    }

    #[test]
    fn spec_to_key_document() {
        let spec = IndexSpec::new("orders").asc("userId").desc("createdAt");
        let model = index_model(&spec);

        assert_eq!(model.keys, doc! { "userId": 1, "createdAt": -1 });
        let options = model.options.unwrap();
        assert_eq!(options.unique, None);
        assert_eq!(options.name, None);
    }

    #[test]
    fn unique_and_named_spec() {
        let spec = IndexSpec::new("users").asc("email").unique().named("email_unique");
        let options = index_model(&spec).options.unwrap();

        assert_eq!(options.unique, Some(true));
        assert_eq!(options.name.as_deref(), Some("email_unique"));
    }

    #[test]
    fn text_spec_key() {
        let model = index_model(&IndexSpec::new("restaurants").text("name"));
        assert_eq!(model.keys, doc! { "name": "text" });
    }

    #[test]
    fn listed_numeric_directions() {
        let existing = existing_index(&listed(
            doc! { "status": 1.0, "createdAt": -1_i64 },
            named("status_1_createdAt_-1"),
        ));

        assert!(IndexSpec::new("orders")
            .asc("status")
            .desc("createdAt")
            .is_satisfied_by(&existing));
        assert_eq!(existing.name, "status_1_createdAt_-1");
    }

    #[test]
    fn listed_text_index_is_normalized() {
        let mut options = named("name_text");
        options.weights = Some(doc! { "name": 1 });

        let existing = existing_index(&listed(doc! { "_fts": "text", "_ftsx": 1 }, options));

        assert_eq!(existing.fields, vec![IndexField::new("name", IndexOp::Text)]);
        assert!(IndexSpec::new("restaurants").text("name").is_satisfied_by(&existing));
    }

    #[test]
    fn listed_unknown_kind() {
        let existing = existing_index(&listed(doc! { "userId": "hashed" }, named("userId_hashed")));

        assert_eq!(
            existing.fields,
            vec![IndexField::new("userId", IndexOp::Other("hashed".to_string()))]
        );
    }

    #[test]
    fn listed_unique_flag() {
        let mut options = named("email_1");
        options.unique = Some(true);

        let existing = existing_index(&listed(doc! { "email": 1 }, options));
        assert!(existing.unique);
    }
}
