use std::cmp::Ordering;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::query::{FindOptions, Filter, SortOrder};

/// A schemaless record as stored in a collection.
pub type Document = Map<String, Value>;

/// Reserved identifier field, assigned on insert when missing.
pub const ID_FIELD: &str = "_id";

/// Returns the document's identifier, assigning a fresh one if it has none.
pub fn ensure_id(document: &mut Document) -> Value {
    document
        .entry(ID_FIELD)
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
        .clone()
}

/// Key used by stores that index documents by a text identifier.
pub fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order over field values, following the document-store convention
/// of ranking by type first (null < number < string < object < array < bool).
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Evaluates a find request over an in-memory collection: filter, stable
/// sort, skip, then limit.
pub fn apply_find<'a, I>(documents: I, filter: &Filter, options: &FindOptions) -> Vec<Document>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut matched: Vec<&Document> = documents
        .into_iter()
        .filter(|doc| filter.matches(doc))
        .collect();

    if let Some(sort) = &options.sort {
        // Missing fields sort as null.
        matched.sort_by(|a, b| {
            let left = a.get(&sort.field).unwrap_or(&Value::Null);
            let right = b.get(&sort.field).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right);
            match sort.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    let skip = options.skip.unwrap_or(0) as usize;
    let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);

    matched
        .into_iter()
        .skip(skip)
        .take(limit)
        .cloned()
        .collect()
}
