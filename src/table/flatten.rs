//! Flattening of nested JSON objects into dotted column names

use super::Cell;
use serde_json::{Map, Value};

/// One flat row: `(column, value)` pairs in the order the service sent the keys
pub type Record = Vec<(String, Cell)>;

/// Flatten a JSON object into a [`Record`]
///
/// Nested objects become dotted keys (`{"sensor": {"type": "car"}}` yields
/// `sensor.type`). Arrays are not exploded and stay as [`Cell::Json`]. Empty
/// nested objects contribute no columns.
pub fn flatten_object(object: &Map<String, Value>) -> Record {
    let mut record = Vec::with_capacity(object.len());
    flatten_into(&mut record, None, object);
    record
}

fn flatten_into(record: &mut Record, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(record, Some(&name), inner),
            other => record.push((name, Cell::from(other.clone()))),
        }
    }
}

/// Rename every key of `record` through `f`
pub fn rename_keys(record: Record, f: impl Fn(&str) -> String) -> Record {
    record.into_iter().map(|(k, v)| (f(&k), v)).collect()
}
