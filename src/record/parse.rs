//! Structural mapping from a JSON document onto [`Record`] trees.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use super::{BlobRef, ObjectRecord, Record};
use crate::util::{Error, Result};

const OBJECT_KEY: &str = "object";
const SEQUENCE_KEY: &str = "sequence";
const STRING_KEY: &str = "string";
const NUMERIC_KEY: &str = "numeric";
const BLOB_KEY: &str = "blob";

const META_INFOS_KEY: &str = "meta_infos";
const ATTRIBUTES_KEY: &str = "attributes";

/// Read and parse the document at `path`.
pub fn load_document(path: impl AsRef<Path>) -> Result<Record> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::from_io_at(e, path))?;
    debug!("Parsing document {} ({} bytes)", path.display(), text.len());
    parse_document(&text)
}

/// Parse document text into a record tree.
pub fn parse_document(text: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(text)?;
    Ok(Record::from_json(&value))
}

impl Record {
    /// Map a JSON value onto a record.
    ///
    /// Typed wrappers (`{"object": ...}`, `{"sequence": ...}`, ...) map to
    /// their variant. Other maps become objects, or sequences when every key
    /// is a numeric index. Arrays become sequences keyed by position.
    pub fn from_json(value: &Value) -> Record {
        match value {
            Value::Object(map) => from_map(map),
            Value::Array(items) => Record::Sequence(
                items.iter().enumerate().map(|(i, v)| (i, Record::from_json(v))).collect(),
            ),
            Value::String(s) => Record::String(s.clone()),
            Value::Number(n) => Record::Numeric(n.as_f64().unwrap_or(f64::NAN)),
            Value::Bool(b) => Record::Numeric(if *b { 1.0 } else { 0.0 }),
            Value::Null => Record::String(String::new()),
        }
    }
}

fn from_map(map: &Map<String, Value>) -> Record {
    if map.len() == 1 {
        if let Some((key, inner)) = map.iter().next() {
            if let Some(record) = from_wrapper(key, inner) {
                return record;
            }
        }
    }
    if map.contains_key(META_INFOS_KEY) {
        return object_body(map);
    }
    generic_map(map)
}

fn from_wrapper(key: &str, inner: &Value) -> Option<Record> {
    let record = match (key, inner) {
        (OBJECT_KEY, Value::Object(body)) => object_body(body),
        (SEQUENCE_KEY, Value::Object(entries)) if entries.is_empty() => Record::Sequence(Vec::new()),
        (SEQUENCE_KEY, Value::Object(entries)) => generic_map(entries),
        (SEQUENCE_KEY, Value::Array(_)) => Record::from_json(inner),
        (STRING_KEY, Value::Object(leaf)) => match leaf.get("value")? {
            Value::String(s) => Record::String(s.clone()),
            other => Record::String(other.to_string()),
        },
        (NUMERIC_KEY, Value::Object(leaf)) => match leaf.get("value")? {
            Value::Number(n) => Record::Numeric(n.as_f64()?),
            Value::String(s) => match s.trim().parse() {
                Ok(v) => Record::Numeric(v),
                Err(_) => Record::String(s.clone()),
            },
            _ => return None,
        },
        (BLOB_KEY, Value::Object(leaf)) => Record::BlobRef(BlobRef {
            path: leaf.get("buffer")?.as_str()?.to_string(),
        }),
        _ => return None,
    };
    Some(record)
}

fn object_body(body: &Map<String, Value>) -> Record {
    let discriminator = body
        .get(META_INFOS_KEY)
        .and_then(|m| m.get("item_0"))
        .and_then(|m| m.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let attributes = match body.get(ATTRIBUTES_KEY) {
        Some(Value::Object(attrs)) => attrs
            .iter()
            .map(|(k, v)| (k.clone(), Record::from_json(v)))
            .collect(),
        _ => Vec::new(),
    };

    Record::Object(ObjectRecord { discriminator, attributes })
}

fn generic_map(map: &Map<String, Value>) -> Record {
    let keys: Option<Vec<usize>> = map.keys().map(|k| k.parse().ok()).collect();
    match keys {
        Some(keys) if !keys.is_empty() => {
            let mut entries: Vec<(usize, Record)> = keys
                .into_iter()
                .zip(map.values())
                .map(|(k, v)| (k, Record::from_json(v)))
                .collect();
            entries.sort_by_key(|(k, _)| *k);
            Record::Sequence(entries)
        }
        _ => Record::Object(ObjectRecord {
            discriminator: None,
            attributes: map
                .iter()
                .map(|(k, v)| (k.clone(), Record::from_json(v)))
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IMAGE_TAG;
    use serde_json::json;

    #[test]
    fn test_typed_wrappers() {
        let doc = json!({
            "object": {
                "meta_infos": { "item_0": { "value": IMAGE_TAG } },
                "attributes": {
                    "name": { "string": { "value": "CT" } },
                    "window": { "numeric": { "value": "40.5" } },
                    "size": { "sequence": {
                        "1": { "string": { "value": "8" } },
                        "0": { "string": { "value": "4" } }
                    } },
                    "buffer": { "blob": { "buffer": "root-json/a.raw" } }
                }
            }
        });
        let rec = Record::from_json(&doc);

        assert_eq!(rec.discriminator(), Some(IMAGE_TAG));
        assert_eq!(rec.get("name").and_then(Record::as_str), Some("CT"));
        assert_eq!(rec.get("window"), Some(&Record::Numeric(40.5)));
        assert_eq!(rec.get("size").and_then(Record::int_sequence), Some(vec![4, 8]));
        assert_eq!(
            rec.get("buffer").and_then(Record::as_blob).map(|b| b.path.as_str()),
            Some("root-json/a.raw")
        );
    }

    #[test]
    fn test_generic_maps() {
        let rec = Record::from_json(&json!({
            "10": "b",
            "2": "a"
        }));
        let keys: Vec<usize> = rec.entries().unwrap().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [2, 10]);

        let rec = Record::from_json(&json!({ "label": 3, "flag": true }));
        assert_eq!(rec.discriminator(), None);
        assert_eq!(rec.get("label"), Some(&Record::Numeric(3.0)));
        assert_eq!(rec.get("flag"), Some(&Record::Numeric(1.0)));
    }

    #[test]
    fn test_bare_object_body_keeps_discriminator() {
        let rec = Record::from_json(&json!({
            "meta_infos": { "item_0": { "value": "::fwData::Mesh" } },
            "attributes": {}
        }));
        assert_eq!(rec.discriminator(), Some("::fwData::Mesh"));
    }

    #[test]
    fn test_attribute_order_preserved() {
        let rec = Record::from_json(&json!({
            "object": {
                "meta_infos": {},
                "attributes": { "z": 1, "a": 2, "m": 3 }
            }
        }));
        let names: Vec<&str> = rec
            .as_object()
            .unwrap()
            .attributes
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_document("{ not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_document() {
        let err = load_document("/nonexistent/root.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
