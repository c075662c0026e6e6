//! JSON documents as pytrees.
//!
//! - `null` → `None`, arrays → list, scalars → leaf
//! - `{"__tuple__": [...]}` → tuple
//! - `{"__tracked__": {"data": x, "grad": y}}` → tracked leaf (`grad` optional)
//! - any other object → dict, in document order

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::{PyTree, Tracked, TreeError, TreeResult};
use crate::errors::{AppError, AppResult};

const TUPLE_TAG: &str = "__tuple__";
const TRACKED_TAG: &str = "__tracked__";

pub fn from_json_value(value: Value) -> TreeResult<PyTree<Value>> {
    let tree = match value {
        Value::Null => PyTree::None,
        Value::Array(items) => PyTree::List(
            items
                .into_iter()
                .map(from_json_value)
                .collect::<TreeResult<_>>()?,
        ),
        Value::Object(mut map) if map.len() == 1 && map.contains_key(TUPLE_TAG) => {
            match map.remove(TUPLE_TAG) {
                Some(Value::Array(items)) => PyTree::Tuple(
                    items
                        .into_iter()
                        .map(from_json_value)
                        .collect::<TreeResult<_>>()?,
                ),
                _ => {
                    return Err(TreeError::InvalidDocument(format!(
                        "{TUPLE_TAG} must hold an array"
                    )))
                }
            }
        }
        Value::Object(mut map) if map.len() == 1 && map.contains_key(TRACKED_TAG) => {
            match map.remove(TRACKED_TAG) {
                Some(Value::Object(fields)) => PyTree::Tracked(tracked_from_fields(fields)?),
                _ => {
                    return Err(TreeError::InvalidDocument(format!(
                        "{TRACKED_TAG} must hold an object"
                    )))
                }
            }
        }
        Value::Object(map) => PyTree::Dict(
            map.into_iter()
                .map(|(key, child)| from_json_value(child).map(|tree| (key, tree)))
                .collect::<TreeResult<_>>()?,
        ),
        scalar => PyTree::Leaf(scalar),
    };
    Ok(tree)
}

fn tracked_from_fields(mut fields: Map<String, Value>) -> TreeResult<Tracked<Value>> {
    let data = fields
        .remove("data")
        .ok_or_else(|| TreeError::InvalidDocument(format!("{TRACKED_TAG} requires \"data\"")))?;
    let grad = match fields.remove("grad") {
        None | Some(Value::Null) => None,
        Some(grad) => Some(grad),
    };
    if let Some(extra) = fields.keys().next() {
        return Err(TreeError::InvalidDocument(format!(
            "unexpected field in {TRACKED_TAG}: {extra}"
        )));
    }
    Ok(Tracked { data, grad })
}

/// Inverse of [`from_json_value`].
pub fn to_json(tree: &PyTree<Value>) -> Value {
    match tree {
        PyTree::Leaf(value) => value.clone(),
        PyTree::None => Value::Null,
        PyTree::List(items) => Value::Array(items.iter().map(to_json).collect()),
        PyTree::Tuple(items) => {
            let mut map = Map::new();
            map.insert(
                TUPLE_TAG.to_string(),
                Value::Array(items.iter().map(to_json).collect()),
            );
            Value::Object(map)
        }
        PyTree::Dict(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, child)| (key.clone(), to_json(child)))
                .collect(),
        ),
        PyTree::Tracked(Tracked { data, grad }) => {
            let mut fields = Map::new();
            fields.insert("data".to_string(), data.clone());
            if let Some(grad) = grad {
                fields.insert("grad".to_string(), grad.clone());
            }
            let mut map = Map::new();
            map.insert(TRACKED_TAG.to_string(), Value::Object(fields));
            Value::Object(map)
        }
    }
}

pub fn from_json_str(json: &str) -> AppResult<PyTree<Value>> {
    let value: Value = serde_json::from_str(json)?;
    Ok(from_json_value(value)?)
}

#[instrument(level = "debug")]
pub fn load_document(path: &Path) -> AppResult<PyTree<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = from_json_str(&content)?;
    debug!(kind = tree.kind_name(), "loaded document");
    Ok(tree)
}
