//! Namespace tree: the nested text/list/map structure exchanged with a
//! metadata storage backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::defaults::PREFIX_SEPARATOR;

/// A node of the namespace tree. Every leaf is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    List(Vec<Node>),
    Map(BTreeMap<String, Node>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Map(BTreeMap::new())
    }
}

impl Node {
    pub fn empty_map() -> Self {
        Node::default()
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Text(_) => false,
            Node::List(items) => items.is_empty(),
            Node::Map(map) => map.is_empty(),
        }
    }

    /// Tree form of a JSON value: scalars become text. Null map values are
    /// dropped; null list elements become empty text so positions hold.
    /// Returns `None` when the value itself is null.
    pub fn from_json(value: &JsonValue) -> Option<Node> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(Node::Text(b.to_string())),
            JsonValue::Number(n) => Some(Node::Text(n.to_string())),
            JsonValue::String(s) => Some(Node::Text(s.clone())),
            JsonValue::Array(items) => Some(Node::List(
                items
                    .iter()
                    .map(|item| Node::from_json(item).unwrap_or_else(|| Node::Text(String::new())))
                    .collect(),
            )),
            JsonValue::Object(map) => Some(Node::Map(
                map.iter()
                    .filter_map(|(k, v)| Node::from_json(v).map(|node| (k.clone(), node)))
                    .collect(),
            )),
        }
    }

    /// JSON form with every leaf as a string.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Node::Text(text) => JsonValue::String(text.clone()),
            Node::List(items) => JsonValue::Array(items.iter().map(Node::to_json).collect()),
            Node::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, JsonValue>>(),
            ),
        }
    }

    /// Rewrite every map key to the part after its last prefix separator,
    /// at any depth. List elements are visited but not renamed.
    pub fn strip_prefixes(self) -> Node {
        match self {
            Node::Text(text) => Node::Text(text),
            Node::List(items) => Node::List(items.into_iter().map(Node::strip_prefixes).collect()),
            Node::Map(map) => Node::Map(
                map.into_iter()
                    .map(|(k, v)| (strip_prefix(&k).to_string(), v.strip_prefixes()))
                    .collect(),
            ),
        }
    }

    /// Attach `prefix` to every map key that has none, at any depth.
    pub fn with_prefix(self, prefix: &str) -> Node {
        match self {
            Node::Text(text) => Node::Text(text),
            Node::List(items) => Node::List(
                items
                    .into_iter()
                    .map(|item| item.with_prefix(prefix))
                    .collect(),
            ),
            Node::Map(map) => Node::Map(
                map.into_iter()
                    .map(|(k, v)| {
                        let key = if k.contains(PREFIX_SEPARATOR) {
                            k
                        } else {
                            format!("{}{}{}", prefix, PREFIX_SEPARATOR, k)
                        };
                        (key, v.with_prefix(prefix))
                    })
                    .collect(),
            ),
        }
    }
}

/// Substring after the last prefix separator (the whole key if none).
pub fn strip_prefix(key: &str) -> &str {
    key.rsplit(PREFIX_SEPARATOR).next().unwrap_or(key)
}
