//! Event records as supplied by the event tracking service.
//!
//! An event is an ordered mapping from string keys to strings, string lists,
//! or further nested mappings. Insertion order is preserved because the
//! tooltip lists fields in the order the service emitted them.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// One value inside an event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    /// A leaf string.
    Scalar(String),
    /// An ordered list of values.
    Sequence(Vec<EventValue>),
    /// A nested mapping, iteration order = source order.
    Mapping(IndexMap<String, EventValue>),
}

impl EventValue {
    /// Converts a JSON value into an event value.
    ///
    /// Numbers and booleans become their textual form; `null` is rejected.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidEvent` when a `null` is found anywhere in the value.
    pub fn from_json(key: &str, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Err(GraphError::invalid_event(format!(
                "value for '{key}' must not be null"
            ))),
            serde_json::Value::Bool(b) => Ok(Self::Scalar(b.to_string())),
            serde_json::Value::Number(n) => Ok(Self::Scalar(n.to_string())),
            serde_json::Value::String(s) => Ok(Self::Scalar(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| Self::from_json(key, item))
                .collect::<Result<Vec<_>>>()
                .map(Self::Sequence),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Self::from_json(&k, v).map(|v| (k, v)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(Self::Mapping),
        }
    }

    /// Returns the string if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[EventValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&IndexMap<String, EventValue>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Plain text rendering used when a value is nested inside a sequence.
    ///
    /// Nested sequences join with a bare comma, nested mappings render as
    /// compact JSON.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::Sequence(items) => items.iter().map(Self::plain_text).join(","),
            Self::Mapping(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

/// The `event` object of a tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: IndexMap<String, EventValue>,
}

impl EventRecord {
    /// Creates a record from already-converted fields.
    #[must_use]
    pub const fn new(fields: IndexMap<String, EventValue>) -> Self {
        Self { fields }
    }

    /// Converts a JSON object into a record.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidEvent` if the value is not an object or
    /// contains `null` anywhere.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match EventValue::from_json("event", value)? {
            EventValue::Mapping(fields) => Ok(Self { fields }),
            _ => Err(GraphError::invalid_event("event must be a JSON object")),
        }
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.fields.get(key)
    }

    /// The event's own `id`, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(EventValue::as_scalar)
    }

    /// Human-readable identity used in error messages.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.id().map_or_else(|| "<no id>".to_string(), str::to_string)
    }

    /// All top-level fields in source order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &EventValue)> {
        self.fields.iter()
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
