//! Typed view of an event's `tags` mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::event::{EventRecord, EventValue};
use crate::error::{GraphError, Result};

/// Status value that marks an event as failed.
pub const FAIL_STATUS: &str = "fail";

/// Tags carried by every event, validated once at ingestion.
///
/// `source` and `type` are required because node labels read them
/// unconditionally; everything else is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTags {
    pub source: Vec<String>,
    #[serde(rename = "type")]
    pub event_type: Vec<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default)]
    pub author: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub environment: Vec<String>,
    /// Any other tag, in source order.
    #[serde(default)]
    pub extra: IndexMap<String, Vec<String>>,
}

impl EventTags {
    /// Extracts and validates the tags of an event record.
    ///
    /// # Errors
    ///
    /// * `GraphError::MissingField` if `tags`, `tags.source` or `tags.type` is
    ///   absent or empty
    /// * `GraphError::InvalidEvent` if a tag key is empty or a tag value is not
    ///   a list of strings
    pub fn from_record(record: &EventRecord) -> Result<Self> {
        let event_id = record.display_id();
        let tags = record
            .get("tags")
            .ok_or_else(|| GraphError::missing_field(&event_id, "tags"))?
            .as_mapping()
            .ok_or_else(|| {
                GraphError::invalid_event(format!("event '{event_id}': tags must be a mapping"))
            })?;

        let mut parsed: IndexMap<String, Vec<String>> = IndexMap::with_capacity(tags.len());
        for (key, value) in tags {
            if key.is_empty() {
                return Err(GraphError::invalid_event(format!(
                    "event '{event_id}': tag keys must not be empty"
                )));
            }
            parsed.insert(key.clone(), string_list(&event_id, key, value)?);
        }

        let mut take_required = |field: &str| -> Result<Vec<String>> {
            parsed
                .shift_remove(field)
                .filter(|values| !values.is_empty())
                .ok_or_else(|| GraphError::missing_field(&event_id, format!("tags.{field}")))
        };
        let source = take_required("source")?;
        let event_type = take_required("type")?;

        let status = parsed.shift_remove("status").unwrap_or_default();
        let author = parsed.shift_remove("author").unwrap_or_default();
        let services = parsed.shift_remove("services").unwrap_or_default();
        let environment = parsed.shift_remove("environment").unwrap_or_default();

        Ok(Self {
            source,
            event_type,
            status,
            author,
            services,
            environment,
            extra: parsed,
        })
    }

    /// First source entry, the node's primary label.
    #[must_use]
    pub fn primary_source(&self) -> &str {
        self.source.first().map_or("", String::as_str)
    }

    /// First type entry.
    #[must_use]
    pub fn primary_type(&self) -> &str {
        self.event_type.first().map_or("", String::as_str)
    }

    /// Most recent status entry.
    #[must_use]
    pub fn latest_status(&self) -> Option<&str> {
        self.status.last().map(String::as_str)
    }

    /// True when the most recent status is a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.latest_status() == Some(FAIL_STATUS)
    }
}

fn string_list(event_id: &str, key: &str, value: &EventValue) -> Result<Vec<String>> {
    let invalid = || {
        GraphError::invalid_event(format!(
            "event '{event_id}': tag '{key}' must be a list of strings"
        ))
    };
    match value {
        EventValue::Scalar(s) => Ok(vec![s.clone()]),
        EventValue::Sequence(items) => items
            .iter()
            .map(|item| item.as_scalar().map(str::to_string).ok_or_else(invalid))
            .collect(),
        EventValue::Mapping(_) => Err(invalid()),
    }
}
