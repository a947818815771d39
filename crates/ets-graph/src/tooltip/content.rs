//! Tooltip markup for an event record.
//!
//! The record is walked depth-first. Nested mappings are flattened into the
//! same definition list, sequences become a single comma-joined pair, and
//! scalar values that look like an email address or URL become links. Values
//! are interpolated as-is; no HTML escaping is performed.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::models::{EventRecord, EventValue};

/// Key that marks a mapping as list-like, so it is rendered instead of flattened.
const LENGTH_KEY: &str = "length";

/// Renders `record` as a `<dl>` fragment, one `<dt>`/`<dd>` pair per value.
///
/// # Examples
/// ```
/// # use ets_graph::models::EventRecord;
/// # use ets_graph::tooltip::format_event;
/// let record = EventRecord::from_json(serde_json::json!({
///     "end_time": "2016-07-19",
///     "tags": {"author": ["dev@example.com"]}
/// }))
/// .unwrap();
/// assert_eq!(
///     format_event(&record),
///     "<dl><dt>end time:</dt><dd>2016-07-19</dd>\
///      <dt>author:</dt><dd><a href=\"mailto:dev@example.com\">dev@example.com</a></dd></dl>"
/// );
/// ```
#[must_use]
pub fn format_event(record: &EventRecord) -> String {
    let mut pairs = Vec::new();
    for (key, value) in record.fields() {
        unpack(key, value, &mut pairs);
    }

    let mut markup = String::from("<dl>");
    for (term, description) in pairs {
        markup.push_str(&definition(&term, &description));
    }
    markup.push_str("</dl>");
    markup
}

/// Collects `(key, rendered value)` pairs in source order.
fn unpack(key: &str, value: &EventValue, pairs: &mut Vec<(String, String)>) {
    match value {
        EventValue::Scalar(text) => pairs.push((key.to_string(), linkify(text))),
        EventValue::Sequence(items) => pairs.push((key.to_string(), join_items(items))),
        EventValue::Mapping(fields) if fields.contains_key(LENGTH_KEY) => {
            pairs.push((key.to_string(), join_mapping(fields)));
        }
        EventValue::Mapping(fields) => {
            for (nested_key, nested) in fields {
                unpack(nested_key, nested, pairs);
            }
        }
    }
}

fn join_items(items: &[EventValue]) -> String {
    items.iter().map(|item| linkify(&item.plain_text())).join(", ")
}

fn join_mapping(fields: &IndexMap<String, EventValue>) -> String {
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != LENGTH_KEY)
        .map(|(_, item)| linkify(&item.plain_text()))
        .join(", ")
}

/// `<dt>` with the first underscore of the key replaced by a space.
fn definition(term: &str, description: &str) -> String {
    let label = term.replacen('_', " ", 1);
    format!("<dt>{label}:</dt><dd>{description}</dd>")
}

fn linkify(text: &str) -> String {
    if text.contains('@') {
        format!("<a href=\"mailto:{text}\">{text}</a>")
    } else if text.contains("http") {
        format!("<a href=\"{text}\">{text}</a>")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn format(value: serde_json::Value) -> String {
        format_event(&EventRecord::from_json(value).unwrap())
    }

    #[test]
    fn test_first_underscore_only() {
        assert_eq!(
            format(json!({"a_b_c": "x"})),
            "<dl><dt>a b_c:</dt><dd>x</dd></dl>"
        );
    }

    #[test]
    fn test_sequence_joined_with_links() {
        assert_eq!(
            format(json!({"urls": ["http://a", "plain", "me@x.io"]})),
            "<dl><dt>urls:</dt><dd><a href=\"http://a\">http://a</a>, plain, \
             <a href=\"mailto:me@x.io\">me@x.io</a></dd></dl>"
        );
    }

    #[test]
    fn test_email_wins_over_url() {
        assert_eq!(
            linkify("http://user@host"),
            "<a href=\"mailto:http://user@host\">http://user@host</a>"
        );
    }

    #[test]
    fn test_nested_mapping_flattened_in_place() {
        assert_eq!(
            format(json!({"a": "1", "nested": {"b": "2", "deeper": {"c": "3"}}, "d": "4"})),
            "<dl><dt>a:</dt><dd>1</dd><dt>b:</dt><dd>2</dd><dt>c:</dt><dd>3</dd>\
             <dt>d:</dt><dd>4</dd></dl>"
        );
    }

    #[test]
    fn test_sequence_does_not_recurse() {
        assert_eq!(
            format(json!({"list": [["a", "b"], {"k": "v"}]})),
            "<dl><dt>list:</dt><dd>a,b, {\"k\":\"v\"}</dd></dl>"
        );
    }

    #[test]
    fn test_length_mapping_rendered_as_list() {
        assert_eq!(
            format(json!({"arr": {"0": "x", "1": "y", "length": "2"}})),
            "<dl><dt>arr:</dt><dd>x, y</dd></dl>"
        );
    }

    #[test]
    fn test_no_escaping() {
        assert_eq!(
            format(json!({"description": "<b>bold</b>"})),
            "<dl><dt>description:</dt><dd><b>bold</b></dd></dl>"
        );
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(format(json!({})), "<dl></dl>");
    }
}
