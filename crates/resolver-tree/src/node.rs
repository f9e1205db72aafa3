//! Resolver nodes
//!
//! Provides [`ResolverNode`], one process record as delivered by the backend,
//! and [`NodeId`], the key every index is built on.
//!
//! Only `id` and `parent` are interpreted by the index. The sibling time is
//! read from `data["@timestamp"]`; everything else is carried through as-is.

use crate::config::UntimedPlacement;
use crate::error::{Result, TreeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Field holding the event time inside `data`
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Unique identifier of a resolver node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Related event counts attached to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Total related events
    pub total: u64,
    /// Related events per category
    #[serde(default)]
    pub by_category: BTreeMap<String, u64>,
}

/// One process record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverNode {
    /// Unique id
    pub id: NodeId,

    /// Id of the parent process, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,

    /// Process name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw document fields
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Related event counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<EventStats>,
}

impl ResolverNode {
    /// Create a node with no parent and empty payload
    #[must_use]
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            name: None,
            data: Map::new(),
            stats: None,
        }
    }

    /// With parent id
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// With process name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With `@timestamp`, stored as epoch milliseconds
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.data.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::from(timestamp.timestamp_millis()),
        );
        self
    }

    /// With an arbitrary data field
    #[inline]
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// With related event counts
    #[inline]
    #[must_use]
    pub fn with_stats(mut self, stats: EventStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Event time, if `@timestamp` holds something readable
    ///
    /// Accepts epoch milliseconds (number or numeric string), RFC 3339
    /// strings, and arrays whose first non-null element is either.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.data.get(TIMESTAMP_FIELD).and_then(parse_timestamp)
    }

    /// Name, falling back to the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(millis) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(text) => match text.parse::<i64>() {
            Ok(millis) => DateTime::<Utc>::from_timestamp_millis(millis),
            Err(_) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc)),
        },
        Value::Array(values) => values
            .iter()
            .find(|value| !value.is_null())
            .and_then(parse_timestamp),
        _ => None,
    }
}

/// Sort key for siblings; stable sorts on it keep insertion order for ties
pub(crate) fn sibling_key(node: &ResolverNode, placement: UntimedPlacement) -> (bool, i64) {
    match (node.timestamp(), placement) {
        (Some(time), _) => (placement == UntimedPlacement::First, time.timestamp_millis()),
        (None, UntimedPlacement::Last) => (true, 0),
        (None, UntimedPlacement::First) => (false, 0),
    }
}

/// Compare two siblings by event time, ascending
#[must_use]
pub fn order_by_time(a: &ResolverNode, b: &ResolverNode, placement: UntimedPlacement) -> Ordering {
    sibling_key(a, placement).cmp(&sibling_key(b, placement))
}

/// Decode raw backend records into nodes
///
/// Records without a string `id` are skipped: they cannot be indexed.
///
/// # Errors
/// Returns [`TreeError::InvalidRecord`] when a record with an id fails to
/// decode (for example a numeric `parent`).
pub fn nodes_from_records<I>(records: I) -> Result<Vec<ResolverNode>>
where
    I: IntoIterator<Item = Value>,
{
    let mut nodes = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        if record.get("id").and_then(Value::as_str).is_none() {
            tracing::debug!(index, "skipping record without node id");
            continue;
        }
        let node = serde_json::from_value(record).map_err(|e| TreeError::InvalidRecord {
            index,
            reason: e.to_string(),
        })?;
        nodes.push(node);
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_id_borrows_as_str() {
        let id = NodeId::from("proc-1");
        let borrowed: &str = id.borrow();
        assert_eq!(borrowed, "proc-1");
        assert_eq!(id.to_string(), "proc-1");
    }

    #[test]
    fn node_deserializes_backend_shape() {
        let node: ResolverNode = serde_json::from_value(json!({
            "id": "b",
            "parent": "a",
            "name": "bash",
            "data": {"@timestamp": 1000, "process.pid": 42},
            "stats": {"total": 3, "byCategory": {"network": 2, "file": 1}}
        }))
        .unwrap();

        assert_eq!(node.id.as_str(), "b");
        assert_eq!(node.parent, Some(NodeId::from("a")));
        assert_eq!(node.display_name(), "bash");
        assert_eq!(node.stats.as_ref().map(|s| s.total), Some(3));
        assert_eq!(node.data["process.pid"], json!(42));
    }

    #[test]
    fn timestamp_accepts_millis_strings_and_arrays() {
        let millis = ResolverNode::new("a").with_data(TIMESTAMP_FIELD, 1_500);
        assert_eq!(millis.timestamp().map(|t| t.timestamp_millis()), Some(1_500));

        let numeric = ResolverNode::new("a").with_data(TIMESTAMP_FIELD, "1500");
        assert_eq!(numeric.timestamp().map(|t| t.timestamp_millis()), Some(1_500));

        let rfc = ResolverNode::new("a").with_data(TIMESTAMP_FIELD, "1970-01-01T00:00:01.500Z");
        assert_eq!(rfc.timestamp().map(|t| t.timestamp_millis()), Some(1_500));

        let array = ResolverNode::new("a").with_data(TIMESTAMP_FIELD, json!([null, 1_500]));
        assert_eq!(array.timestamp().map(|t| t.timestamp_millis()), Some(1_500));

        let garbage = ResolverNode::new("a").with_data(TIMESTAMP_FIELD, "yesterday");
        assert!(garbage.timestamp().is_none());
        assert!(ResolverNode::new("a").timestamp().is_none());
    }

    #[test]
    fn untimed_siblings_follow_placement() {
        let timed = ResolverNode::new("t").with_data(TIMESTAMP_FIELD, 10);
        let untimed = ResolverNode::new("u");

        assert_eq!(
            order_by_time(&timed, &untimed, UntimedPlacement::Last),
            Ordering::Less
        );
        assert_eq!(
            order_by_time(&timed, &untimed, UntimedPlacement::First),
            Ordering::Greater
        );
        assert_eq!(
            order_by_time(&untimed, &untimed, UntimedPlacement::Last),
            Ordering::Equal
        );
    }

    #[test]
    fn records_without_id_are_skipped() {
        let nodes = nodes_from_records(vec![
            json!({"id": "a"}),
            json!({"name": "anonymous"}),
            json!({"id": 7}),
            json!({"id": "b", "parent": "a"}),
        ])
        .unwrap();

        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn malformed_record_reports_index() {
        let err = nodes_from_records(vec![json!({"id": "a"}), json!({"id": "b", "parent": 5})])
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidRecord { index: 1, .. }));
    }
}
