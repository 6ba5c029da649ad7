//! Status snapshots exchanged with the remote source.
//!
//! A request names the records and fields wanted; the answer is a map of
//! record id to partial field map. Ordered maps keep requests and logs
//! deterministic.

use crate::{FieldName, Generation, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field values for one record, as returned by a single fetch.
pub type FieldMap = BTreeMap<FieldName, serde_json::Value>;

/// Snapshots for many records.
pub type StatusMap = BTreeMap<RecordId, FieldMap>;

/// A batched status request for the visible records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    /// Poll cycle this request belongs to
    pub generation: Generation,
    /// Records to fetch, in view order
    pub ids: Vec<RecordId>,
    /// Fields to fetch, deduplicated
    pub fields: Vec<FieldName>,
}

impl StatusRequest {
    /// Create a new status request.
    pub fn new(generation: Generation, ids: Vec<RecordId>, fields: Vec<FieldName>) -> Self {
        Self {
            generation,
            ids,
            fields,
        }
    }

    /// Build the answer to this request.
    pub fn respond(&self, statuses: Option<StatusMap>) -> StatusResponse {
        StatusResponse::new(self.generation, statuses)
    }
}

/// The answer to a [`StatusRequest`].
///
/// `statuses` is `None` when the source had nothing to say (a null reply or
/// a failed fetch). That means "no new data", never "forget what you have".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Generation of the request being answered
    pub generation: Generation,
    /// Partial snapshots per record
    pub statuses: Option<StatusMap>,
}

impl StatusResponse {
    /// Create a new response.
    pub fn new(generation: Generation, statuses: Option<StatusMap>) -> Self {
        Self {
            generation,
            statuses,
        }
    }

    /// Check if the response carries no snapshot at all.
    pub fn is_empty(&self) -> bool {
        self.statuses.as_ref().map_or(true, |s| s.is_empty())
    }

    /// Count of records carried.
    pub fn record_count(&self) -> usize {
        self.statuses.as_ref().map_or(0, |s| s.len())
    }
}

/// Turn a raw JSON status reply into a [`StatusMap`].
///
/// `null` yields `None`. Any other non-object top level is treated the same
/// way, with a warning. Entries whose snapshot is not an object are skipped
/// one by one so a single malformed record cannot sink the whole reply.
pub fn parse_status(raw: serde_json::Value) -> Option<StatusMap> {
    let entries = match raw {
        serde_json::Value::Null => return None,
        serde_json::Value::Object(entries) => entries,
        other => {
            tracing::warn!(
                kind = %value_kind(&other),
                "Status reply is not an object, ignoring"
            );
            return None;
        }
    };

    let mut statuses = StatusMap::new();
    for (id, snapshot) in entries {
        match snapshot {
            serde_json::Value::Object(fields) => {
                statuses.insert(id, fields.into_iter().collect());
            }
            other => {
                tracing::warn!(
                    record_id = %id,
                    kind = %value_kind(&other),
                    "Skipping malformed status entry"
                );
            }
        }
    }
    Some(statuses)
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
