//! Records: the local view of one remote torrent.

use crate::{FieldName, Generation, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row of the view.
///
/// `fields` is sparse: an absent field has not been fetched yet. Fields are
/// only ever merged in; [`Record::reset`] is the one way to drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique, stable identifier
    pub id: RecordId,
    /// Latest known value per field
    fields: BTreeMap<FieldName, serde_json::Value>,
    /// Derived from `fields` and the active filter
    visible: bool,
    /// Latest generation issued when this record was added
    added_at: Generation,
}

impl Record {
    /// Create an empty record, visible until the first filter pass says otherwise.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            visible: true,
            added_at: Generation::ZERO,
        }
    }

    pub(crate) fn added_at(mut self, generation: Generation) -> Self {
        self.added_at = generation;
        self
    }

    /// Get a field value, if it has been fetched.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// All fetched fields.
    pub fn fields(&self) -> &BTreeMap<FieldName, serde_json::Value> {
        &self.fields
    }

    /// Whether the record passes the active filter.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Check whether an answer to the request of `generation` may apply here.
    ///
    /// A request issued before the record existed was not asking about it,
    /// even if a record with the same id was around back then.
    pub fn accepts(&self, generation: Generation) -> bool {
        self.added_at.precedes(&generation)
    }

    /// Write a field if the value differs. Returns whether it changed.
    pub fn merge_field(&mut self, name: impl Into<FieldName>, value: serde_json::Value) -> bool {
        let name = name.into();
        match self.fields.get(&name) {
            Some(current) if *current == value => false,
            _ => {
                self.fields.insert(name, value);
                true
            }
        }
    }

    /// Drop every fetched field.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    /// Update the visibility flag. Returns whether it flipped.
    pub(crate) fn set_visible(&mut self, visible: bool) -> bool {
        let flipped = self.visible != visible;
        self.visible = visible;
        flipped
    }
}
