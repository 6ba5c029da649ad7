//! RecordStore - the ordered set of rows in the view.
//!
//! The store owns every [`Record`] and is only mutated by the sync engine.
//! Rendering reads it, nothing else writes it.

use crate::{error::Result, Error, FieldName, Filter, Generation, Record, RecordId};
use std::collections::{BTreeSet, HashMap};

/// Records in insertion order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    /// Position of each record in `records`
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty record.
    pub fn add_record(&mut self, id: impl Into<RecordId>) -> Result<()> {
        self.insert(Record::new(id))
    }

    /// Add an empty record, remembering the latest issued generation so
    /// answers to older requests skip it.
    pub(crate) fn add_record_at(
        &mut self,
        id: impl Into<RecordId>,
        generation: Generation,
    ) -> Result<()> {
        self.insert(Record::new(id).added_at(generation))
    }

    fn insert(&mut self, record: Record) -> Result<()> {
        if self.index.contains_key(&record.id) {
            return Err(Error::RecordAlreadyExists(record.id));
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Remove a record and return it.
    pub fn remove_record(&mut self, id: &str) -> Result<Record> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        let record = self.records.remove(position);

        for later in &self.records[position..] {
            if let Some(slot) = self.index.get_mut(&later.id) {
                *slot -= 1;
            }
        }

        Ok(record)
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        let position = *self.index.get(id)?;
        self.records.get_mut(position)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// All ids in insertion order.
    pub fn all_ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Ids of the records passing the filter, in insertion order.
    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.records
            .iter()
            .filter(|r| r.is_visible())
            .map(|r| r.id.clone())
            .collect()
    }

    /// Re-evaluate every record against the filter.
    ///
    /// Returns how many records flipped visibility.
    pub fn recompute_visibility(&mut self, filter: &Filter) -> usize {
        self.records
            .iter_mut()
            .map(|record| {
                let visible = filter.matches(record);
                record.set_visible(visible)
            })
            .filter(|flipped| *flipped)
            .count()
    }

    /// Merge a partial snapshot into a record.
    ///
    /// Only values that differ from what is stored are written. Returns the
    /// names of the fields that actually changed.
    pub fn merge(
        &mut self,
        id: &str,
        partial: impl IntoIterator<Item = (FieldName, serde_json::Value)>,
    ) -> Result<BTreeSet<FieldName>> {
        let record = self
            .get_mut(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;

        let mut changed = BTreeSet::new();
        for (name, value) in partial {
            if record.merge_field(name.clone(), value) {
                changed.insert(name);
            }
        }
        Ok(changed)
    }

    /// Drop every fetched field of a record.
    pub fn reset(&mut self, id: &str) -> Result<()> {
        let record = self
            .get_mut(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        record.reset();
        Ok(())
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Count of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
