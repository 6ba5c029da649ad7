//! The sync engine: one poll cycle at a time.
//!
//! # Cycle
//!
//! 1. Re-evaluate the filter over every record
//! 2. Collect the fields of the syncable columns; stop if there are none
//! 3. Collect the visible ids; stop if there are none
//! 4. Remember which columns this request serves
//! 5. Tag the request with a fresh generation and dispatch it
//! 6. When the answer arrives, drop it unless it answers the latest issued
//!    generation; otherwise validate and merge it field by field
//! 7. Report the changed `(row, column)` cells to the rendering surface
//!
//! The engine never waits on the source. Structural changes (rows added or
//! removed, filter or columns changed) may happen between steps 5 and 6, so
//! step 6 trusts nothing about the store beyond what it can check.

use crate::{
    error::Result, ColumnName, ColumnSchema, Error, FieldMap, FieldName, Filter, Generation,
    RecordId, RecordStore, RemoteStatusSource, RenderingSurface, RowChange, StatusRequest,
    StatusResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Where the engine is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SyncState {
    Idle,
    RequestPending { generation: Generation },
}

/// Why a poll issued no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No syncable column
    NoFields,
    /// Every record is filtered out, or there are none
    NoVisibleRecords,
}

/// Result of [`SyncEngine::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PollOutcome {
    Requested(Generation),
    Skipped(SkipReason),
}

/// Result of [`SyncEngine::on_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyOutcome {
    /// Not the pending generation; nothing touched
    Stale,
    /// Null or empty answer; stored data kept as is
    NoData,
    /// Merged; these cells changed
    Applied(Vec<RowChange>),
}

/// The request in flight, with the columns it was issued for.
#[derive(Debug, Clone)]
struct PendingRequest {
    generation: Generation,
    /// Syncable columns and their fields at request time
    columns: Vec<(ColumnName, Vec<FieldName>)>,
}

/// Keeps a [`RecordStore`] in step with a remote source for the columns and
/// rows the user can actually see.
pub struct SyncEngine<Src, Surf> {
    schema: ColumnSchema,
    store: RecordStore,
    filter: Filter,
    /// Latest generation handed out
    issued: Generation,
    pending: Option<PendingRequest>,
    source: Src,
    surface: Surf,
}

impl<Src, Surf> SyncEngine<Src, Surf>
where
    Src: RemoteStatusSource,
    Surf: RenderingSurface,
{
    /// Create an idle engine with an empty store and no filter.
    pub fn new(schema: ColumnSchema, source: Src, surface: Surf) -> Self {
        Self {
            schema,
            store: RecordStore::new(),
            filter: Filter::none(),
            issued: Generation::ZERO,
            pending: None,
            source,
            surface,
        }
    }

    /// Run one poll cycle up to dispatching the request.
    ///
    /// Callable at any time. A poll while a request is outstanding supersedes
    /// it and the older answer is dropped when it arrives. A poll that issues
    /// nothing leaves the outstanding request current.
    pub fn poll(&mut self) -> PollOutcome {
        let flipped = self.store.recompute_visibility(&self.filter);
        if flipped > 0 {
            debug!(flipped, filter = %self.filter, "Visibility changed");
        }

        let fields = self.schema.active_fields();
        if fields.is_empty() {
            return self.skip(SkipReason::NoFields);
        }

        let ids = self.store.visible_ids();
        if ids.is_empty() {
            return self.skip(SkipReason::NoVisibleRecords);
        }

        let columns = self
            .schema
            .syncable_columns()
            .map(|c| (c.name.clone(), c.field_names().cloned().collect()))
            .collect();

        if let Some(previous) = &self.pending {
            debug!(generation = %previous.generation, "Superseding outstanding status request");
        }

        let generation = self.issued.tick();
        self.pending = Some(PendingRequest {
            generation,
            columns,
        });

        debug!(
            generation = %generation,
            records = ids.len(),
            fields = fields.len(),
            "Requesting status"
        );
        self.source.fetch_status(StatusRequest::new(
            generation,
            ids,
            fields.into_iter().collect(),
        ));

        PollOutcome::Requested(generation)
    }

    fn skip(&mut self, reason: SkipReason) -> PollOutcome {
        debug!(?reason, "Nothing to request");
        PollOutcome::Skipped(reason)
    }

    /// Apply the answer to a status request.
    pub fn on_status(&mut self, response: StatusResponse) -> ApplyOutcome {
        let pending = match self.pending.take() {
            Some(pending)
                if response.generation == self.issued
                    && pending.generation == response.generation =>
            {
                pending
            }
            other => {
                self.pending = other;
                debug!(
                    generation = %response.generation,
                    latest = %self.issued,
                    records = response.record_count(),
                    "Discarding stale status response"
                );
                return ApplyOutcome::Stale;
            }
        };

        let statuses = match response.statuses {
            Some(statuses) if !statuses.is_empty() => statuses,
            _ => {
                debug!(generation = %pending.generation, "Empty status response, keeping current data");
                return ApplyOutcome::NoData;
            }
        };

        let mut changes = Vec::new();
        let mut merged_any = false;
        for (id, snapshot) in statuses {
            match self.store.get(&id) {
                Some(record) if record.accepts(pending.generation) => {}
                Some(_) => {
                    debug!(record_id = %id, "Record added after request, ignoring");
                    continue;
                }
                None => {
                    debug!(record_id = %id, "Status for unknown record, ignoring");
                    continue;
                }
            }

            let changed = match self.merge_checked(&id, snapshot) {
                Ok(changed) => changed,
                Err(e) => {
                    warn!(record_id = %id, error = %e, "Failed to merge status");
                    continue;
                }
            };
            merged_any |= !changed.is_empty();

            for (column, fields) in &pending.columns {
                if fields.iter().any(|f| changed.contains(f)) {
                    changes.push(RowChange::new(id.clone(), column.clone()));
                }
            }
        }

        if merged_any {
            self.store.recompute_visibility(&self.filter);
        }
        if !changes.is_empty() {
            self.surface.on_rows_changed(&changes);
        }

        debug!(
            generation = %pending.generation,
            changes = changes.len(),
            "Applied status response"
        );
        ApplyOutcome::Applied(changes)
    }

    /// Merge the fields of a snapshot that pass schema validation. Fields that
    /// fail are logged and skipped; the rest still apply.
    fn merge_checked(
        &mut self,
        id: &str,
        snapshot: FieldMap,
    ) -> Result<BTreeSet<FieldName>> {
        let schema = &self.schema;
        let valid: Vec<_> = snapshot
            .into_iter()
            .filter(|(field, value)| match schema.check_value(field, value) {
                Ok(()) => true,
                Err(e) => {
                    warn!(record_id = %id, error = %e, "Skipping status field");
                    false
                }
            })
            .collect();

        self.store.merge(id, valid)
    }

    /// Add a row. Its fields stay empty until the next answered poll.
    pub fn add_row(&mut self, id: impl Into<RecordId>) -> Result<()> {
        self.store.add_record_at(id, self.issued)
    }

    /// Remove a row and poll again so the request matches what is left.
    pub fn remove_row(&mut self, id: &str) -> Result<PollOutcome> {
        self.store.remove_record(id)?;
        Ok(self.poll())
    }

    /// Seed the view with the ids of the current session, then poll.
    ///
    /// Ids already present are left alone.
    pub fn seed(&mut self, ids: impl IntoIterator<Item = RecordId>) -> PollOutcome {
        let mut added = 0;
        for id in ids {
            if self.store.contains(&id) {
                continue;
            }
            if self.add_row(id).is_ok() {
                added += 1;
            }
        }
        info!(added, total = self.store.len(), "Seeded torrent view");
        self.poll()
    }

    /// Replace the active filter and poll.
    ///
    /// A field no column declares is rejected and the old filter stays.
    pub fn set_filter(&mut self, filter: Filter) -> Result<PollOutcome> {
        if let Some(field) = &filter.field {
            if !self.schema.knows_field(field) {
                return Err(Error::UnknownField(field.clone()));
            }
        }
        info!(filter = %filter, "Filter changed");
        self.filter = filter;
        Ok(self.poll())
    }

    /// Show or hide a column. Takes effect at the next poll.
    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        self.schema.set_visible(name, visible)
    }

    /// Drop every row and any outstanding request.
    pub fn stop(&mut self) {
        self.store.clear();
        if let Some(abandoned) = self.pending.take() {
            debug!(generation = %abandoned.generation, "Abandoning status request on stop");
        }
    }

    /// Whatever is known about a record, possibly incomplete. Empty if unknown.
    pub fn record_status(&self, id: &str) -> FieldMap {
        self.store
            .get(id)
            .map(|r| r.fields().clone())
            .unwrap_or_default()
    }

    /// Ids currently passing the filter, in view order.
    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.store.visible_ids()
    }
}

impl<Src, Surf> SyncEngine<Src, Surf> {
    pub fn state(&self) -> SyncState {
        match &self.pending {
            Some(pending) => SyncState::RequestPending {
                generation: pending.generation,
            },
            None => SyncState::Idle,
        }
    }

    /// Latest generation issued, [`Generation::ZERO`] before the first request.
    pub fn latest_generation(&self) -> Generation {
        self.issued
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut Src {
        &mut self.source
    }

    pub fn surface(&self) -> &Surf {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surf {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDef, FieldDef, FieldType, StatusMap};
    use serde_json::json;

    type TestEngine = SyncEngine<Vec<StatusRequest>, Vec<RowChange>>;

    fn test_schema() -> ColumnSchema {
        let mut schema = ColumnSchema::new();
        schema
            .register(ColumnDef::new(
                "Name",
                vec![
                    FieldDef::new("state", FieldType::String),
                    FieldDef::new("name", FieldType::String),
                ],
            ))
            .unwrap();
        schema
            .register(ColumnDef::new(
                "Progress",
                vec![
                    FieldDef::new("progress", FieldType::Float),
                    FieldDef::new("state", FieldType::String),
                ],
            ))
            .unwrap();
        schema
            .register(ColumnDef::new(
                "ETA",
                vec![FieldDef::new("eta", FieldType::Int)],
            ))
            .unwrap();
        schema
    }

    fn test_engine(ids: &[&str]) -> TestEngine {
        let mut engine = SyncEngine::new(test_schema(), Vec::new(), Vec::new());
        for id in ids {
            engine.add_row(*id).unwrap();
        }
        engine
    }

    fn statuses(entries: &[(&str, serde_json::Value)]) -> Option<StatusMap> {
        Some(
            entries
                .iter()
                .map(|(id, fields)| {
                    let fields = fields
                        .as_object()
                        .unwrap()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    (id.to_string(), fields)
                })
                .collect(),
        )
    }

    fn requested(outcome: PollOutcome) -> Generation {
        match outcome {
            PollOutcome::Requested(generation) => generation,
            other => panic!("expected a request, got {other:?}"),
        }
    }

    #[test]
    fn poll_requests_visible_ids_and_active_fields() {
        let mut engine = test_engine(&["a", "b"]);
        let generation = requested(engine.poll());

        assert_eq!(generation, Generation::new(1));
        assert_eq!(engine.state(), SyncState::RequestPending { generation });

        let request = &engine.source()[0];
        assert_eq!(request.ids, vec!["a", "b"]);
        assert_eq!(request.fields, vec!["eta", "name", "progress", "state"]);
    }

    #[test]
    fn poll_without_fields_skips() {
        let mut engine = test_engine(&["a"]);
        for column in ["Name", "Progress", "ETA"] {
            engine.set_column_visible(column, false).unwrap();
        }

        assert_eq!(engine.poll(), PollOutcome::Skipped(SkipReason::NoFields));
        assert!(engine.source().is_empty());
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn poll_without_rows_skips() {
        let mut engine = test_engine(&[]);
        assert_eq!(
            engine.poll(),
            PollOutcome::Skipped(SkipReason::NoVisibleRecords)
        );
        assert!(engine.source().is_empty());
    }

    #[test]
    fn hidden_column_fields_not_requested() {
        let mut engine = test_engine(&["a"]);
        engine.set_column_visible("ETA", false).unwrap();
        engine.poll();
        assert!(!engine.source()[0].fields.contains(&"eta".to_string()));
    }

    #[test]
    fn response_merges_and_reports_cells() {
        let mut engine = test_engine(&["a", "b"]);
        let generation = requested(engine.poll());

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[
                ("a", json!({"state": "Seeding", "eta": 0})),
                ("b", json!({"progress": 12.5})),
            ]),
        ));

        let expected = vec![
            RowChange::new("a", "Name"),
            RowChange::new("a", "Progress"),
            RowChange::new("a", "ETA"),
            RowChange::new("b", "Progress"),
        ];
        assert_eq!(outcome, ApplyOutcome::Applied(expected.clone()));
        assert_eq!(engine.surface(), &expected);
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.record_status("a")["state"], json!("Seeding"));
    }

    #[test]
    fn unchanged_values_report_nothing() {
        let mut engine = test_engine(&["a"]);
        let snapshot = statuses(&[("a", json!({"state": "Seeding"}))]);

        let g1 = requested(engine.poll());
        engine.on_status(StatusResponse::new(g1, snapshot.clone()));
        let g2 = requested(engine.poll());
        let outcome = engine.on_status(StatusResponse::new(g2, snapshot));

        assert_eq!(outcome, ApplyOutcome::Applied(vec![]));
        assert_eq!(engine.surface().len(), 2);
    }

    #[test]
    fn older_generation_discarded() {
        let mut engine = test_engine(&["a"]);
        let g1 = requested(engine.poll());
        let g2 = requested(engine.poll());
        assert!(g1 < g2);

        let outcome = engine.on_status(StatusResponse::new(
            g1,
            statuses(&[("a", json!({"state": "Paused"}))]),
        ));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(engine.record_status("a").is_empty());
        assert_eq!(engine.state(), SyncState::RequestPending { generation: g2 });

        let outcome = engine.on_status(StatusResponse::new(
            g2,
            statuses(&[("a", json!({"state": "Seeding"}))]),
        ));
        assert!(matches!(outcome, ApplyOutcome::Applied(_)));
        assert_eq!(engine.record_status("a")["state"], json!("Seeding"));
    }

    #[test]
    fn duplicate_delivery_discarded() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        let response = StatusResponse::new(generation, statuses(&[("a", json!({"eta": 9}))]));

        assert!(matches!(engine.on_status(response.clone()), ApplyOutcome::Applied(_)));
        assert_eq!(engine.on_status(response), ApplyOutcome::Stale);
    }

    #[test]
    fn null_response_preserves_state() {
        let mut engine = test_engine(&["a"]);
        let g1 = requested(engine.poll());
        engine.on_status(StatusResponse::new(g1, statuses(&[("a", json!({"progress": 50}))])));

        let g2 = requested(engine.poll());
        assert_eq!(engine.on_status(StatusResponse::new(g2, None)), ApplyOutcome::NoData);
        assert_eq!(engine.record_status("a")["progress"], json!(50));
        assert_eq!(engine.state(), SyncState::Idle);

        let g3 = requested(engine.poll());
        let outcome = engine.on_status(StatusResponse::new(g3, Some(StatusMap::new())));
        assert_eq!(outcome, ApplyOutcome::NoData);
        assert_eq!(engine.record_status("a")["progress"], json!(50));
    }

    #[test]
    fn ids_missing_from_response_untouched() {
        let mut engine = test_engine(&["a", "b"]);
        let g1 = requested(engine.poll());
        engine.on_status(StatusResponse::new(
            g1,
            statuses(&[("a", json!({"eta": 1})), ("b", json!({"eta": 2}))]),
        ));

        let g2 = requested(engine.poll());
        engine.on_status(StatusResponse::new(g2, statuses(&[("a", json!({"eta": 3}))])));
        assert_eq!(engine.record_status("b")["eta"], json!(2));
    }

    #[test]
    fn bad_field_skipped_rest_applied() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[(
                "a",
                json!({"progress": "fifty", "state": "Seeding", "bogus": 1}),
            )]),
        ));

        let status = engine.record_status("a");
        assert_eq!(status.keys().collect::<Vec<_>>(), vec!["state"]);
        assert_eq!(
            outcome,
            ApplyOutcome::Applied(vec![RowChange::new("a", "Name"), RowChange::new("a", "Progress")])
        );
    }

    #[test]
    fn removed_record_ignored_in_response() {
        let mut engine = test_engine(&["a", "b"]);
        let generation = requested(engine.poll());

        // Bypass remove_row so the first request stays current.
        engine.store.remove_record("b").unwrap();
        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 1})), ("b", json!({"eta": 2}))]),
        ));

        assert_eq!(outcome, ApplyOutcome::Applied(vec![RowChange::new("a", "ETA")]));
        assert!(engine.store().get("b").is_none());
    }

    #[test]
    fn remove_triggers_resync() {
        let mut engine = test_engine(&["a"]);
        requested(engine.poll());

        let outcome = engine.remove_row("a").unwrap();
        assert_eq!(outcome, PollOutcome::Skipped(SkipReason::NoVisibleRecords));
        assert!(engine.visible_ids().is_empty());
        assert!(matches!(engine.state(), SyncState::RequestPending { .. }));

        engine.poll();
        engine.poll();
        assert_eq!(engine.source().len(), 1);

        engine.add_row("b").unwrap();
        requested(engine.poll());
        assert_eq!(engine.source().len(), 2);
        assert_eq!(engine.source()[1].ids, vec!["b"]);
    }

    #[test]
    fn remove_with_rows_left_reissues() {
        let mut engine = test_engine(&["a", "b"]);
        let g1 = requested(engine.poll());
        let g2 = requested(engine.remove_row("a").unwrap());

        assert!(g1 < g2);
        assert_eq!(engine.source()[1].ids, vec!["b"]);
        assert_eq!(
            engine.on_status(StatusResponse::new(g1, statuses(&[("b", json!({"eta": 1}))]))),
            ApplyOutcome::Stale
        );
    }

    #[test]
    fn remove_unknown_row() {
        let mut engine = test_engine(&["a"]);
        let result = engine.remove_row("z");
        assert!(matches!(result, Err(Error::RecordNotFound(id)) if id == "z"));
    }

    #[test]
    fn row_added_after_request_not_filled_by_it() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        engine.add_row("b").unwrap();

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 1})), ("b", json!({"eta": 2}))]),
        ));

        assert_eq!(outcome, ApplyOutcome::Applied(vec![RowChange::new("a", "ETA")]));
        assert!(engine.record_status("b").is_empty());
    }

    #[test]
    fn readded_row_not_filled_by_old_request() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        engine.remove_row("a").unwrap();
        engine.add_row("a").unwrap();

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 7}))]),
        ));
        assert_eq!(outcome, ApplyOutcome::Applied(vec![]));
        assert!(engine.record_status("a").is_empty());
    }

    #[test]
    fn filter_limits_request() {
        let mut engine = test_engine(&["a", "b"]);
        let g1 = requested(engine.poll());
        engine.on_status(StatusResponse::new(
            g1,
            statuses(&[
                ("a", json!({"state": "Seeding"})),
                ("b", json!({"state": "Downloading"})),
            ]),
        ));

        let g2 = requested(
            engine
                .set_filter(Filter::equals("state", json!("Seeding")))
                .unwrap(),
        );
        assert_eq!(engine.visible_ids(), vec!["a"]);
        assert_eq!(engine.source()[1].generation, g2);
        assert_eq!(engine.source()[1].ids, vec!["a"]);
    }

    #[test]
    fn filter_hides_until_field_arrives() {
        let mut engine = test_engine(&["a"]);
        let outcome = engine
            .set_filter(Filter::equals("state", json!("Seeding")))
            .unwrap();

        assert_eq!(outcome, PollOutcome::Skipped(SkipReason::NoVisibleRecords));
        assert!(engine.visible_ids().is_empty());

        engine.set_filter(Filter::none()).unwrap();
        assert_eq!(engine.visible_ids(), vec!["a"]);
    }

    #[test]
    fn visibility_follows_merged_data() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());

        engine.filter = Filter::equals("state", json!("Downloading"));
        engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"state": "Seeding"}))]),
        ));
        assert!(engine.visible_ids().is_empty());
    }

    #[test]
    fn unknown_filter_field_rejected() {
        let mut engine = test_engine(&["a"]);
        let result = engine.set_filter(Filter::equals("tracker", json!("x")));
        assert!(matches!(result, Err(Error::UnknownField(f)) if f == "tracker"));
        assert!(!engine.filter().is_active());
        assert!(engine.source().is_empty());
    }

    #[test]
    fn changes_use_request_time_columns() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        engine.set_column_visible("ETA", false).unwrap();

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 4}))]),
        ));
        assert_eq!(outcome, ApplyOutcome::Applied(vec![RowChange::new("a", "ETA")]));
    }

    #[test]
    fn column_shown_after_request_not_reported() {
        let mut engine = test_engine(&["a"]);
        engine.set_column_visible("ETA", false).unwrap();
        let generation = requested(engine.poll());
        engine.set_column_visible("ETA", true).unwrap();

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 4}))]),
        ));
        assert_eq!(outcome, ApplyOutcome::Applied(vec![]));
        // Data is still kept
        assert_eq!(engine.record_status("a")["eta"], json!(4));
    }

    #[test]
    fn skipped_poll_keeps_latest_request() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        for column in ["Name", "Progress", "ETA"] {
            engine.set_column_visible(column, false).unwrap();
        }
        assert_eq!(engine.poll(), PollOutcome::Skipped(SkipReason::NoFields));
        assert_eq!(engine.latest_generation(), generation);
        assert_eq!(engine.state(), SyncState::RequestPending { generation });

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"eta": 4}))]),
        ));
        assert_eq!(outcome, ApplyOutcome::Applied(vec![RowChange::new("a", "ETA")]));
        assert_eq!(engine.record_status("a")["eta"], json!(4));
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn answer_after_filtered_out_poll_restores_row() {
        let mut engine = test_engine(&["a"]);
        let generation = requested(engine.poll());
        engine
            .set_filter(Filter::equals("state", json!("Seeding")))
            .unwrap();
        assert!(engine.visible_ids().is_empty());

        let outcome = engine.on_status(StatusResponse::new(
            generation,
            statuses(&[("a", json!({"state": "Seeding"}))]),
        ));
        assert!(matches!(outcome, ApplyOutcome::Applied(_)));
        assert_eq!(engine.visible_ids(), vec!["a"]);
    }

    #[test]
    fn seed_adds_new_ids_and_polls() {
        let mut engine = test_engine(&["a"]);
        let outcome = engine.seed(vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        assert!(matches!(outcome, PollOutcome::Requested(_)));
        assert_eq!(engine.store().all_ids(), vec!["a", "b", "c"]);
        assert_eq!(engine.source()[0].ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn stop_clears_everything() {
        let mut engine = test_engine(&["a", "b"]);
        let generation = requested(engine.poll());
        engine.stop();

        assert!(engine.store().is_empty());
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(
            engine.on_status(StatusResponse::new(generation, statuses(&[("a", json!({"eta": 1}))]))),
            ApplyOutcome::Stale
        );
    }

    #[test]
    fn record_status_unknown_is_empty() {
        let engine = test_engine(&[]);
        assert!(engine.record_status("nope").is_empty());
    }

    #[test]
    fn add_duplicate_row() {
        let mut engine = test_engine(&["a"]);
        let result = engine.add_row("a");
        assert!(matches!(result, Err(Error::RecordAlreadyExists(id)) if id == "a"));
    }
}
