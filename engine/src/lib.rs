//! # Torrent View Engine
//!
//! The status-synchronization and filtering core behind a live torrent table.
//!
//! The engine decides which remote fields are worth fetching (only those shown
//! by visible columns), asks for them only for rows that pass the active
//! filter, merges the partial answers into a local record store without
//! redundant writes, and tells the rendering surface exactly which cells
//! changed.
//!
//! ## Design Principles
//!
//! - **No IO**: fetching is delegated to a [`RemoteStatusSource`], drawing to a
//!   [`RenderingSurface`]. Both are injected through [`SyncEngine::new`].
//! - **Single-threaded**: every mutation happens on the caller's turn. The
//!   fetch is the only suspension point and never blocks the engine.
//! - **Stale-proof**: every request carries a [`Generation`]; answers to a
//!   superseded request are dropped instead of overwriting newer data.
//!
//! ## Core Concepts
//!
//! ### Columns
//!
//! A [`ColumnSchema`] maps each column to the remote fields it displays. Only
//! *syncable* columns (visible, not hidden, at least one field) contribute to
//! the field set of a poll.
//!
//! ### Records
//!
//! A [`Record`] holds a sparse field map: an absent field has not been
//! fetched yet, it is not empty. Records live in a [`RecordStore`] in
//! insertion order.
//!
//! ### Filter
//!
//! A single optional `(field, expected)` [`Filter`] decides each record's
//! visibility. Records missing the filtered field stay hidden.
//!
//! ## Quick Start
//!
//! ```rust
//! use torrentview_engine::{
//!     ColumnSchema, PollOutcome, RowChange, StatusMap, StatusRequest, StatusResponse,
//!     SyncEngine,
//! };
//! use serde_json::json;
//!
//! // Requests pile up in a Vec; changed cells are collected in another.
//! let mut engine = SyncEngine::new(
//!     ColumnSchema::torrent_default(),
//!     Vec::<StatusRequest>::new(),
//!     Vec::<RowChange>::new(),
//! );
//! engine.add_row("abc").unwrap();
//!
//! // 1. Poll: a request goes out for the visible rows.
//! let PollOutcome::Requested(generation) = engine.poll() else {
//!     panic!("expected a request");
//! };
//! assert_eq!(engine.source()[0].ids, vec!["abc"]);
//!
//! // 2. Later, the answer comes back.
//! let mut statuses = StatusMap::new();
//! statuses.insert(
//!     "abc".to_string(),
//!     [("progress".to_string(), json!(50.0))].into_iter().collect(),
//! );
//! engine.on_status(StatusResponse::new(generation, Some(statuses)));
//!
//! assert_eq!(engine.store().get("abc").unwrap().field("progress"), Some(&json!(50.0)));
//! assert_eq!(engine.surface(), &vec![RowChange::new("abc", "Progress")]);
//! ```

pub mod column;
pub mod error;
pub mod filter;
pub mod generation;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod surface;
pub mod sync;

// Re-export main types at crate root
pub use column::{ColumnDef, ColumnSchema, FieldDef, FieldType};
pub use error::Error;
pub use filter::Filter;
pub use generation::Generation;
pub use record::Record;
pub use snapshot::{parse_status, FieldMap, StatusMap, StatusRequest, StatusResponse};
pub use source::RemoteStatusSource;
pub use store::RecordStore;
pub use surface::{RenderingSurface, RowChange};
pub use sync::{ApplyOutcome, PollOutcome, SkipReason, SyncEngine, SyncState};

/// Type aliases for clarity
pub type RecordId = String;
pub type FieldName = String;
pub type ColumnName = String;
