//! The drawing side of the view.

use crate::{ColumnName, RecordId};
use serde::{Deserialize, Serialize};

/// One cell that needs redrawing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowChange {
    pub id: RecordId,
    pub column: ColumnName,
}

impl RowChange {
    pub fn new(id: impl Into<RecordId>, column: impl Into<ColumnName>) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
        }
    }
}

/// Whatever draws the table.
///
/// The surface reads rows through [`SyncEngine::store`](crate::SyncEngine::store)
/// and is told which cells changed after each applied snapshot. It never
/// mutates the store.
pub trait RenderingSurface {
    fn on_rows_changed(&mut self, changes: &[RowChange]);
}

impl<S: RenderingSurface + ?Sized> RenderingSurface for Box<S> {
    fn on_rows_changed(&mut self, changes: &[RowChange]) {
        (**self).on_rows_changed(changes)
    }
}

/// Collects every change, in order.
impl RenderingSurface for Vec<RowChange> {
    fn on_rows_changed(&mut self, changes: &[RowChange]) {
        self.extend_from_slice(changes);
    }
}
