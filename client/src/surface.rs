//! A rendering surface that writes changes to the log.

use std::collections::BTreeSet;
use torrentview_engine::{RenderingSurface, RowChange};
use tracing::{debug, info};

/// Stands in for a table widget when running headless.
#[derive(Debug, Default)]
pub struct LogSurface {
    redraws: u64,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of change batches received so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl RenderingSurface for LogSurface {
    fn on_rows_changed(&mut self, changes: &[RowChange]) {
        self.redraws += 1;

        let rows: BTreeSet<_> = changes.iter().map(|c| c.id.as_str()).collect();
        info!(rows = rows.len(), cells = changes.len(), "Torrent view updated");
        for change in changes {
            debug!(record_id = %change.id, column = %change.column, "Cell changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_redraws() {
        let mut surface = LogSurface::new();
        surface.on_rows_changed(&[RowChange::new("a", "Name"), RowChange::new("a", "ETA")]);
        surface.on_rows_changed(&[RowChange::new("b", "Ratio")]);
        assert_eq!(surface.redraws(), 2);
    }
}
