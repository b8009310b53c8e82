//! Update-timestamp delta strategy.

use crate::adapters::DatabaseAdapter;

use super::DeltaProcessor;

/// Treats rows updated within a sliding window as delta rows.
///
/// The main index keeps covering every row, and there is no marker to reset.
#[derive(Debug)]
pub struct TimestampDelta {
    table: String,
    column: String,
    threshold: u64,
    adapter: &'static dyn DatabaseAdapter,
}

impl TimestampDelta {
    /// Creates a processor for `table.column` with a window of `threshold` seconds.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        threshold: u64,
        adapter: &'static dyn DatabaseAdapter,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            threshold,
            adapter,
        }
    }
}

impl DeltaProcessor for TimestampDelta {
    fn clause(&self, delta: bool) -> Option<String> {
        if !delta {
            return None;
        }

        Some(format!(
            "{} > {}",
            self.adapter.quote_qualified(&self.table, &self.column),
            self.adapter.time_ago(self.threshold)
        ))
    }

    fn reset_query(&self) -> Option<String> {
        None
    }
}
