//! Flag-column delta strategy.

use crate::adapters::DatabaseAdapter;

use super::DeltaProcessor;

/// Tracks pending rows with a boolean column set by the application on write.
#[derive(Debug)]
pub struct BooleanDelta {
    table: String,
    column: String,
    adapter: &'static dyn DatabaseAdapter,
}

impl BooleanDelta {
    /// Creates a processor for `table.column`.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        adapter: &'static dyn DatabaseAdapter,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            adapter,
        }
    }

    fn quoted_column(&self) -> String {
        self.adapter.quote_qualified(&self.table, &self.column)
    }
}

impl DeltaProcessor for BooleanDelta {
    fn clause(&self, delta: bool) -> Option<String> {
        Some(format!(
            "{} = {}",
            self.quoted_column(),
            self.adapter.boolean_value(delta)
        ))
    }

    fn reset_query(&self) -> Option<String> {
        let column = self.adapter.quote(&self.column);
        Some(format!(
            "UPDATE {} SET {} = {} WHERE {} = {}",
            self.adapter.quote(&self.table),
            column,
            self.adapter.boolean_value(false),
            column,
            self.adapter.boolean_value(true)
        ))
    }
}
