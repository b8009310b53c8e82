//! PostgreSQL dialect.

use super::{DatabaseAdapter, DialectKind};

/// PostgreSQL adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl DatabaseAdapter for PostgresAdapter {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgresql
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn convert_nulls(&self, clause: &str, fallback: &str) -> String {
        format!("COALESCE({}, {})", clause, fallback)
    }

    fn concatenate(&self, parts: &[String], separator: &str) -> String {
        // array_to_string skips NULL elements, like CONCAT_WS
        format!(
            "array_to_string(array[{}], {})",
            parts.join(", "),
            self.quote_string(separator)
        )
    }

    fn group_concatenate(&self, clause: &str, separator: &str) -> String {
        format!(
            "array_to_string(array_agg(DISTINCT {}), {})",
            clause,
            self.quote_string(separator)
        )
    }

    fn cast_to_timestamp(&self, clause: &str) -> String {
        format!("extract(epoch from {})::int", clause)
    }

    fn boolean_value(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn time_ago(&self, seconds: u64) -> String {
        format!("NOW() - INTERVAL '{} seconds'", seconds)
    }

    fn utf8_query_pre(&self) -> Vec<String> {
        Vec::new()
    }
}
