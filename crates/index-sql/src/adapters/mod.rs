//! Database dialect adapters.
//!
//! Only a handful of SQL constructs differ between the supported databases:
//! identifier quoting, NULL coalescing, string aggregation, epoch casts,
//! boolean literals, session setup and the MySQL-only query hints. Each
//! dialect implements [`DatabaseAdapter`]; the query builder never branches
//! on the dialect itself.
//!
//! Adapters are stateless, so [`DialectKind::adapter`] hands out shared
//! static instances.

mod mysql;
mod postgres;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use mysql::MysqlAdapter;
pub use postgres::PostgresAdapter;

/// Supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// MySQL and MariaDB.
    #[default]
    Mysql,
    /// PostgreSQL.
    #[serde(alias = "postgres", alias = "pgsql")]
    Postgresql,
}

impl DialectKind {
    /// Returns the dialect name as written in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            DialectKind::Mysql => "mysql",
            DialectKind::Postgresql => "postgresql",
        }
    }

    /// Returns the adapter for this dialect.
    pub fn adapter(&self) -> &'static dyn DatabaseAdapter {
        static MYSQL: MysqlAdapter = MysqlAdapter;
        static POSTGRES: PostgresAdapter = PostgresAdapter;

        match self {
            DialectKind::Mysql => &MYSQL,
            DialectKind::Postgresql => &POSTGRES,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialect-specific SQL generation.
pub trait DatabaseAdapter: Send + Sync + fmt::Debug {
    /// The dialect this adapter generates SQL for.
    fn kind(&self) -> DialectKind;

    /// Quotes a table or column name.
    fn quote(&self, identifier: &str) -> String;

    /// Wraps `clause` so NULL becomes `fallback`.
    fn convert_nulls(&self, clause: &str, fallback: &str) -> String;

    /// Joins several expressions into one string with `separator`.
    fn concatenate(&self, parts: &[String], separator: &str) -> String;

    /// Aggregates the distinct values of `clause` across grouped rows.
    fn group_concatenate(&self, clause: &str, separator: &str) -> String;

    /// Converts a date/time expression into epoch seconds.
    fn cast_to_timestamp(&self, clause: &str) -> String;

    /// Boolean literal.
    fn boolean_value(&self, value: bool) -> &'static str;

    /// Expression for the moment `seconds` before now.
    fn time_ago(&self, seconds: u64) -> String;

    /// Session statements that switch the connection to UTF-8.
    fn utf8_query_pre(&self) -> Vec<String>;

    /// Whether `SQL_NO_CACHE` and `ORDER BY NULL` apply.
    fn supports_query_hints(&self) -> bool {
        false
    }

    /// Dialect name.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Quotes a string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Quotes `table.column`.
    fn quote_qualified(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.quote(table), self.quote(column))
    }
}
