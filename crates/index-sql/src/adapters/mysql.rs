//! MySQL dialect.

use super::{DatabaseAdapter, DialectKind};

/// MySQL and MariaDB adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlAdapter;

impl DatabaseAdapter for MysqlAdapter {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    fn convert_nulls(&self, clause: &str, fallback: &str) -> String {
        format!("IFNULL({}, {})", clause, fallback)
    }

    fn concatenate(&self, parts: &[String], separator: &str) -> String {
        format!(
            "CONCAT_WS({}, {})",
            self.quote_string(separator),
            parts.join(", ")
        )
    }

    fn group_concatenate(&self, clause: &str, separator: &str) -> String {
        format!(
            "GROUP_CONCAT(DISTINCT {} SEPARATOR {})",
            clause,
            self.quote_string(separator)
        )
    }

    fn cast_to_timestamp(&self, clause: &str) -> String {
        format!("UNIX_TIMESTAMP({})", clause)
    }

    fn boolean_value(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn time_ago(&self, seconds: u64) -> String {
        format!("DATE_SUB(NOW(), INTERVAL {} SECOND)", seconds)
    }

    fn utf8_query_pre(&self) -> Vec<String> {
        vec!["SET NAMES utf8".to_string()]
    }

    fn supports_query_hints(&self) -> bool {
        true
    }
}
