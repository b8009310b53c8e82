//! Delta index processing.
//!
//! A delta index covers only recently changed rows and is rebuilt often,
//! while the main index is rebuilt rarely. A [`DeltaProcessor`] supplies
//! the predicate separating the two row sets and, for strategies that keep
//! a marker column, the statement clearing that marker once the main index
//! has absorbed the rows.
//!
//! Strategies are chosen from configuration through [`DeltaStrategy`].

mod boolean;
mod timestamp;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapters::DatabaseAdapter;
use crate::error::{ConfigResult, ConfigurationError};

pub use boolean::BooleanDelta;
pub use timestamp::TimestampDelta;

/// Splits rows between the main and the delta index.
pub trait DeltaProcessor: Send + Sync + fmt::Debug {
    /// Predicate restricting a query to delta rows (`delta == true`) or to
    /// main-index rows (`delta == false`). `None` means no restriction.
    fn clause(&self, delta: bool) -> Option<String>;

    /// Statement clearing pending-delta markers before a main index build.
    fn reset_query(&self) -> Option<String>;
}

/// Configured delta strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaStrategy {
    /// A boolean column flags rows changed since the last main build.
    Boolean {
        /// Flag column.
        #[serde(default = "default_boolean_column")]
        column: String,
    },
    /// Rows updated within `threshold` seconds belong to the delta index.
    Timestamp {
        /// Update timestamp column.
        #[serde(default = "default_timestamp_column")]
        column: String,
        /// Window in seconds.
        #[serde(default = "default_threshold")]
        threshold: u64,
    },
}

fn default_boolean_column() -> String {
    "delta".to_string()
}

fn default_timestamp_column() -> String {
    "updated_at".to_string()
}

fn default_threshold() -> u64 {
    24 * 60 * 60
}

impl Default for DeltaStrategy {
    fn default() -> Self {
        DeltaStrategy::Boolean {
            column: default_boolean_column(),
        }
    }
}

impl DeltaStrategy {
    /// Builds the processor for a source backed by `table`.
    pub fn processor(
        &self,
        table: &str,
        adapter: &'static dyn DatabaseAdapter,
    ) -> ConfigResult<Box<dyn DeltaProcessor>> {
        match self {
            DeltaStrategy::Boolean { column } => {
                Ok(Box::new(BooleanDelta::new(table, column, adapter)))
            }
            DeltaStrategy::Timestamp { column, threshold } => {
                if *threshold == 0 {
                    return Err(ConfigurationError::ZeroThreshold {
                        column: column.clone(),
                    });
                }
                Ok(Box::new(TimestampDelta::new(
                    table, column, *threshold, adapter,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DialectKind;

    #[test]
    fn test_strategy_from_json() {
        let strategy: DeltaStrategy = serde_json::from_str(r#"{ "type": "boolean" }"#).unwrap();
        assert_eq!(strategy, DeltaStrategy::default());

        let strategy: DeltaStrategy =
            serde_json::from_str(r#"{ "type": "timestamp", "threshold": 3600 }"#).unwrap();
        assert_eq!(
            strategy,
            DeltaStrategy::Timestamp {
                column: "updated_at".to_string(),
                threshold: 3600
            }
        );
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let strategy = DeltaStrategy::Timestamp {
            column: "updated_at".to_string(),
            threshold: 0,
        };
        let err = strategy
            .processor("articles", DialectKind::Mysql.adapter())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ZeroThreshold { .. }));
    }
}
