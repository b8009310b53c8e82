//! SQL generation for index sources.
//!
//! - [`clause`] - Composition of optional clause members
//! - [`associations`] - Join graph resolution and table aliasing
//! - [`presenter`] - Per-property SELECT and GROUP BY expressions
//! - [`builder`] - The per-source query builder
//!
//! # Example
//!
//! ```
//! use helios_index_sql::sql::SqlBuilder;
//! use helios_index_sql::types::{ModelDefinition, PropertyDefinition, Schema, SourceDefinition};
//!
//! let schema = Schema::new().with_model("Article", ModelDefinition::new("articles"));
//! let source = SourceDefinition::new("article_core", "Article", "articles")
//!     .with_field(PropertyDefinition::column("title"));
//!
//! let builder = SqlBuilder::new(source, &schema, 1).unwrap();
//! assert!(builder.main_query().contains("`articles`.`title` AS `title`"));
//! ```

pub mod associations;
pub mod builder;
pub mod clause;
pub mod presenter;

pub use associations::{Associations, Join};
pub use builder::{
    RANGE_END_PLACEHOLDER, RANGE_START_PLACEHOLDER, SourceQueries, SqlBuilder, escape_newlines,
};
pub use clause::{AND_SEPARATOR, ClauseBuilder, Fragment, LIST_SEPARATOR};
pub use presenter::{PropertySql, PropertySqlPresenter};
