//! Helios Index SQL
//!
//! This crate generates the SQL a full-text search indexer runs to pull
//! documents out of a relational database. Given a source definition (a
//! table, its fields and attributes, the associations to join and the rows
//! to include) it produces:
//!
//! - the main query, one row per document with a globally unique document id
//! - the range query, bounding the primary keys for batched indexing
//! - the document lookup query, fetching a single row by document id
//! - the pre-queries, run once before indexing
//!
//! # Dialects
//!
//! MySQL and PostgreSQL are supported through [`adapters::DatabaseAdapter`].
//! The query builder never branches on the dialect itself.
//!
//! # Architecture
//!
//! - [`types`] - Source, property and relation graph definitions
//! - [`document_id`] - Interleaved document id encoding
//! - [`sql`] - Clause composition, join resolution, property presentation
//!   and the per-source query builder
//! - [`deltas`] - Delta index strategies
//! - [`adapters`] - SQL dialect adapters
//! - [`config`] - JSON configuration loading and indexer block rendering
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```
//! use helios_index_sql::sql::SqlBuilder;
//! use helios_index_sql::types::{
//!     AssociationReference, ModelDefinition, PropertyDefinition, RelationDefinition, Schema,
//!     SourceDefinition,
//! };
//!
//! let schema = Schema::new()
//!     .with_model(
//!         "Article",
//!         ModelDefinition::new("articles")
//!             .with_relation(RelationDefinition::has_many("taggings", "Tagging")),
//!     )
//!     .with_model(
//!         "Tagging",
//!         ModelDefinition::new("taggings")
//!             .with_relation(RelationDefinition::belongs_to("tag", "Tag")),
//!     )
//!     .with_model("Tag", ModelDefinition::new("tags"));
//!
//! let source = SourceDefinition::new("article_core", "Article", "articles")
//!     .with_field(PropertyDefinition::column("title"))
//!     .with_attribute(PropertyDefinition::new("tags", "taggings.tag.name"))
//!     .with_association(AssociationReference::path("taggings.tag"));
//!
//! let builder = SqlBuilder::new(source, &schema, 1).unwrap();
//! let sql = builder.main_query();
//! assert!(sql.contains("GROUP_CONCAT(DISTINCT `tags`.`name` SEPARATOR ',') AS `tags`"));
//! assert!(sql.contains("LEFT OUTER JOIN `taggings`"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapters;
pub mod config;
pub mod deltas;
pub mod document_id;
pub mod error;
pub mod sql;
pub mod types;

// Re-export commonly used types at crate root
pub use adapters::{DatabaseAdapter, DialectKind};
pub use config::{IndexConfiguration, IndexDefinition};
pub use deltas::{DeltaProcessor, DeltaStrategy};
pub use document_id::DocumentIdScheme;
pub use error::{ConfigResult, ConfigurationError, Error, LoadError, Result};
pub use sql::{SourceQueries, SqlBuilder};
pub use types::{PropertyDefinition, RelationGraph, Schema, SourceDefinition};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
