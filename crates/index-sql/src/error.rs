//! Error types for SQL source generation.
//!
//! Query generation never performs I/O, so the only failure class is a
//! malformed configuration. Those failures surface when a source is turned
//! into a [`SqlBuilder`](crate::sql::SqlBuilder), never as invalid SQL.
//! Loading configuration files adds a second, I/O-bound class.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration is structurally invalid
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Configuration could not be read or parsed
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors describing a malformed source or index configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The source does not name a backing table.
    #[error("source '{source_name}' has no table")]
    MissingTable { source_name: String },

    /// The source does not name a primary key column.
    #[error("source '{source_name}' has no primary key")]
    MissingPrimaryKey { source_name: String },

    /// A property references a blank column name.
    #[error("property '{property}' references an empty column name")]
    EmptyColumnName { property: String },

    /// A property has no columns at all.
    #[error("property '{property}' has no columns")]
    PropertyWithoutColumns { property: String },

    /// A model is not present in the relation graph.
    #[error("unknown model: {model}")]
    UnknownModel { model: String },

    /// An association path names a relation the model does not define.
    #[error("unknown association '{association}' on model {model}")]
    UnknownAssociation { model: String, association: String },

    /// A structured association reference with no relation names.
    #[error("association path is empty")]
    EmptyAssociationPath,

    /// The document id offset does not fit the index count.
    #[error("offset {offset} is out of range for {total} indices")]
    InvalidOffset { offset: u32, total: u32 },

    /// Two indices were assigned the same document id offset.
    #[error("offset {offset} is shared by indices '{first}' and '{second}'")]
    DuplicateOffset {
        offset: u32,
        first: String,
        second: String,
    },

    /// The configuration defines no indices.
    #[error("configuration defines no indices")]
    NoIndices,

    /// Two index definitions share a name.
    #[error("duplicate index name: {name}")]
    DuplicateIndexName { name: String },

    /// A timestamp delta was configured with a zero threshold.
    #[error("timestamp delta on column '{column}' needs a non-zero threshold")]
    ZeroThreshold { column: String },
}

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An in-memory JSON document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration checks.
pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
