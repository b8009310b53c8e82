//! Index configuration.
//!
//! A configuration is a JSON document holding the relation graph (`models`)
//! and the index definitions (`indices`). Each index definition expands
//! into one core source and, with a delta strategy, a delta source:
//!
//! ```json
//! {
//!   "models": {
//!     "Article": {
//!       "table": "articles",
//!       "relations": [{ "name": "taggings", "kind": "has_many", "model": "Tagging" }]
//!     },
//!     "Tagging": { "table": "taggings" }
//!   },
//!   "indices": [{
//!     "name": "article",
//!     "model": "Article",
//!     "fields": [{ "name": "title", "columns": ["title"] }],
//!     "delta": { "type": "boolean" }
//!   }]
//! }
//! ```
//!
//! Every expanded source counts as one index for document id interleaving.
//! Core and delta sources of one definition share an offset, so a row keeps
//! its document id across both and the delta index can supersede it.

pub mod render;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

use crate::adapters::DialectKind;
use crate::deltas::DeltaStrategy;
use crate::error::{ConfigResult, ConfigurationError, LoadError, Result};
use crate::sql::SqlBuilder;
use crate::types::schema::demodulize;
use crate::types::{
    AssociationReference, Inheritance, PropertyDefinition, RelationGraph, Schema,
    SourceDefinition, SourceOptions,
};

pub use render::{render_configuration, render_source};

/// Suffix of the source feeding the main index.
pub const CORE_SUFFIX: &str = "_core";

/// Suffix of the source feeding the delta index.
pub const DELTA_SUFFIX: &str = "_delta";

/// One index as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name. Defaults to the snake-cased model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Indexed model.
    pub model: String,

    /// Full-text fields.
    #[serde(default)]
    pub fields: Vec<PropertyDefinition>,

    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<PropertyDefinition>,

    /// Joined associations.
    #[serde(default)]
    pub associations: Vec<AssociationReference>,

    /// Raw WHERE conditions.
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Raw GROUP BY expressions.
    #[serde(default)]
    pub groupings: Vec<String>,

    /// Delta strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<DeltaStrategy>,

    /// Disables ranged querying.
    #[serde(default)]
    pub disable_range: bool,

    /// SQL dialect.
    #[serde(default)]
    pub dialect: DialectKind,

    /// Source options.
    #[serde(default)]
    pub options: SourceOptions,

    /// Single-table inheritance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<Inheritance>,

    /// Explicit document id offset. Defaults to the definition's position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl IndexDefinition {
    /// Creates an empty definition for `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            name: None,
            model: model.into(),
            fields: Vec::new(),
            attributes: Vec::new(),
            associations: Vec::new(),
            conditions: Vec::new(),
            groupings: Vec::new(),
            delta: None,
            disable_range: false,
            dialect: DialectKind::default(),
            options: SourceOptions::default(),
            inheritance: None,
            offset: None,
        }
    }

    /// The index name.
    pub fn index_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => demodulize(&self.model).to_case(Case::Snake),
        }
    }

    /// Number of sources this definition expands to.
    pub fn source_count(&self) -> u32 {
        if self.delta.is_some() { 2 } else { 1 }
    }
}

/// A full index configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfiguration {
    /// Relation graph.
    #[serde(default)]
    pub models: Schema,

    /// Index definitions, in offset order.
    #[serde(default)]
    pub indices: Vec<IndexDefinition>,
}

impl IndexConfiguration {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(LoadError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            indices = config.indices.len(),
            "Loaded index configuration"
        );
        Ok(config)
    }

    /// Total number of interleaved indices.
    pub fn total_indexes(&self) -> u32 {
        self.indices.iter().map(IndexDefinition::source_count).sum()
    }

    /// Document id offset of each definition, in definition order.
    pub fn offsets(&self) -> Vec<u32> {
        self.indices
            .iter()
            .zip(0u32..)
            .map(|(index, position)| index.offset.unwrap_or(position))
            .collect()
    }

    /// Checks index names, models and offsets.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.indices.is_empty() {
            return Err(ConfigurationError::NoIndices);
        }

        let mut names = HashSet::new();
        for index in &self.indices {
            let name = index.index_name();
            if self.models.model(&index.model).is_none() {
                return Err(ConfigurationError::UnknownModel {
                    model: index.model.clone(),
                });
            }
            if !names.insert(name.clone()) {
                return Err(ConfigurationError::DuplicateIndexName { name });
            }
        }

        let total = self.total_indexes();
        let mut owners: HashMap<u32, String> = HashMap::new();
        for (index, offset) in self.indices.iter().zip(self.offsets()) {
            if offset >= total {
                return Err(ConfigurationError::InvalidOffset { offset, total });
            }
            let name = index.index_name();
            if let Some(first) = owners.insert(offset, name.clone()) {
                return Err(ConfigurationError::DuplicateOffset {
                    offset,
                    first,
                    second: name,
                });
            }
        }

        Ok(())
    }

    /// Expands every definition into its sources.
    pub fn sources(&self) -> ConfigResult<Vec<SourceDefinition>> {
        self.validate()?;

        let mut sources = Vec::with_capacity(self.total_indexes() as usize);
        for (index, offset) in self.indices.iter().zip(self.offsets()) {
            let model = self.models.model(&index.model).ok_or_else(|| {
                ConfigurationError::UnknownModel {
                    model: index.model.clone(),
                }
            })?;
            let name = index.index_name();

            let core = SourceDefinition {
                name: format!("{}{}", name, CORE_SUFFIX),
                model: index.model.clone(),
                table: model.table.clone(),
                primary_key: model.primary_key.clone(),
                offset,
                delta: false,
                disable_range: index.disable_range,
                conditions: index.conditions.clone(),
                groupings: index.groupings.clone(),
                fields: index.fields.clone(),
                attributes: index.attributes.clone(),
                associations: index.associations.clone(),
                dialect: index.dialect,
                delta_strategy: index.delta.clone(),
                options: index.options.clone(),
                inheritance: index.inheritance.clone(),
            };

            if index.delta.is_some() {
                let mut delta = core.clone().as_delta();
                delta.name = format!("{}{}", name, DELTA_SUFFIX);
                sources.push(core);
                sources.push(delta);
            } else {
                sources.push(core);
            }
        }

        tracing::debug!(
            sources = sources.len(),
            total = self.total_indexes(),
            "Expanded index definitions"
        );
        Ok(sources)
    }

    /// Creates one builder per expanded source.
    pub fn builders(&self) -> ConfigResult<Vec<SqlBuilder>> {
        let total = self.total_indexes();
        self.sources()?
            .into_iter()
            .map(|source| SqlBuilder::new(source, &self.models, total))
            .collect()
    }
}
