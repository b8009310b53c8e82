//! Relation graph consumed from model introspection.
//!
//! The engine never inspects a live database. Whatever layer knows about
//! models hands over a [`RelationGraph`]: for every model its table, its
//! primary key and the named relations leading to other models. The
//! association resolver walks this graph to turn relation paths such as
//! `taggings.tag` into joins.

use std::collections::BTreeMap;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// Kind of relation between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The owning row stores the foreign key (`articles.user_id`).
    BelongsTo,
    /// The related row stores the foreign key, at most one related row.
    HasOne,
    /// The related rows store the foreign key.
    HasMany,
    /// Rows are linked through an intermediate join table.
    #[serde(alias = "habtm")]
    HasAndBelongsToMany,
}

impl RelationKind {
    /// Returns true if following this relation can yield several rows.
    ///
    /// Properties reached through a collection relation must be aggregated.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            RelationKind::HasMany | RelationKind::HasAndBelongsToMany
        )
    }
}

/// A named relation from one model to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Relation name as used in association paths.
    pub name: String,

    /// Relation kind.
    pub kind: RelationKind,

    /// Target model name.
    pub model: String,

    /// Foreign key column. Defaults depend on the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Intermediate table for has-and-belongs-to-many relations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,

    /// Join table column pointing at the target model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association_foreign_key: Option<String>,
}

impl RelationDefinition {
    fn new(name: impl Into<String>, kind: RelationKind, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            model: model.into(),
            foreign_key: None,
            join_table: None,
            association_foreign_key: None,
        }
    }

    /// Creates a belongs-to relation.
    pub fn belongs_to(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(name, RelationKind::BelongsTo, model)
    }

    /// Creates a has-one relation.
    pub fn has_one(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(name, RelationKind::HasOne, model)
    }

    /// Creates a has-many relation.
    pub fn has_many(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(name, RelationKind::HasMany, model)
    }

    /// Creates a has-and-belongs-to-many relation through `join_table`.
    pub fn has_and_belongs_to_many(
        name: impl Into<String>,
        model: impl Into<String>,
        join_table: impl Into<String>,
    ) -> Self {
        let mut relation = Self::new(name, RelationKind::HasAndBelongsToMany, model);
        relation.join_table = Some(join_table.into());
        relation
    }

    /// Sets an explicit foreign key column.
    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Sets the join table column pointing at the target model.
    pub fn with_association_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.association_foreign_key = Some(column.into());
        self
    }
}

/// A model as seen by the relation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Backing table.
    pub table: String,

    /// Primary key column.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Relations to other models.
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl ModelDefinition {
    /// Creates a model backed by `table` with an `id` primary key.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: default_primary_key(),
            relations: Vec::new(),
        }
    }

    /// Sets the primary key column.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Adds a relation.
    pub fn with_relation(mut self, relation: RelationDefinition) -> Self {
        self.relations.push(relation);
        self
    }

    /// Looks up a relation by name.
    pub fn relation(&self, name: &str) -> Option<&RelationDefinition> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Read access to models and their relations.
pub trait RelationGraph: Send + Sync {
    /// Returns the model with the given name.
    fn model(&self, name: &str) -> Option<&ModelDefinition>;

    /// Returns the named relation of a model.
    fn relation(&self, model: &str, relation: &str) -> Option<&RelationDefinition> {
        self.model(model).and_then(|m| m.relation(relation))
    }
}

/// In-memory relation graph keyed by model name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    models: BTreeMap<String, ModelDefinition>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, returning the schema.
    pub fn with_model(mut self, name: impl Into<String>, model: ModelDefinition) -> Self {
        self.insert(name, model);
        self
    }

    /// Adds or replaces a model.
    pub fn insert(&mut self, name: impl Into<String>, model: ModelDefinition) {
        self.models.insert(name.into(), model);
    }

    /// Iterates models in name order.
    pub fn models(&self) -> impl Iterator<Item = (&str, &ModelDefinition)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }
}

impl RelationGraph for Schema {
    fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }
}

/// Derives the conventional foreign key column for a model name.
///
/// Module prefixes are dropped: `Admin::BlogPost` becomes `blog_post_id`.
pub fn foreign_key_for(model: &str) -> String {
    format!("{}_id", demodulize(model).to_case(Case::Snake))
}

/// Strips module prefixes from a model name.
pub fn demodulize(model: &str) -> &str {
    model.rsplit("::").next().unwrap_or(model)
}
