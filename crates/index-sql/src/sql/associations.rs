//! Association resolution.
//!
//! Turns relation paths such as `taggings.tag` into LEFT OUTER JOINs. Paths
//! are inserted into one shared join tree keyed by path, so a relation chain
//! referenced by several fields, attributes and explicit association
//! references is joined exactly once. Inserting a path also inserts all of
//! its prefixes, so parents always precede their children in the output.
//!
//! Raw JOIN strings bypass the tree entirely and are emitted after the
//! resolved joins, verbatim and in the order given.

use std::collections::{HashMap, HashSet};

use crate::adapters::DatabaseAdapter;
use crate::error::{ConfigResult, ConfigurationError};
use crate::types::schema::foreign_key_for;
use crate::types::{
    AssociationReference, RelationDefinition, RelationGraph, RelationKind, SourceDefinition,
};

/// One resolved relation hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Relation path from the source model.
    pub path: Vec<String>,
    /// Model reached by this hop.
    pub model: String,
    /// Table of that model.
    pub table: String,
    /// Name the table is referenced by in the query.
    pub alias: String,
    /// Primary key of that model.
    pub primary_key: String,
    /// True if this hop or any hop before it can yield several rows.
    pub collection: bool,
    /// The JOIN clause (two clauses for join-table relations).
    pub sql: String,
}

/// Deduplicated join graph of one source.
#[derive(Debug, Clone)]
pub struct Associations {
    model: String,
    table: String,
    primary_key: String,
    adapter: &'static dyn DatabaseAdapter,
    joins: Vec<Join>,
    by_path: HashMap<Vec<String>, usize>,
    aliases: HashSet<String>,
    raw: Vec<String>,
}

impl Associations {
    /// Creates an empty graph rooted at the source's table.
    pub fn new(source: &SourceDefinition, adapter: &'static dyn DatabaseAdapter) -> Self {
        let mut aliases = HashSet::new();
        aliases.insert(source.table.clone());

        Self {
            model: source.model.clone(),
            table: source.table.clone(),
            primary_key: source.primary_key.clone(),
            adapter,
            joins: Vec::new(),
            by_path: HashMap::new(),
            aliases,
            raw: Vec::new(),
        }
    }

    /// Resolves every association the source needs.
    ///
    /// Explicit references come first in their given order, followed by the
    /// association paths of the source's fields and attributes.
    pub fn resolve(
        source: &SourceDefinition,
        graph: &dyn RelationGraph,
        adapter: &'static dyn DatabaseAdapter,
    ) -> ConfigResult<Self> {
        let mut associations = Self::new(source, adapter);

        for reference in &source.associations {
            match reference {
                AssociationReference::Path(path) => {
                    associations.add_join_to(graph, path)?;
                }
                AssociationReference::Raw(sql) => associations.add_raw(sql.clone()),
            }
        }

        for column in source.properties().flat_map(|p| p.columns.iter()) {
            if !column.path().is_empty() {
                associations.add_join_to(graph, column.path())?;
            }
        }

        tracing::debug!(
            source = %source.name,
            joins = associations.joins.len(),
            raw_joins = associations.raw.len(),
            "Resolved association joins"
        );

        Ok(associations)
    }

    /// Ensures the join chain for `path` exists, returning its last hop.
    ///
    /// Inserting an already present path changes nothing.
    pub fn add_join_to(
        &mut self,
        graph: &dyn RelationGraph,
        path: &[String],
    ) -> ConfigResult<&Join> {
        if path.is_empty() {
            return Err(ConfigurationError::EmptyAssociationPath);
        }

        let mut index = None;
        for depth in 1..=path.len() {
            let prefix = &path[..depth];
            let existing = self.by_path.get(prefix).copied();
            index = Some(match existing {
                Some(existing) => existing,
                None => self.insert_join(graph, prefix, index)?,
            });
        }

        // path is non-empty, so the loop ran at least once
        match index {
            Some(index) => Ok(&self.joins[index]),
            None => Err(ConfigurationError::EmptyAssociationPath),
        }
    }

    /// Appends a raw JOIN clause.
    pub fn add_raw(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        tracing::trace!(join = %sql, "Passing raw join through unchecked");
        self.raw.push(sql);
    }

    /// Model the graph is rooted at.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Table alias to qualify columns reached via `path`.
    ///
    /// The empty path refers to the source table.
    pub fn alias_for(&self, path: &[String]) -> Option<&str> {
        if path.is_empty() {
            return Some(self.table.as_str());
        }
        self.join_for(path).map(|join| join.alias.as_str())
    }

    /// Returns true if values reached via `path` can span several rows.
    pub fn aggregate_for(&self, path: &[String]) -> bool {
        self.join_for(path).is_some_and(|join| join.collection)
    }

    /// Looks up the hop for a path.
    pub fn join_for(&self, path: &[String]) -> Option<&Join> {
        self.by_path.get(path).map(|&index| &self.joins[index])
    }

    /// Resolved hops in insertion order.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Every JOIN clause: resolved joins first, then raw joins.
    pub fn join_values(&self) -> Vec<&str> {
        self.joins
            .iter()
            .map(|join| join.sql.as_str())
            .chain(self.raw.iter().map(String::as_str))
            .collect()
    }

    fn insert_join(
        &mut self,
        graph: &dyn RelationGraph,
        path: &[String],
        parent: Option<usize>,
    ) -> ConfigResult<usize> {
        let (parent_model, parent_table, parent_alias, parent_pk, parent_collection) =
            match parent {
                Some(index) => {
                    let join = &self.joins[index];
                    (
                        join.model.clone(),
                        join.table.clone(),
                        join.alias.clone(),
                        join.primary_key.clone(),
                        join.collection,
                    )
                }
                None => (
                    self.model.clone(),
                    self.table.clone(),
                    self.table.clone(),
                    self.primary_key.clone(),
                    false,
                ),
            };

        if graph.model(&parent_model).is_none() {
            return Err(ConfigurationError::UnknownModel {
                model: parent_model,
            });
        }

        let name = &path[path.len() - 1];
        let relation = graph
            .relation(&parent_model, name)
            .ok_or_else(|| ConfigurationError::UnknownAssociation {
                model: parent_model.clone(),
                association: name.clone(),
            })?
            .clone();
        let target = graph
            .model(&relation.model)
            .ok_or_else(|| ConfigurationError::UnknownModel {
                model: relation.model.clone(),
            })?
            .clone();

        let alias = self.claim_alias(&target.table, &relation.name, &parent_alias);
        let parent_ref = Hop {
            model: &parent_model,
            table: &parent_table,
            alias: &parent_alias,
            primary_key: &parent_pk,
        };
        let target_ref = Hop {
            model: &relation.model,
            table: &target.table,
            alias: &alias,
            primary_key: &target.primary_key,
        };
        let sql = self.join_sql(&relation, &parent_ref, &target_ref);

        tracing::trace!(path = %path.join("."), alias = %alias, "Added association join");

        self.joins.push(Join {
            path: path.to_vec(),
            model: relation.model.clone(),
            table: target.table,
            alias,
            primary_key: target.primary_key,
            collection: parent_collection || relation.kind.is_collection(),
            sql,
        });
        let index = self.joins.len() - 1;
        self.by_path.insert(path.to_vec(), index);
        Ok(index)
    }

    fn claim_alias(&mut self, table: &str, relation: &str, parent_alias: &str) -> String {
        let mut alias = if self.aliases.contains(table) {
            format!("{}_{}", relation, parent_alias)
        } else {
            table.to_string()
        };

        let base = alias.clone();
        let mut counter = 2;
        while self.aliases.contains(&alias) {
            alias = format!("{}_{}", base, counter);
            counter += 1;
        }

        self.aliases.insert(alias.clone());
        alias
    }

    fn table_reference(&self, table: &str, alias: &str) -> String {
        if table == alias {
            self.adapter.quote(table)
        } else {
            format!("{} {}", self.adapter.quote(table), self.adapter.quote(alias))
        }
    }

    fn join_sql(
        &mut self,
        relation: &RelationDefinition,
        parent: &Hop<'_>,
        target: &Hop<'_>,
    ) -> String {
        let adapter = self.adapter;
        let target_table = self.table_reference(target.table, target.alias);

        match relation.kind {
            RelationKind::BelongsTo => {
                let foreign_key = relation
                    .foreign_key
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", relation.name));
                format!(
                    "LEFT OUTER JOIN {} ON {} = {}",
                    target_table,
                    adapter.quote_qualified(target.alias, target.primary_key),
                    adapter.quote_qualified(parent.alias, &foreign_key)
                )
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                let foreign_key = relation
                    .foreign_key
                    .clone()
                    .unwrap_or_else(|| foreign_key_for(parent.model));
                format!(
                    "LEFT OUTER JOIN {} ON {} = {}",
                    target_table,
                    adapter.quote_qualified(target.alias, &foreign_key),
                    adapter.quote_qualified(parent.alias, parent.primary_key)
                )
            }
            RelationKind::HasAndBelongsToMany => {
                let join_table = relation.join_table.clone().unwrap_or_else(|| {
                    let mut tables = [parent.table, target.table];
                    tables.sort();
                    tables.join("_")
                });
                let join_alias = self.claim_alias(&join_table, &relation.name, parent.alias);
                let foreign_key = relation
                    .foreign_key
                    .clone()
                    .unwrap_or_else(|| foreign_key_for(parent.model));
                let association_foreign_key = relation
                    .association_foreign_key
                    .clone()
                    .unwrap_or_else(|| foreign_key_for(target.model));

                format!(
                    "LEFT OUTER JOIN {} ON {} = {} LEFT OUTER JOIN {} ON {} = {}",
                    self.table_reference(&join_table, &join_alias),
                    adapter.quote_qualified(&join_alias, &foreign_key),
                    adapter.quote_qualified(parent.alias, parent.primary_key),
                    target_table,
                    adapter.quote_qualified(target.alias, target.primary_key),
                    adapter.quote_qualified(&join_alias, &association_foreign_key)
                )
            }
        }
    }
}

/// One end of a hop as seen from SQL.
struct Hop<'a> {
    model: &'a str,
    table: &'a str,
    alias: &'a str,
    primary_key: &'a str,
}
