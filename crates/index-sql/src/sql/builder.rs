//! Source query builder.
//!
//! Assembles the four statements an indexer needs for one source:
//!
//! - the main query, selecting one row per document with an encoded
//!   document id, every field and every attribute, optionally restricted
//!   to a `$start`/`$end` primary key window
//! - the range query computing the bounds of that window
//! - the document lookup query fetching one row by global document id
//! - the pre-queries run once before the others
//!
//! Everything derived from the source definition (delta processor, join
//! graph, per-property SQL) is computed when the builder is created. The
//! rendered statements are memoized on first use behind a lock, so a
//! builder can be shared between threads building main and delta indices.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::adapters::DatabaseAdapter;
use crate::deltas::DeltaProcessor;
use crate::document_id::DocumentIdScheme;
use crate::error::ConfigResult;
use crate::types::{PropertyDefinition, PropertyKind, RelationGraph, SourceDefinition};

use super::associations::Associations;
use super::clause::{AND_SEPARATOR, ClauseBuilder, LIST_SEPARATOR};
use super::presenter::{PropertySql, PropertySqlPresenter};

/// Placeholder for the lower primary key bound of a ranged batch.
pub const RANGE_START_PLACEHOLDER: &str = "$start";

/// Placeholder for the upper primary key bound of a ranged batch.
pub const RANGE_END_PLACEHOLDER: &str = "$end";

/// Every statement generated for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceQueries {
    /// Source name.
    pub name: String,
    /// Setup statements, in execution order.
    pub pre: Vec<String>,
    /// Bounds query, absent when ranging is disabled.
    pub range: Option<String>,
    /// Main query with newlines escaped.
    pub main: String,
    /// Single document lookup query.
    pub info: String,
}

/// Builds the SQL for one source definition.
#[derive(Debug)]
pub struct SqlBuilder {
    source: SourceDefinition,
    adapter: &'static dyn DatabaseAdapter,
    delta_processor: Option<Box<dyn DeltaProcessor>>,
    document_ids: DocumentIdScheme,
    associations: Associations,
    fields: Vec<PropertySql>,
    attributes: Vec<PropertySql>,
    queries: Mutex<Option<Arc<SourceQueries>>>,
}

impl SqlBuilder {
    /// Creates a builder for `source` among `total_indexes` interleaved indices.
    ///
    /// Fails on a malformed source: missing table or primary key, blank
    /// column names, or association paths the relation graph cannot resolve.
    pub fn new(
        source: SourceDefinition,
        graph: &dyn RelationGraph,
        total_indexes: u32,
    ) -> ConfigResult<Self> {
        source.validate()?;

        let adapter = source.dialect.adapter();
        let document_ids = DocumentIdScheme::new(total_indexes, source.offset)?;
        let delta_processor = source
            .delta_strategy
            .as_ref()
            .map(|strategy| strategy.processor(&source.table, adapter))
            .transpose()?;
        let associations = Associations::resolve(&source, graph, adapter)?;
        let fields = present_all(&source.fields, PropertyKind::Field, adapter, &associations)?;
        let attributes =
            present_all(&source.attributes, PropertyKind::Attribute, adapter, &associations)?;

        tracing::debug!(
            source = %source.name,
            dialect = %source.dialect,
            delta = source.delta,
            fields = fields.len(),
            attributes = attributes.len(),
            "Created SQL builder"
        );

        Ok(Self {
            source,
            adapter,
            delta_processor,
            document_ids,
            associations,
            fields,
            attributes,
            queries: Mutex::new(None),
        })
    }

    /// The source definition.
    pub fn source(&self) -> &SourceDefinition {
        &self.source
    }

    /// The resolved join graph.
    pub fn associations(&self) -> &Associations {
        &self.associations
    }

    /// The document id scheme of this source.
    pub fn document_ids(&self) -> DocumentIdScheme {
        self.document_ids
    }

    /// Presented fields.
    pub fn field_sql(&self) -> &[PropertySql] {
        &self.fields
    }

    /// Presented attributes.
    pub fn attribute_sql(&self) -> &[PropertySql] {
        &self.attributes
    }

    /// All statements, rendered once and shared afterwards.
    pub fn queries(&self) -> Arc<SourceQueries> {
        let mut cached = self.queries.lock();
        if let Some(queries) = cached.as_ref() {
            return Arc::clone(queries);
        }

        let queries = Arc::new(SourceQueries {
            name: self.source.name.clone(),
            pre: self.pre_queries(),
            range: self.range_query(),
            main: self.main_query(),
            info: self.document_lookup_query(),
        });
        tracing::trace!(source = %self.source.name, "Rendered source queries");
        *cached = Some(Arc::clone(&queries));
        queries
    }

    /// The main query feeding the index build.
    ///
    /// Newlines from raw fragments are escaped as a backslash followed by a
    /// newline so the statement survives single-line configuration values.
    pub fn main_query(&self) -> String {
        let mut sql = format!(
            "SELECT {}{} FROM {}",
            self.pre_select(),
            self.select_clause(),
            self.adapter.quote(&self.source.table)
        );

        for join in self.associations.join_values() {
            sql.push(' ');
            sql.push_str(join);
        }

        let where_clause = self.where_clause(false);
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }

        sql.push_str(" GROUP BY ");
        sql.push_str(&self.group_clause());

        if self.adapter.supports_query_hints() {
            sql.push_str(" ORDER BY NULL");
        }

        escape_newlines(&sql)
    }

    /// The query computing primary key bounds, `None` when ranging is disabled.
    pub fn range_query(&self) -> Option<String> {
        if self.source.disable_range {
            return None;
        }

        let primary_key = self.quoted_primary_key();
        let minimum = self
            .adapter
            .convert_nulls(&format!("MIN({})", primary_key), "1");
        let maximum = self
            .adapter
            .convert_nulls(&format!("MAX({})", primary_key), "1");

        let mut sql = format!(
            "SELECT {}, {} FROM {}",
            minimum,
            maximum,
            self.adapter.quote(&self.source.table)
        );
        let where_clause = self.where_clause(true);
        if !where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause);
        }
        Some(sql)
    }

    /// The query fetching a single row by its global document id.
    pub fn document_lookup_query(&self) -> String {
        let table = self.adapter.quote(&self.source.table);
        format!(
            "SELECT {}.* FROM {} WHERE {} = {}",
            table,
            table,
            self.quoted_primary_key(),
            self.document_ids.decode_expression()
        )
    }

    /// Setup statements, in execution order.
    ///
    /// The delta reset only runs ahead of a main index build, and always
    /// before the session settings.
    pub fn pre_queries(&self) -> Vec<String> {
        let mut queries = Vec::new();

        if !self.source.delta {
            if let Some(reset) = self
                .delta_processor
                .as_ref()
                .and_then(|processor| processor.reset_query())
            {
                queries.push(reset);
            }
        }
        if let Some(max_len) = self.source.options.group_concat_max_len {
            queries.push(format!("SET SESSION group_concat_max_len = {}", max_len));
        }
        if self.source.options.utf8 {
            queries.extend(self.adapter.utf8_query_pre());
        }

        queries
    }

    fn pre_select(&self) -> &'static str {
        if self.adapter.supports_query_hints() {
            "SQL_NO_CACHE "
        } else {
            ""
        }
    }

    fn quoted_primary_key(&self) -> String {
        self.adapter
            .quote_qualified(&self.source.table, &self.source.primary_key)
    }

    fn quoted_inheritance_column(&self) -> Option<String> {
        self.source.inheritance.as_ref().map(|inheritance| {
            self.adapter
                .quote_qualified(&self.source.table, &inheritance.column)
        })
    }

    fn document_id(&self) -> String {
        self.document_ids.encode_expression(
            &self.quoted_primary_key(),
            &self.adapter.quote(&self.source.primary_key),
        )
    }

    fn select_clause(&self) -> String {
        ClauseBuilder::with_leading(self.document_id())
            .compose(self.fields.iter().map(|p| p.select.as_str()))
            .compose(self.attributes.iter().map(|p| p.select.as_str()))
            .separated(LIST_SEPARATOR)
    }

    fn where_clause(&self, for_range: bool) -> String {
        let mut builder = ClauseBuilder::new();
        builder.add_optional(self.inheritance_condition());
        builder.add_optional(
            self.delta_processor
                .as_ref()
                .and_then(|processor| processor.clause(self.source.delta)),
        );
        if !for_range {
            builder.add_optional(self.range_condition());
            builder.add_all(self.source.conditions.iter().map(String::as_str));
        }
        builder.separated(AND_SEPARATOR)
    }

    fn inheritance_condition(&self) -> Option<String> {
        let inheritance = self.source.inheritance.as_ref()?;
        let discriminator = inheritance.discriminator()?;
        Some(format!(
            "{} = {}",
            self.adapter
                .quote_qualified(&self.source.table, &inheritance.column),
            self.adapter.quote_string(discriminator)
        ))
    }

    fn range_condition(&self) -> Option<String> {
        if self.source.disable_range {
            return None;
        }
        Some(format!(
            "{} BETWEEN {} AND {}",
            self.quoted_primary_key(),
            RANGE_START_PLACEHOLDER,
            RANGE_END_PLACEHOLDER
        ))
    }

    fn group_clause(&self) -> String {
        ClauseBuilder::with_leading(self.quoted_primary_key())
            .compose(self.fields.iter().filter_map(|p| p.group.as_deref()))
            .compose(self.attributes.iter().filter_map(|p| p.group.as_deref()))
            .compose(self.source.groupings.iter().map(String::as_str))
            .compose(self.quoted_inheritance_column())
            .separated(LIST_SEPARATOR)
    }
}

fn present_all(
    properties: &[PropertyDefinition],
    kind: PropertyKind,
    adapter: &'static dyn DatabaseAdapter,
    associations: &Associations,
) -> ConfigResult<Vec<PropertySql>> {
    properties
        .iter()
        .map(|property| PropertySqlPresenter::new(property, kind, adapter, associations).present())
        .collect()
}

/// Escapes embedded newlines as a backslash followed by a newline.
pub fn escape_newlines(sql: &str) -> String {
    sql.replace('\n', "\\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DialectKind;
    use crate::deltas::DeltaStrategy;
    use crate::types::{Inheritance, ModelDefinition, Schema, SourceOptions};

    fn schema() -> Schema {
        Schema::new().with_model("Article", ModelDefinition::new("articles"))
    }

    fn article_source() -> SourceDefinition {
        SourceDefinition::new("article_core", "Article", "articles")
            .with_field(PropertyDefinition::column("title"))
            .with_attribute(PropertyDefinition::column("published_at"))
    }

    fn builder(source: SourceDefinition, total: u32) -> SqlBuilder {
        SqlBuilder::new(source, &schema(), total).unwrap()
    }

    #[test]
    fn test_builder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqlBuilder>();
    }

    #[test]
    fn test_main_query_mysql() {
        let sql = builder(article_source(), 1).main_query();
        assert_eq!(
            sql,
            concat!(
                "SELECT SQL_NO_CACHE `articles`.`id` * 1 + 0 AS `id`, ",
                "`articles`.`title` AS `title`, `articles`.`published_at` AS `published_at` ",
                "FROM `articles` WHERE `articles`.`id` BETWEEN $start AND $end ",
                "GROUP BY `articles`.`id`, `articles`.`title`, `articles`.`published_at` ",
                "ORDER BY NULL"
            )
        );
    }

    #[test]
    fn test_main_query_postgres_has_no_hints() {
        let source = article_source().with_dialect(DialectKind::Postgresql);
        let sql = builder(source, 1).main_query();

        assert!(sql.starts_with(r#"SELECT "articles"."id" * 1 + 0 AS "id""#));
        assert!(!sql.contains("SQL_NO_CACHE"));
        assert!(!sql.contains("ORDER BY NULL"));
    }

    #[test]
    fn test_where_omitted_without_conditions() {
        let sql = builder(article_source().without_range(), 1).main_query();
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("$start"));
    }

    #[test]
    fn test_user_conditions_follow_range() {
        let source = article_source()
            .with_condition("`articles`.`published` = 1")
            .with_condition("");
        let sql = builder(source, 1).main_query();

        assert!(sql.contains(
            "WHERE `articles`.`id` BETWEEN $start AND $end AND `articles`.`published` = 1 GROUP BY"
        ));
    }

    #[test]
    fn test_newlines_escaped() {
        let source = article_source().with_condition("`articles`.`a` = 1\nOR `articles`.`b` = 2");
        let sql = builder(source, 1).main_query();
        assert!(sql.contains("`articles`.`a` = 1\\\nOR `articles`.`b` = 2"));
    }

    #[test]
    fn test_delta_clause_and_reset() {
        let core = article_source().with_delta_strategy(DeltaStrategy::default());
        let delta = core.clone().as_delta();

        let core = builder(core, 2);
        assert!(core.main_query().contains("`articles`.`delta` = 0"));
        assert_eq!(
            core.pre_queries(),
            vec!["UPDATE `articles` SET `delta` = 0 WHERE `delta` = 1"]
        );

        let delta = builder(delta, 2);
        assert!(
            delta
                .main_query()
                .contains("WHERE `articles`.`delta` = 1 AND `articles`.`id` BETWEEN")
        );
        assert!(delta.pre_queries().is_empty());
    }

    #[test]
    fn test_range_query() {
        let range = builder(article_source(), 1).range_query().unwrap();
        assert_eq!(
            range,
            "SELECT IFNULL(MIN(`articles`.`id`), 1), IFNULL(MAX(`articles`.`id`), 1) FROM `articles`"
        );
    }

    #[test]
    fn test_range_query_excludes_range_and_user_conditions() {
        let source = article_source()
            .with_condition("`articles`.`published` = 1")
            .with_delta_strategy(DeltaStrategy::default())
            .as_delta();
        let range = builder(source, 1).range_query().unwrap();

        assert!(range.ends_with("FROM `articles` WHERE `articles`.`delta` = 1"));
    }

    #[test]
    fn test_range_query_disabled() {
        assert!(builder(article_source().without_range(), 1).range_query().is_none());
    }

    #[test]
    fn test_document_lookup_query() {
        let source = article_source().with_offset(5);
        let sql = builder(source, 3).document_lookup_query();
        assert_eq!(
            sql,
            "SELECT `articles`.* FROM `articles` WHERE `articles`.`id` = ($id - 5) / 3"
        );
    }

    #[test]
    fn test_pre_query_order() {
        let source = article_source()
            .with_delta_strategy(DeltaStrategy::default())
            .with_options(SourceOptions {
                group_concat_max_len: Some(8192),
                utf8: true,
            });
        assert_eq!(
            builder(source, 1).pre_queries(),
            vec![
                "UPDATE `articles` SET `delta` = 0 WHERE `delta` = 1",
                "SET SESSION group_concat_max_len = 8192",
                "SET NAMES utf8",
            ]
        );
    }

    #[test]
    fn test_inheritance() {
        let source = article_source().with_inheritance(Inheritance::subclass("Review"));
        let sql = builder(source, 1).main_query();

        assert!(sql.contains("WHERE `articles`.`type` = 'Review' AND `articles`.`id` BETWEEN"));
        assert!(sql.ends_with("`articles`.`published_at`, `articles`.`type` ORDER BY NULL"));
    }

    #[test]
    fn test_inheritance_base_class_groups_only() {
        let source = article_source().with_inheritance(Inheritance::default());
        let sql = builder(source, 1).main_query();

        assert!(!sql.contains("= 'Article'"));
        assert!(sql.contains(", `articles`.`type` ORDER BY NULL"));
    }

    #[test]
    fn test_queries_memoized() {
        let builder = builder(article_source(), 1);
        let first = builder.queries();
        let second = builder.queries();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.main, builder.main_query());
        assert_eq!(first.range, builder.range_query());
    }
}
