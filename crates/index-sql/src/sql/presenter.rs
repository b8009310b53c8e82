//! Property presentation.
//!
//! Converts one field or attribute into its SELECT-list expression and,
//! when it can be grouped on, its GROUP BY expression. A search document is
//! a single row, so a property reached through a collection relation is
//! collapsed with the dialect's distinct string aggregate; such aggregates
//! never appear in GROUP BY.

use crate::adapters::DatabaseAdapter;
use crate::error::{ConfigResult, ConfigurationError};
use crate::types::{Column, PropertyDefinition, PropertyKind, ValueType};

use super::associations::Associations;
use super::clause::LIST_SEPARATOR;

/// SQL for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySql {
    /// Property name.
    pub name: String,
    /// Field or attribute.
    pub kind: PropertyKind,
    /// SELECT-list expression, aliased to the property name.
    pub select: String,
    /// GROUP BY expression, absent for aggregated or raw SQL properties.
    pub group: Option<String>,
    /// True if the value is aggregated across joined rows.
    pub aggregate: bool,
}

/// Presents a property against a resolved join graph.
#[derive(Debug)]
pub struct PropertySqlPresenter<'a> {
    property: &'a PropertyDefinition,
    kind: PropertyKind,
    adapter: &'static dyn DatabaseAdapter,
    associations: &'a Associations,
}

impl<'a> PropertySqlPresenter<'a> {
    /// Creates a presenter.
    pub fn new(
        property: &'a PropertyDefinition,
        kind: PropertyKind,
        adapter: &'static dyn DatabaseAdapter,
        associations: &'a Associations,
    ) -> Self {
        Self {
            property,
            kind,
            adapter,
            associations,
        }
    }

    /// Returns true if the property spans several rows per document.
    pub fn aggregate(&self) -> bool {
        self.property.multi
            || self
                .property
                .columns
                .iter()
                .any(|column| self.associations.aggregate_for(column.path()))
    }

    /// SELECT-list expression.
    pub fn to_select(&self) -> ConfigResult<String> {
        let mut parts = self.columns_with_table()?;
        if self.property.value_type == ValueType::Timestamp {
            parts = parts
                .iter()
                .map(|part| self.adapter.cast_to_timestamp(part))
                .collect();
        }

        let mut clause = if parts.len() > 1 {
            self.adapter.concatenate(&parts, " ")
        } else {
            parts.join(LIST_SEPARATOR)
        };
        if self.aggregate() {
            clause = self
                .adapter
                .group_concatenate(&clause, self.kind.aggregate_separator());
        }

        Ok(format!(
            "{} AS {}",
            clause,
            self.adapter.quote(&self.property.name)
        ))
    }

    /// GROUP BY expression, if the property can be grouped on.
    pub fn to_group(&self) -> ConfigResult<Option<String>> {
        if self.aggregate() || self.property.columns.iter().any(Column::is_sql) {
            return Ok(None);
        }
        Ok(Some(self.columns_with_table()?.join(LIST_SEPARATOR)))
    }

    /// Both expressions at once.
    pub fn present(&self) -> ConfigResult<PropertySql> {
        Ok(PropertySql {
            name: self.property.name.clone(),
            kind: self.kind,
            select: self.to_select()?,
            group: self.to_group()?,
            aggregate: self.aggregate(),
        })
    }

    fn columns_with_table(&self) -> ConfigResult<Vec<String>> {
        self.property
            .columns
            .iter()
            .map(|column| match column {
                Column::Sql(sql) => Ok(sql.clone()),
                Column::Path { path, name } => {
                    let alias = self.associations.alias_for(path).ok_or_else(|| {
                        ConfigurationError::UnknownAssociation {
                            model: self.associations.model().to_string(),
                            association: path.join("."),
                        }
                    })?;
                    Ok(self.adapter.quote_qualified(alias, name))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DialectKind;
    use crate::types::{
        AssociationReference, ModelDefinition, RelationDefinition, Schema, SourceDefinition,
    };

    fn schema() -> Schema {
        Schema::new()
            .with_model(
                "Article",
                ModelDefinition::new("articles")
                    .with_relation(RelationDefinition::belongs_to("user", "User"))
                    .with_relation(RelationDefinition::has_many("taggings", "Tagging")),
            )
            .with_model("User", ModelDefinition::new("users"))
            .with_model(
                "Tagging",
                ModelDefinition::new("taggings")
                    .with_relation(RelationDefinition::belongs_to("tag", "Tag")),
            )
            .with_model("Tag", ModelDefinition::new("tags"))
    }

    fn associations(dialect: DialectKind) -> Associations {
        let source = SourceDefinition::new("a", "Article", "articles")
            .with_association(AssociationReference::path("user"))
            .with_association(AssociationReference::path("taggings.tag"));
        Associations::resolve(&source, &schema(), dialect.adapter()).unwrap()
    }

    fn present(
        property: &PropertyDefinition,
        kind: PropertyKind,
        dialect: DialectKind,
    ) -> PropertySql {
        let associations = associations(dialect);
        PropertySqlPresenter::new(property, kind, dialect.adapter(), &associations)
            .present()
            .unwrap()
    }

    #[test]
    fn test_single_valued_field() {
        let sql = present(
            &PropertyDefinition::column("title"),
            PropertyKind::Field,
            DialectKind::Mysql,
        );

        assert_eq!(sql.select, "`articles`.`title` AS `title`");
        assert_eq!(sql.group.as_deref(), Some("`articles`.`title`"));
        assert!(!sql.aggregate);
    }

    #[test]
    fn test_belongs_to_field_is_grouped() {
        let sql = present(
            &PropertyDefinition::new("author", "user.name"),
            PropertyKind::Field,
            DialectKind::Mysql,
        );

        assert_eq!(sql.select, "`users`.`name` AS `author`");
        assert_eq!(sql.group.as_deref(), Some("`users`.`name`"));
    }

    #[test]
    fn test_has_many_attribute_aggregated() {
        let sql = present(
            &PropertyDefinition::new("tags", "taggings.tag.name"),
            PropertyKind::Attribute,
            DialectKind::Mysql,
        );

        assert_eq!(
            sql.select,
            "GROUP_CONCAT(DISTINCT `tags`.`name` SEPARATOR ',') AS `tags`"
        );
        assert_eq!(sql.group, None);
        assert!(sql.aggregate);
    }

    #[test]
    fn test_has_many_field_postgres() {
        let sql = present(
            &PropertyDefinition::new("tags", "taggings.tag.name"),
            PropertyKind::Field,
            DialectKind::Postgresql,
        );

        assert_eq!(
            sql.select,
            r#"array_to_string(array_agg(DISTINCT "tags"."name"), ' ') AS "tags""#
        );
        assert_eq!(sql.group, None);
    }

    #[test]
    fn test_explicit_multi_aggregated() {
        let property = PropertyDefinition::column("tag_list").multi();
        let sql = present(&property, PropertyKind::Attribute, DialectKind::Mysql);

        assert!(sql.aggregate);
        assert_eq!(sql.group, None);
    }

    #[test]
    fn test_concatenated_field() {
        let property = PropertyDefinition::concatenated(
            "full_name",
            vec![Column::parse("user.first_name"), Column::parse("user.last_name")],
        );
        let sql = present(&property, PropertyKind::Field, DialectKind::Mysql);

        assert_eq!(
            sql.select,
            "CONCAT_WS(' ', `users`.`first_name`, `users`.`last_name`) AS `full_name`"
        );
        assert_eq!(
            sql.group.as_deref(),
            Some("`users`.`first_name`, `users`.`last_name`")
        );
    }

    #[test]
    fn test_timestamp_attribute_cast() {
        let property =
            PropertyDefinition::column("published_at").with_type(ValueType::Timestamp);
        let sql = present(&property, PropertyKind::Attribute, DialectKind::Postgresql);

        assert_eq!(
            sql.select,
            r#"extract(epoch from "articles"."published_at")::int AS "published_at""#
        );
        assert_eq!(sql.group.as_deref(), Some(r#""articles"."published_at""#));
    }

    #[test]
    fn test_raw_sql_not_grouped() {
        let property = PropertyDefinition::new("title_length", Column::sql("LENGTH(title)"));
        let sql = present(&property, PropertyKind::Attribute, DialectKind::Mysql);

        assert_eq!(sql.select, "LENGTH(title) AS `title_length`");
        assert_eq!(sql.group, None);
    }

    #[test]
    fn test_unresolved_path_is_configuration_error() {
        let associations = associations(DialectKind::Mysql);
        let property = PropertyDefinition::new("editor", "editor.name");
        let err = PropertySqlPresenter::new(
            &property,
            PropertyKind::Field,
            DialectKind::Mysql.adapter(),
            &associations,
        )
        .to_select()
        .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::UnknownAssociation {
                model: "Article".to_string(),
                association: "editor".to_string()
            }
        );
    }
}
