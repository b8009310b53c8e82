//! Indexer configuration rendering.
//!
//! Writes each source as a `source <name> { ... }` block understood by
//! Sphinx-style indexers. Statements are written on one line; the main
//! query keeps its escaped newlines so multi-line fragments continue onto
//! the next line.

use crate::adapters::DialectKind;
use crate::error::ConfigResult;
use crate::sql::SqlBuilder;
use crate::types::{PropertyDefinition, ValueType};

use super::IndexConfiguration;

/// Renders one source block.
pub fn render_source(builder: &SqlBuilder) -> String {
    let queries = builder.queries();
    let source = builder.source();

    let mut out = String::new();
    out.push_str(&format!("source {}\n{{\n", queries.name));
    push_setting(&mut out, "type", source_type(source.dialect));
    for pre in &queries.pre {
        push_setting(&mut out, "sql_query_pre", pre);
    }
    if let Some(range) = &queries.range {
        push_setting(&mut out, "sql_query_range", range);
    }
    push_setting(&mut out, "sql_query", &queries.main);
    push_setting(&mut out, "sql_query_info", &queries.info);
    // presented attributes keep definition order
    for (attribute, presented) in source.attributes.iter().zip(builder.attribute_sql()) {
        let (setting, value) = attribute_setting(attribute, presented.aggregate);
        push_setting(&mut out, setting, &value);
    }
    out.push_str("}\n");
    out
}

/// Renders every source of a configuration, separated by blank lines.
pub fn render_configuration(config: &IndexConfiguration) -> ConfigResult<String> {
    let blocks: Vec<String> = config.builders()?.iter().map(render_source).collect();
    Ok(blocks.join("\n"))
}

fn push_setting(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("  {} = {}\n", key, value));
}

fn source_type(dialect: DialectKind) -> &'static str {
    match dialect {
        DialectKind::Mysql => "mysql",
        DialectKind::Postgresql => "pgsql",
    }
}

fn attribute_setting(attribute: &PropertyDefinition, aggregate: bool) -> (&'static str, String) {
    if aggregate {
        return ("sql_attr_multi", format!("uint {} from field", attribute.name));
    }
    let setting = match attribute.value_type {
        ValueType::String => "sql_attr_string",
        ValueType::Integer => "sql_attr_uint",
        ValueType::Bigint => "sql_attr_bigint",
        ValueType::Float => "sql_attr_float",
        ValueType::Boolean => "sql_attr_bool",
        ValueType::Timestamp => "sql_attr_timestamp",
    };
    (setting, attribute.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelDefinition, RelationDefinition, Schema, SourceDefinition};

    fn builder(source: SourceDefinition) -> SqlBuilder {
        let schema = Schema::new().with_model("Article", ModelDefinition::new("articles"));
        SqlBuilder::new(source, &schema, 1).unwrap()
    }

    #[test]
    fn test_render_source_block() {
        let source = SourceDefinition::new("article_core", "Article", "articles")
            .with_field(PropertyDefinition::column("title"))
            .with_attribute(
                PropertyDefinition::column("published_at").with_type(ValueType::Timestamp),
            );
        let rendered = render_source(&builder(source));

        assert!(rendered.starts_with("source article_core\n{\n  type = mysql\n"));
        assert!(rendered.contains("\n  sql_query_range = SELECT IFNULL(MIN("));
        assert!(rendered.contains("\n  sql_query = SELECT SQL_NO_CACHE "));
        assert!(rendered.contains(
            "\n  sql_query_info = SELECT `articles`.* FROM `articles` WHERE `articles`.`id` = ($id - 0) / 1\n"
        ));
        assert!(rendered.contains("\n  sql_attr_timestamp = published_at\n"));
        assert!(rendered.ends_with("}\n"));
    }

    #[test]
    fn test_render_without_range() {
        let source = SourceDefinition::new("article_core", "Article", "articles")
            .with_field(PropertyDefinition::column("title"))
            .with_dialect(DialectKind::Postgresql)
            .without_range();
        let rendered = render_source(&builder(source));

        assert!(rendered.contains("  type = pgsql\n"));
        assert!(!rendered.contains("sql_query_range"));
    }

    #[test]
    fn test_multi_attribute_setting() {
        let attribute = PropertyDefinition::new("tag_ids", "taggings.tag_id").multi();
        assert_eq!(
            attribute_setting(&attribute, true),
            ("sql_attr_multi", "uint tag_ids from field".to_string())
        );
    }

    #[test]
    fn test_attribute_through_collection_declared_multi() {
        let schema = Schema::new()
            .with_model(
                "Article",
                ModelDefinition::new("articles")
                    .with_relation(RelationDefinition::has_many("taggings", "Tagging")),
            )
            .with_model(
                "Tagging",
                ModelDefinition::new("taggings")
                    .with_relation(RelationDefinition::belongs_to("tag", "Tag")),
            )
            .with_model("Tag", ModelDefinition::new("tags"));
        let source = SourceDefinition::new("article_core", "Article", "articles")
            .with_field(PropertyDefinition::column("title"))
            .with_attribute(
                PropertyDefinition::new("tag_ids", "taggings.tag.id").with_type(ValueType::Integer),
            )
            .with_attribute(PropertyDefinition::column("views").with_type(ValueType::Integer));
        let rendered = render_source(&SqlBuilder::new(source, &schema, 1).unwrap());

        assert!(rendered.contains("GROUP_CONCAT(DISTINCT `tags`.`id` SEPARATOR ',') AS `tag_ids`"));
        assert!(rendered.contains("\n  sql_attr_multi = uint tag_ids from field\n"));
        assert!(!rendered.contains("sql_attr_uint = tag_ids"));
        assert!(rendered.contains("\n  sql_attr_uint = views\n"));
    }
}
