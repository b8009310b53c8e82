//! Test fixtures.
//!
//! A small blogging schema: articles belong to an author, carry tags through
//! a taggings table, and are filed under categories through a join table.

#![allow(dead_code)]

use helios_index_sql::DialectKind;
use helios_index_sql::types::{
    ModelDefinition, PropertyDefinition, RelationDefinition, Schema, SourceDefinition, ValueType,
};

/// The blogging relation graph.
pub fn blog_schema() -> Schema {
    Schema::new()
        .with_model(
            "Article",
            ModelDefinition::new("articles")
                .with_relation(RelationDefinition::belongs_to("user", "User"))
                .with_relation(
                    RelationDefinition::belongs_to("editor", "User").with_foreign_key("editor_id"),
                )
                .with_relation(RelationDefinition::has_many("taggings", "Tagging"))
                .with_relation(RelationDefinition::has_many("comments", "Comment"))
                .with_relation(RelationDefinition::has_and_belongs_to_many(
                    "categories",
                    "Category",
                    "articles_categories",
                )),
        )
        .with_model("User", ModelDefinition::new("users"))
        .with_model(
            "Tagging",
            ModelDefinition::new("taggings")
                .with_relation(RelationDefinition::belongs_to("tag", "Tag")),
        )
        .with_model("Tag", ModelDefinition::new("tags"))
        .with_model("Comment", ModelDefinition::new("comments"))
        .with_model("Category", ModelDefinition::new("categories"))
}

/// Article source with a `title` field and a `published_at` timestamp attribute.
pub fn article_source() -> SourceDefinition {
    SourceDefinition::new("article_core", "Article", "articles")
        .with_field(PropertyDefinition::column("title"))
        .with_attribute(PropertyDefinition::column("published_at").with_type(ValueType::Timestamp))
}

/// Article source in the given dialect.
pub fn article_source_for(dialect: DialectKind) -> SourceDefinition {
    article_source().with_dialect(dialect)
}

/// A complete configuration document for the blogging schema.
pub const BLOG_CONFIG_JSON: &str = r#"{
  "models": {
    "Article": {
      "table": "articles",
      "relations": [
        { "name": "user", "kind": "belongs_to", "model": "User" },
        { "name": "taggings", "kind": "has_many", "model": "Tagging" }
      ]
    },
    "User": { "table": "users" },
    "Tagging": {
      "table": "taggings",
      "relations": [{ "name": "tag", "kind": "belongs_to", "model": "Tag" }]
    },
    "Tag": { "table": "tags" }
  },
  "indices": [
    {
      "name": "article",
      "model": "Article",
      "fields": [
        { "name": "title", "columns": ["title"] },
        { "name": "author", "columns": ["user.name"] }
      ],
      "attributes": [
        { "name": "published_at", "columns": ["published_at"], "type": "timestamp" },
        { "name": "tags", "columns": ["taggings.tag.name"] }
      ],
      "conditions": ["`articles`.`published` = 1"],
      "delta": { "type": "boolean" },
      "options": { "group_concat_max_len": 8192 }
    },
    {
      "model": "User",
      "dialect": "postgres",
      "fields": [{ "name": "name", "columns": ["name"] }],
      "disable_range": true
    }
  ]
}"#;
