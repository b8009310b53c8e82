//! Source definitions.
//!
//! A source describes one searchable table for one index: which columns
//! become fields and attributes, which relations are joined, which rows
//! belong to it, and which dialect its SQL is written in. Sources are built
//! once per indexing run and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::adapters::DialectKind;
use crate::deltas::DeltaStrategy;
use crate::error::{ConfigResult, ConfigurationError};

use super::property::{AssociationReference, Column, PropertyDefinition};
use super::schema::demodulize;

/// Free-form per-source options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Session `group_concat_max_len` to set before querying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_concat_max_len: Option<u64>,

    /// Switch the connection to UTF-8 before querying.
    #[serde(default, alias = "utf8?")]
    pub utf8: bool,
}

/// Single-table inheritance settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inheritance {
    /// Discriminator column present on the table.
    #[serde(default = "default_inheritance_column")]
    pub column: String,

    /// Stored type name when the source model is a subclass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Whether stored type names keep their module prefix.
    #[serde(default = "default_store_full_class_name")]
    pub store_full_class_name: bool,
}

fn default_inheritance_column() -> String {
    "type".to_string()
}

fn default_store_full_class_name() -> bool {
    true
}

impl Default for Inheritance {
    fn default() -> Self {
        Self {
            column: default_inheritance_column(),
            type_name: None,
            store_full_class_name: default_store_full_class_name(),
        }
    }
}

impl Inheritance {
    /// Inheritance for a subclass stored as `type_name`.
    pub fn subclass(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    /// Value the discriminator column must hold, if the model is a subclass.
    pub fn discriminator(&self) -> Option<&str> {
        let type_name = self.type_name.as_deref()?;
        if self.store_full_class_name {
            Some(type_name)
        } else {
            Some(demodulize(type_name))
        }
    }
}

/// Definition of one searchable source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Source name, unique within a configuration.
    pub name: String,

    /// Model name in the relation graph.
    pub model: String,

    /// Backing table.
    pub table: String,

    /// Primary key column.
    pub primary_key: String,

    /// Document id offset of the owning index.
    #[serde(default)]
    pub offset: u32,

    /// Whether this source feeds a delta index.
    #[serde(default)]
    pub delta: bool,

    /// Disables ranged (batched) querying.
    #[serde(default)]
    pub disable_range: bool,

    /// Extra raw WHERE conditions.
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Extra raw GROUP BY expressions.
    #[serde(default)]
    pub groupings: Vec<String>,

    /// Full-text fields.
    #[serde(default)]
    pub fields: Vec<PropertyDefinition>,

    /// Attributes.
    #[serde(default)]
    pub attributes: Vec<PropertyDefinition>,

    /// Joined associations.
    #[serde(default)]
    pub associations: Vec<AssociationReference>,

    /// SQL dialect.
    #[serde(default)]
    pub dialect: DialectKind,

    /// Delta strategy, if the source supports delta indexing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_strategy: Option<DeltaStrategy>,

    /// Free-form options.
    #[serde(default)]
    pub options: SourceOptions,

    /// Single-table inheritance settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<Inheritance>,
}

impl SourceDefinition {
    /// Creates a source for `model` backed by `table` with an `id` primary key.
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            table: table.into(),
            primary_key: "id".to_string(),
            offset: 0,
            delta: false,
            disable_range: false,
            conditions: Vec::new(),
            groupings: Vec::new(),
            fields: Vec::new(),
            attributes: Vec::new(),
            associations: Vec::new(),
            dialect: DialectKind::default(),
            delta_strategy: None,
            options: SourceOptions::default(),
            inheritance: None,
        }
    }

    /// Sets the primary key column.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Sets the document id offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Adds a field.
    pub fn with_field(mut self, field: PropertyDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, attribute: PropertyDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds an association reference.
    pub fn with_association(mut self, association: AssociationReference) -> Self {
        self.associations.push(association);
        self
    }

    /// Adds a raw WHERE condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Adds a raw GROUP BY expression.
    pub fn with_grouping(mut self, grouping: impl Into<String>) -> Self {
        self.groupings.push(grouping.into());
        self
    }

    /// Sets the dialect.
    pub fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enables delta processing with the given strategy.
    pub fn with_delta_strategy(mut self, strategy: DeltaStrategy) -> Self {
        self.delta_strategy = Some(strategy);
        self
    }

    /// Marks this source as feeding the delta index.
    pub fn as_delta(mut self) -> Self {
        self.delta = true;
        self
    }

    /// Disables ranged querying.
    pub fn without_range(mut self) -> Self {
        self.disable_range = true;
        self
    }

    /// Sets the options.
    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets single-table inheritance.
    pub fn with_inheritance(mut self, inheritance: Inheritance) -> Self {
        self.inheritance = Some(inheritance);
        self
    }

    /// Iterates fields then attributes.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.fields.iter().chain(self.attributes.iter())
    }

    /// Checks that every identifier the generated SQL relies on is present.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.table.trim().is_empty() {
            return Err(ConfigurationError::MissingTable {
                source_name: self.name.clone(),
            });
        }
        if self.primary_key.trim().is_empty() {
            return Err(ConfigurationError::MissingPrimaryKey {
                source_name: self.name.clone(),
            });
        }

        for property in self.properties() {
            if property.columns.is_empty() {
                return Err(ConfigurationError::PropertyWithoutColumns {
                    property: property.name.clone(),
                });
            }
            for column in &property.columns {
                let blank = match column {
                    Column::Path { path, name } => {
                        name.trim().is_empty() || path.iter().any(|p| p.trim().is_empty())
                    }
                    Column::Sql(sql) => sql.trim().is_empty(),
                };
                if blank {
                    return Err(ConfigurationError::EmptyColumnName {
                        property: property.name.clone(),
                    });
                }
            }
        }

        for association in &self.associations {
            if let AssociationReference::Path(path) = association {
                if path.is_empty() || path.iter().any(|p| p.trim().is_empty()) {
                    return Err(ConfigurationError::EmptyAssociationPath);
                }
            }
        }

        Ok(())
    }
}
