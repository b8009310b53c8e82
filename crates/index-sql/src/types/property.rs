//! Field and attribute definitions.
//!
//! Fields are full-text searchable; attributes are filterable and sortable
//! values. Both are a name plus one or more column references, and both
//! may be reached through an association path.

use serde::{Deserialize, Serialize};

/// Reference to the SQL expression a property reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "ColumnRepr", into = "ColumnRepr")]
pub enum Column {
    /// A column on the source table or on a table reached via `path`.
    Path {
        /// Relation names leading from the source model to the column's table.
        path: Vec<String>,
        /// Column name.
        name: String,
    },
    /// A raw SQL expression used verbatim.
    Sql(String),
}

impl Column {
    /// Parses dotted notation: `title` or `taggings.tag.name`.
    pub fn parse(dotted: &str) -> Self {
        let mut parts: Vec<String> = dotted.split('.').map(str::to_string).collect();
        let name = parts.pop().unwrap_or_default();
        Column::Path { path: parts, name }
    }

    /// Creates a raw SQL column.
    pub fn sql(expression: impl Into<String>) -> Self {
        Column::Sql(expression.into())
    }

    /// The association path, empty for own-table and raw columns.
    pub fn path(&self) -> &[String] {
        match self {
            Column::Path { path, .. } => path,
            Column::Sql(_) => &[],
        }
    }

    /// Returns true for raw SQL columns.
    pub fn is_sql(&self) -> bool {
        matches!(self, Column::Sql(_))
    }
}

impl From<&str> for Column {
    fn from(dotted: &str) -> Self {
        Column::parse(dotted)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColumnRepr {
    Dotted(String),
    Sql { sql: String },
}

impl From<ColumnRepr> for Column {
    fn from(repr: ColumnRepr) -> Self {
        match repr {
            ColumnRepr::Dotted(dotted) => Column::parse(&dotted),
            ColumnRepr::Sql { sql } => Column::Sql(sql),
        }
    }
}

impl From<Column> for ColumnRepr {
    fn from(column: Column) -> Self {
        match column {
            Column::Path { mut path, name } => {
                path.push(name);
                ColumnRepr::Dotted(path.join("."))
            }
            Column::Sql(sql) => ColumnRepr::Sql { sql },
        }
    }
}

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Text.
    #[default]
    String,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Bigint,
    /// Floating point number.
    Float,
    /// Boolean.
    Boolean,
    /// Date/time, indexed as epoch seconds.
    Timestamp,
}

/// Whether a property is a field or an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Full-text field.
    Field,
    /// Filterable attribute.
    Attribute,
}

impl PropertyKind {
    /// Separator used when a multi-valued property is collapsed into one string.
    pub fn aggregate_separator(&self) -> &'static str {
        match self {
            PropertyKind::Field => " ",
            PropertyKind::Attribute => ",",
        }
    }
}

/// Definition of a single field or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Name the value is exposed under.
    pub name: String,

    /// Columns that make up the value. Several columns are concatenated.
    pub columns: Vec<Column>,

    /// Forces aggregation even without a collection association.
    #[serde(default)]
    pub multi: bool,

    /// Value type.
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
}

impl PropertyDefinition {
    /// Creates a property reading a single column in dotted notation.
    pub fn new(name: impl Into<String>, column: impl Into<Column>) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.into()],
            multi: false,
            value_type: ValueType::default(),
        }
    }

    /// Creates a property named after its single column.
    pub fn column(dotted: &str) -> Self {
        let column = Column::parse(dotted);
        let name = match &column {
            Column::Path { name, .. } => name.clone(),
            Column::Sql(sql) => sql.clone(),
        };
        Self::new(name, column)
    }

    /// Creates a property concatenating several columns.
    pub fn concatenated(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            multi: false,
            value_type: ValueType::default(),
        }
    }

    /// Marks the property as multi-valued.
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Sets the value type.
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }
}

/// A reference to data joined into the source query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "AssociationRepr", into = "AssociationRepr")]
pub enum AssociationReference {
    /// A path of relation names, resolved against the relation graph.
    Path(Vec<String>),
    /// A raw JOIN clause passed through verbatim.
    Raw(String),
}

impl AssociationReference {
    /// Parses a dotted relation path such as `taggings.tag`.
    pub fn path(dotted: &str) -> Self {
        AssociationReference::Path(dotted.split('.').map(str::to_string).collect())
    }

    /// Creates a raw JOIN reference.
    pub fn raw(join: impl Into<String>) -> Self {
        AssociationReference::Raw(join.into())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AssociationRepr {
    Dotted(String),
    Sql { sql: String },
}

impl From<AssociationRepr> for AssociationReference {
    fn from(repr: AssociationRepr) -> Self {
        match repr {
            AssociationRepr::Dotted(dotted) => AssociationReference::path(&dotted),
            AssociationRepr::Sql { sql } => AssociationReference::Raw(sql),
        }
    }
}

impl From<AssociationReference> for AssociationRepr {
    fn from(reference: AssociationReference) -> Self {
        match reference {
            AssociationReference::Path(path) => AssociationRepr::Dotted(path.join(".")),
            AssociationReference::Raw(sql) => AssociationRepr::Sql { sql },
        }
    }
}
