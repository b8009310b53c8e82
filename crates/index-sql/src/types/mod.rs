//! Core types describing what gets indexed.
//!
//! - [`source`] - Source definitions, options and inheritance settings
//! - [`property`] - Fields, attributes, columns and association references
//! - [`schema`] - The relation graph supplied by model introspection

pub mod property;
pub mod schema;
pub mod source;

pub use property::{AssociationReference, Column, PropertyDefinition, PropertyKind, ValueType};
pub use schema::{ModelDefinition, RelationDefinition, RelationGraph, RelationKind, Schema};
pub use source::{Inheritance, SourceDefinition, SourceOptions};
