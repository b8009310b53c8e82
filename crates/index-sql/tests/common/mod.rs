//! Shared test infrastructure for SQL source generation.

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::*;
