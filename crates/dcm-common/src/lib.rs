//! Shared types for the DCM compiler.
//!
//! - [`schema`]: relational schema facts (tables, columns, declared kinds)
//! - [`names`]: case normalization for view scopes
//! - [`view_graph`]: view dependency graph and topological ordering

pub mod names;
pub mod schema;
pub mod view_graph;
