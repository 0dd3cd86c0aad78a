//! Expression IR for DCM policies.
//!
//! The front end lowers each view and constraint into a tree of [`Expr`]
//! nodes. The tree is immutable once built: the type checker only reads
//! operator tags, operands, literal values, function kinds and aliases.
//!
//! - [`expr`]: the node variants and their builders
//! - [`ops`]: unary/binary operators and aggregate functions
//! - [`display`]: SQL-like rendering used in diagnostics

pub mod display;
pub mod expr;
pub mod ops;

pub use expr::{ColumnRef, Comprehension, Expr, Head, Literal, Qualifier};
pub use ops::{BinaryOp, Function, UnaryOp};
