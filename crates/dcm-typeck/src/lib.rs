//! DCM type resolution.
//!
//! Decides, for every expression of a policy, its scalar type and whether it
//! is a decision variable the solver assigns, and records the tuple layout
//! (field types and positions) of every table and view for code generation.
//!
//! # Architecture
//!
//! - [`ty`]: the type domain (`Ty`, `TypeList`)
//! - [`registry`]: the tuple metadata registry (`TupleMetadata`)
//! - [`infer`]: the inference rules over the expression IR
//! - [`error`]: errors, split into internal and user classes
//! - [`check`]: whole-program driver ordering views by dependency

pub mod check;
pub mod error;
pub mod infer;
pub mod registry;
pub mod ty;

pub use check::{check, Program, View};
pub use error::{ErrorClass, TypeError};
pub use registry::{FieldLayout, ScopeKind, ScopeLayout, TupleMetadata};
pub use ty::{Ty, TypeList};
