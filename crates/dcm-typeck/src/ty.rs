//! The type domain.
//!
//! Every expression resolves to one [`Ty`]: either a concrete value kind
//! known at compile time, or a decision-variable kind the solver assigns.
//! Variable-ness is infectious: composing a variable with anything yields a
//! variable (see `infer`).

use std::fmt;

use dcm_common::schema::ColumnKind;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Bool,
    Integer,
    Long,
    Float,
    String,
    ArrayOfObjects,
    /// Solver-facing counterpart of `Bool`.
    BoolVar,
    /// Solver-facing counterpart of `Integer`.
    IntVar,
}

impl Ty {
    /// Whether the value is a decision variable.
    pub fn is_var(self) -> bool {
        matches!(self, Ty::IntVar | Ty::BoolVar)
    }

    /// `BoolVar` when `var`, else `Bool`.
    pub fn bool_like(var: bool) -> Ty {
        if var {
            Ty::BoolVar
        } else {
            Ty::Bool
        }
    }

    /// `IntVar` when `var`, else `Integer`.
    pub fn int_like(var: bool) -> Ty {
        if var {
            Ty::IntVar
        } else {
            Ty::Integer
        }
    }

    /// The fixed mapping from a declared column kind.
    pub fn from_column_kind(kind: ColumnKind) -> Ty {
        match kind {
            ColumnKind::String => Ty::String,
            ColumnKind::Bool => Ty::Bool,
            ColumnKind::Long => Ty::Long,
            ColumnKind::Integer => Ty::Integer,
            ColumnKind::Float => Ty::Float,
            ColumnKind::ArrayOfObjects => Ty::ArrayOfObjects,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ty::Bool => "Bool",
            Ty::Integer => "Integer",
            Ty::Long => "Long",
            Ty::Float => "Float",
            Ty::String => "String",
            Ty::ArrayOfObjects => "ArrayOfObjects",
            Ty::BoolVar => "BoolVar",
            Ty::IntVar => "IntVar",
        };
        write!(f, "{}", name)
    }
}

/// The ordered member types of a tuple.
///
/// Renders as the tuple's type parameter list, e.g. `Integer, IntVar`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeList(pub Vec<Ty>);

impl TypeList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ty> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Ty] {
        &self.0
    }
}

impl From<Vec<Ty>> for TypeList {
    fn from(tys: Vec<Ty>) -> Self {
        TypeList(tys)
    }
}

impl FromIterator<Ty> for TypeList {
    fn from_iter<I: IntoIterator<Item = Ty>>(iter: I) -> Self {
        TypeList(iter.into_iter().collect())
    }
}

impl IntoIterator for TypeList {
    type Item = Ty;
    type IntoIter = std::vec::IntoIter<Ty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TypeList {
    type Item = &'a Ty;
    type IntoIter = std::slice::Iter<'a, Ty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        Ok(())
    }
}
