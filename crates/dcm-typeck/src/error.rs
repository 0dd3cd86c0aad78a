//! Type resolution errors.
//!
//! Errors fall into two classes (see [`ErrorClass`]). Internal errors mean an
//! earlier compiler stage, or this crate, handed over something it should
//! not have; user errors point at a policy the author has to fix. Both
//! abort the current compilation.

use std::fmt;

use dcm_ir::Function;

/// Who has to act on an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// A defect in the compiler. Not recoverable.
    Internal,
    /// A problem in the policy being compiled.
    User,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Internal => write!(f, "internal compiler error"),
            ErrorClass::User => write!(f, "error"),
        }
    }
}

/// An error raised while typing tables, views or expressions.
///
/// Expressions are carried in their rendered form so the error stays
/// independent of the tree it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeError {
    /// A table or view scope was registered a second time.
    ScopeAlreadyRegistered { scope: String },
    /// Lookup against a scope that was never registered.
    UnknownScope { scope: String },
    /// Lookup of a field the scope does not have.
    UnknownField { scope: String, field: String },
    /// A literal value kind with no typing rule.
    UnsupportedLiteral { literal: String },
    /// A function applied to an arity it has no typing rule for.
    UnsupportedFunction {
        function: Function,
        arity: usize,
        expr: String,
    },
    /// A view output that is neither aliased nor a bare column reference.
    UnaliasedOutputField { view: String, expr: String },
    /// Two outputs of one scope resolve to the same field name.
    DuplicateField { scope: String, field: String },
    /// A sub-query used as a value does not project exactly one field.
    AmbiguousSubqueryType { expr: String, fields: usize },
    /// Views that read from each other in a cycle.
    ViewCycle { cycle: Vec<String> },
}

impl TypeError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TypeError::ScopeAlreadyRegistered { .. }
            | TypeError::UnknownScope { .. }
            | TypeError::UnknownField { .. }
            | TypeError::UnsupportedLiteral { .. }
            | TypeError::UnsupportedFunction { .. } => ErrorClass::Internal,
            TypeError::UnaliasedOutputField { .. }
            | TypeError::DuplicateField { .. }
            | TypeError::AmbiguousSubqueryType { .. }
            | TypeError::ViewCycle { .. } => ErrorClass::User,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.class() == ErrorClass::Internal
    }

    /// Stable code per variant. `E` codes are user errors, `I` codes are
    /// internal ones.
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::UnaliasedOutputField { .. } => "E0001",
            TypeError::DuplicateField { .. } => "E0002",
            TypeError::AmbiguousSubqueryType { .. } => "E0003",
            TypeError::ViewCycle { .. } => "E0004",
            TypeError::ScopeAlreadyRegistered { .. } => "I0001",
            TypeError::UnknownScope { .. } => "I0002",
            TypeError::UnknownField { .. } => "I0003",
            TypeError::UnsupportedLiteral { .. } => "I0004",
            TypeError::UnsupportedFunction { .. } => "I0005",
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::ScopeAlreadyRegistered { scope } => {
                write!(f, "scope `{}` is already registered", scope)
            }
            TypeError::UnknownScope { scope } => write!(f, "unknown scope `{}`", scope),
            TypeError::UnknownField { scope, field } => {
                write!(f, "scope `{}` has no field `{}`", scope, field)
            }
            TypeError::UnsupportedLiteral { literal } => {
                write!(f, "no type for literal `{}`", literal)
            }
            TypeError::UnsupportedFunction {
                function,
                arity,
                expr,
            } => write!(
                f,
                "unsupported function `{}` with {} argument{}: {}",
                function,
                arity,
                if *arity == 1 { "" } else { "s" },
                expr
            ),
            TypeError::UnaliasedOutputField { view, expr } => write!(
                f,
                "non-column output fields must be aliased: `{}` in view `{}`",
                expr, view
            ),
            TypeError::DuplicateField { scope, field } => {
                write!(f, "field `{}` appears more than once in `{}`", field, scope)
            }
            TypeError::AmbiguousSubqueryType { expr, fields } => write!(
                f,
                "ambiguous tuple type for sub-query: expected 1 output field, found {}: {}",
                fields, expr
            ),
            TypeError::ViewCycle { cycle } => {
                write!(f, "views depend on each other: {}", cycle.join(" -> "))
            }
        }
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let internal = TypeError::UnknownScope {
            scope: "nope".into(),
        };
        assert!(internal.is_internal());
        assert_eq!(internal.code(), "I0002");

        let user = TypeError::UnaliasedOutputField {
            view: "SPARE".into(),
            expr: "SUM(pod_info.demand)".into(),
        };
        assert_eq!(user.class(), ErrorClass::User);
        assert_eq!(user.code(), "E0001");
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            TypeError::UnsupportedFunction {
                function: Function::Sum,
                arity: 2,
                expr: "SUM(a, b)".into(),
            }
            .to_string(),
            "unsupported function `SUM` with 2 arguments: SUM(a, b)"
        );
        assert_eq!(
            TypeError::UnsupportedFunction {
                function: Function::ScalarProduct,
                arity: 1,
                expr: "SCALAR_PRODUCT(a)".into(),
            }
            .to_string(),
            "unsupported function `SCALAR_PRODUCT` with 1 argument: SCALAR_PRODUCT(a)"
        );
        assert_eq!(
            TypeError::ViewCycle {
                cycle: vec!["A".into(), "B".into(), "A".into()],
            }
            .to_string(),
            "views depend on each other: A -> B -> A"
        );
        assert_eq!(
            TypeError::UnknownField {
                scope: "node_info".into(),
                field: "cpu".into(),
            }
            .to_string(),
            "scope `node_info` has no field `cpu`"
        );
    }
}
