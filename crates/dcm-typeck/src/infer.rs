//! Type and variable-ness inference over the expression IR.
//!
//! A single recursive pass: every node's type is computed from its children
//! and, for column references, from the schema facts carried by the
//! reference or the registry's view scopes. The tree is never modified.

use dcm_common::schema::Column;
use dcm_ir::{ColumnRef, Comprehension, Expr, Function, Literal, UnaryOp};
use tracing::warn;

use crate::error::TypeError;
use crate::registry::TupleMetadata;
use crate::ty::Ty;

/// The type of a column read from a base table: controllable columns are
/// always `IntVar`, whatever their declared kind.
pub fn column_type(column: &Column) -> Ty {
    if column.controllable {
        Ty::IntVar
    } else {
        Ty::from_column_kind(column.kind)
    }
}

/// Inference context: the scopes registered so far.
pub(crate) struct Infer<'a> {
    meta: &'a TupleMetadata,
}

impl<'a> Infer<'a> {
    pub(crate) fn new(meta: &'a TupleMetadata) -> Self {
        Infer { meta }
    }

    pub(crate) fn infer(&self, expr: &Expr) -> Result<Ty, TypeError> {
        match expr {
            Expr::Column(col) => self.infer_column(col),
            Expr::Literal(lit) => infer_literal(lit),
            Expr::Unary { op, arg } => {
                let ty = self.infer(arg)?;
                Ok(match op {
                    UnaryOp::Not => Ty::bool_like(ty == Ty::BoolVar),
                    UnaryOp::Minus | UnaryOp::Plus => ty,
                })
            }
            Expr::Binary { op, left, right } => {
                let left = self.infer(left)?;
                let right = self.infer(right)?;
                let var = left.is_var() || right.is_var();
                if op.is_arithmetic() {
                    Ok(Ty::int_like(var))
                } else {
                    Ok(Ty::bool_like(var))
                }
            }
            Expr::Call { function, args } => self.infer_call(expr, *function, args),
            // TODO: EXISTS over a compile-time constant argument could be a
            // plain Bool even when the argument's type is a variable kind.
            Expr::Exists(arg) | Expr::IsNull(arg) | Expr::IsNotNull(arg) => {
                Ok(Ty::bool_like(self.infer(arg)?.is_var()))
            }
            Expr::ListComprehension(comprehension)
            | Expr::GroupByComprehension { comprehension, .. } => {
                self.infer_subquery(expr, comprehension)
            }
            Expr::Aliased { expr, .. } => self.infer(expr),
        }
    }

    fn infer_column(&self, col: &ColumnRef) -> Result<Ty, TypeError> {
        if col.column.controllable {
            return Ok(Ty::IntVar);
        }
        if self.meta.is_view(&col.table) {
            return self.meta.type_of(&col.table, &col.column.name);
        }
        Ok(Ty::from_column_kind(col.column.kind))
    }

    fn infer_call(&self, expr: &Expr, function: Function, args: &[Expr]) -> Result<Ty, TypeError> {
        let unsupported = || TypeError::UnsupportedFunction {
            function,
            arity: args.len(),
            expr: expr.to_string(),
        };

        match args {
            [arg] => {
                let ty = self.infer(arg)?;
                match function {
                    Function::Sum | Function::Count => Ok(if ty.is_var() {
                        Ty::IntVar
                    } else {
                        Ty::Long
                    }),
                    Function::Max | Function::Min => Ok(ty),
                    Function::Any
                    | Function::All
                    | Function::AllEqual
                    | Function::AllDifferent
                    | Function::Increasing => Ok(Ty::bool_like(ty.is_var())),
                    Function::ScalarProduct | Function::CapacityConstraint => Err(unsupported()),
                }
            }
            [_, _] if function == Function::ScalarProduct => Ok(Ty::IntVar),
            [_, _, _, _] if function == Function::CapacityConstraint => Ok(Ty::BoolVar),
            _ => Err(unsupported()),
        }
    }

    /// A sub-query used as a value takes the type of its only projection.
    fn infer_subquery(&self, expr: &Expr, comprehension: &Comprehension) -> Result<Ty, TypeError> {
        match comprehension.head.select.as_slice() {
            [single] => {
                let ty = self.infer(single)?;
                warn!(subquery = %expr, ty = %ty, "sub-query typed by its single projection");
                Ok(ty)
            }
            select => Err(TypeError::AmbiguousSubqueryType {
                expr: expr.to_string(),
                fields: select.len(),
            }),
        }
    }
}

fn infer_literal(lit: &Literal) -> Result<Ty, TypeError> {
    match lit {
        Literal::String(_) => Ok(Ty::String),
        Literal::Int(_) => Ok(Ty::Integer),
        Literal::Bool(_) => Ok(Ty::Bool),
        Literal::Long(_) => Ok(Ty::Long),
        Literal::Float(_) | Literal::Null => Err(TypeError::UnsupportedLiteral {
            literal: lit.to_string(),
        }),
    }
}
