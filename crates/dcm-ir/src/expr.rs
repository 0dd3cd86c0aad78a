//! Expression node variants.

use dcm_common::schema::Column;
use serde::{Deserialize, Serialize};

use crate::ops::{BinaryOp, Function, UnaryOp};

/// A reference to a column of a table or of a previously compiled view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Table or view name as written by the front end.
    pub table: String,
    pub column: Column,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    /// A whole number.
    Int(i32),
    Bool(bool),
    /// A wide integer.
    Long(i64),
    Float(f64),
    Null,
}

/// The projection of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub select: Vec<Expr>,
}

/// Everything after the projection: row sources and predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Qualifier {
    /// Iterate over the rows of a table or view.
    Table(String),
    Where(Expr),
    Join(Expr),
}

/// A sub-query: `[SELECT head FROM ... WHERE ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub head: Head,
    pub qualifiers: Vec<Qualifier>,
}

impl Comprehension {
    pub fn new(select: Vec<Expr>, qualifiers: Vec<Qualifier>) -> Self {
        Comprehension {
            head: Head { select },
            qualifiers,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
    Exists(Box<Expr>),
    IsNull(Box<Expr>),
    IsNotNull(Box<Expr>),
    ListComprehension(Comprehension),
    GroupByComprehension {
        comprehension: Comprehension,
        group_by: Vec<ColumnRef>,
    },
    /// An expression with an explicit output name (`expr AS alias`).
    Aliased {
        expr: Box<Expr>,
        alias: String,
    },
}

impl Expr {
    pub fn column(table: impl Into<String>, column: Column) -> Expr {
        Expr::Column(ColumnRef {
            table: table.into(),
            column,
        })
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn int(value: i32) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn long(value: i64) -> Expr {
        Expr::Literal(Literal::Long(value))
    }

    pub fn bool(value: bool) -> Expr {
        Expr::Literal(Literal::Bool(value))
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Expr {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Expr {
        Expr::Call { function, args }
    }

    pub fn exists(arg: Expr) -> Expr {
        Expr::Exists(Box::new(arg))
    }

    pub fn is_null(arg: Expr) -> Expr {
        Expr::IsNull(Box::new(arg))
    }

    pub fn is_not_null(arg: Expr) -> Expr {
        Expr::IsNotNull(Box::new(arg))
    }

    pub fn list_comprehension(select: Vec<Expr>, qualifiers: Vec<Qualifier>) -> Expr {
        Expr::ListComprehension(Comprehension::new(select, qualifiers))
    }

    pub fn group_by(
        select: Vec<Expr>,
        qualifiers: Vec<Qualifier>,
        group_by: Vec<ColumnRef>,
    ) -> Expr {
        Expr::GroupByComprehension {
            comprehension: Comprehension::new(select, qualifiers),
            group_by,
        }
    }

    /// Attach an output name. Re-aliasing replaces the previous alias.
    pub fn aliased(self, alias: impl Into<String>) -> Expr {
        Expr::Aliased {
            expr: Box::new(self.unaliased().clone()),
            alias: alias.into(),
        }
    }

    /// The explicit output name, if any.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Expr::Aliased { alias, .. } => Some(alias),
            _ => None,
        }
    }

    /// The expression without its alias wrapper(s).
    pub fn unaliased(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Aliased { expr: inner, .. } = expr {
            expr = inner;
        }
        expr
    }

    /// The column this expression is, if it is a bare column reference
    /// (possibly aliased).
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self.unaliased() {
            Expr::Column(col) => Some(col),
            _ => None,
        }
    }

    /// Every table or view name this expression reads from, in first-seen
    /// order without duplicates.
    pub fn referenced_tables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Column(col) => push_unique(out, &col.table),
            Expr::Literal(_) => {}
            Expr::Unary { arg, .. }
            | Expr::Exists(arg)
            | Expr::IsNull(arg)
            | Expr::IsNotNull(arg) => arg.collect_tables(out),
            Expr::Binary { left, right, .. } => {
                left.collect_tables(out);
                right.collect_tables(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_tables(out);
                }
            }
            Expr::ListComprehension(comprehension) => comprehension.collect_tables(out),
            Expr::GroupByComprehension {
                comprehension,
                group_by,
            } => {
                comprehension.collect_tables(out);
                for col in group_by {
                    push_unique(out, &col.table);
                }
            }
            Expr::Aliased { expr, .. } => expr.collect_tables(out),
        }
    }
}

impl Comprehension {
    fn collect_tables(&self, out: &mut Vec<String>) {
        for qualifier in &self.qualifiers {
            match qualifier {
                Qualifier::Table(name) => push_unique(out, name),
                Qualifier::Where(expr) | Qualifier::Join(expr) => expr.collect_tables(out),
            }
        }
        for expr in &self.head.select {
            expr.collect_tables(out);
        }
    }
}

fn push_unique(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|n| n == name) {
        out.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_common::schema::ColumnKind;

    fn uid() -> Expr {
        Expr::column("node_info", Column::new("uid", ColumnKind::String))
    }

    #[test]
    fn test_alias_accessors() {
        let expr = uid().aliased("U");
        assert_eq!(expr.alias(), Some("U"));
        assert_eq!(expr.unaliased(), &uid());
        assert_eq!(uid().alias(), None);
    }

    #[test]
    fn test_realias_replaces() {
        let expr = uid().aliased("A").aliased("B");
        assert_eq!(expr.alias(), Some("B"));
        assert_eq!(expr.unaliased(), &uid());
    }

    #[test]
    fn test_as_column() {
        assert!(uid().as_column().is_some());
        assert!(uid().aliased("U").as_column().is_some());
        assert!(Expr::call(Function::Count, vec![uid()]).as_column().is_none());
    }

    #[test]
    fn test_referenced_tables_dedups_in_order() {
        let demand = Expr::column("pod_info", Column::new("demand", ColumnKind::Integer));
        let sub = Expr::list_comprehension(
            vec![Expr::call(Function::Sum, vec![demand])],
            vec![
                Qualifier::Table("pod_info".into()),
                Qualifier::Table("spare".into()),
                Qualifier::Where(Expr::binary(BinaryOp::Equal, uid(), Expr::string("n1"))),
            ],
        );
        let expr = Expr::binary(BinaryOp::And, uid(), sub);
        assert_eq!(
            expr.referenced_tables(),
            vec!["node_info".to_string(), "pod_info".into(), "spare".into()]
        );
    }

    #[test]
    fn test_group_by_columns_are_referenced() {
        let key = ColumnRef {
            table: "assigned".into(),
            column: Column::new("node", ColumnKind::String),
        };
        let expr = Expr::group_by(vec![Expr::int(1)], vec![], vec![key]);
        assert_eq!(expr.referenced_tables(), vec!["assigned".to_string()]);
    }

    #[test]
    fn test_expr_json_roundtrip_keeps_structure() {
        let expr = Expr::call(Function::Sum, vec![uid()]).aliased("TOTAL");
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
