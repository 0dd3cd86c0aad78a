//! SQL-like rendering of expressions for diagnostics.

use std::fmt;

use crate::expr::{ColumnRef, Comprehension, Expr, Literal, Qualifier};
use crate::ops::UnaryOp;

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column.name)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Long(n) => write!(f, "{}L", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl Comprehension {
    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        write_list(f, &self.head.select, ", ")?;

        let tables: Vec<&str> = self
            .qualifiers
            .iter()
            .filter_map(|q| match q {
                Qualifier::Table(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        if !tables.is_empty() {
            write!(f, " FROM ")?;
            write_list(f, &tables, ", ")?;
        }

        let predicates: Vec<&Expr> = self
            .qualifiers
            .iter()
            .filter_map(|q| match q {
                Qualifier::Where(e) | Qualifier::Join(e) => Some(e),
                Qualifier::Table(_) => None,
            })
            .collect();
        if !predicates.is_empty() {
            write!(f, " WHERE ")?;
            write_list(f, &predicates, " AND ")?;
        }
        Ok(())
    }
}

impl fmt::Display for Comprehension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        self.fmt_body(f)?;
        write!(f, "]")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(col) => write!(f, "{}", col),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Unary { op: UnaryOp::Not, arg } => write!(f, "NOT {}", arg),
            Expr::Unary { op, arg } => write!(f, "{}{}", op, arg),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Call { function, args } => {
                write!(f, "{}(", function)?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::Exists(arg) => write!(f, "EXISTS({})", arg),
            Expr::IsNull(arg) => write!(f, "{} IS NULL", arg),
            Expr::IsNotNull(arg) => write!(f, "{} IS NOT NULL", arg),
            Expr::ListComprehension(comprehension) => write!(f, "{}", comprehension),
            Expr::GroupByComprehension {
                comprehension,
                group_by,
            } => {
                write!(f, "[")?;
                comprehension.fmt_body(f)?;
                write!(f, " GROUP BY ")?;
                write_list(f, group_by, ", ")?;
                write!(f, "]")
            }
            Expr::Aliased { expr, alias } => write!(f, "{} AS {}", expr, alias),
        }
    }
}

#[cfg(test)]
mod tests {
    use dcm_common::schema::{Column, ColumnKind};

    use crate::expr::{ColumnRef, Expr, Qualifier};
    use crate::ops::{BinaryOp, Function, UnaryOp};

    fn demand() -> Expr {
        Expr::column("pod_info", Column::new("demand", ColumnKind::Integer))
    }

    #[test]
    fn test_display_scalars() {
        insta::assert_snapshot!(
            Expr::binary(
                BinaryOp::Add,
                demand(),
                Expr::unary(UnaryOp::Minus, Expr::int(3))
            ),
            @"(pod_info.demand + -3)"
        );
        insta::assert_snapshot!(Expr::string("it's"), @"'it''s'");
        insta::assert_snapshot!(Expr::long(7), @"7L");
        insta::assert_snapshot!(Expr::unary(UnaryOp::Not, Expr::bool(true)), @"NOT true");
    }

    #[test]
    fn test_display_predicates_and_calls() {
        insta::assert_snapshot!(Expr::is_not_null(demand()), @"pod_info.demand IS NOT NULL");
        insta::assert_snapshot!(
            Expr::call(Function::Sum, vec![demand()]).aliased("TOTAL"),
            @"SUM(pod_info.demand) AS TOTAL"
        );
        insta::assert_snapshot!(Expr::exists(demand()), @"EXISTS(pod_info.demand)");
    }

    #[test]
    fn test_display_comprehensions() {
        let node = ColumnRef {
            table: "pod_info".into(),
            column: Column::new("node", ColumnKind::String),
        };
        let sub = Expr::group_by(
            vec![Expr::Column(node.clone()), Expr::call(Function::Sum, vec![demand()])],
            vec![
                Qualifier::Table("pod_info".into()),
                Qualifier::Where(Expr::binary(BinaryOp::GreaterThan, demand(), Expr::int(0))),
            ],
            vec![node],
        );
        insta::assert_snapshot!(
            sub,
            @"[SELECT pod_info.node, SUM(pod_info.demand) FROM pod_info WHERE (pod_info.demand > 0) GROUP BY pod_info.node]"
        );
    }
}
