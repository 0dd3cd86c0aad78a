//! Snapshot tests for rendered type resolution errors and layouts.
//!
//! Each test triggers one error through the public API and snapshots the
//! line a driver would print for it.

use dcm_common::schema::{Column, ColumnKind, Table};
use dcm_ir::{Expr, Function, Literal, Qualifier};
use dcm_typeck::{check, Program, TupleMetadata, TypeError, View};

// ── Helpers ────────────────────────────────────────────────────────────

fn render(err: &TypeError) -> String {
    format!("{}[{}]: {}", err.class(), err.code(), err)
}

fn pod_info() -> Table {
    Table::new(
        "pod_info",
        vec![
            Column::new("uid", ColumnKind::String),
            Column::controllable("node_name", ColumnKind::Integer),
            Column::new("demand", ColumnKind::Integer),
        ],
    )
}

fn demand() -> Expr {
    Expr::column("pod_info", Column::new("demand", ColumnKind::Integer))
}

fn registry() -> TupleMetadata {
    let mut meta = TupleMetadata::new();
    meta.register_table(&pod_info()).unwrap();
    meta
}

// ── User errors ────────────────────────────────────────────────────────

#[test]
fn test_diag_unaliased_output() {
    let err = registry()
        .register_view("totals", &[Expr::call(Function::Sum, vec![demand()])])
        .unwrap_err();
    insta::assert_snapshot!(
        render(&err),
        @"error[E0001]: non-column output fields must be aliased: `SUM(pod_info.demand)` in view `TOTALS`"
    );
}

#[test]
fn test_diag_duplicate_field() {
    let err = registry()
        .register_view("v", &[demand(), Expr::int(0).aliased("Demand")])
        .unwrap_err();
    insta::assert_snapshot!(
        render(&err),
        @"error[E0002]: field `DEMAND` appears more than once in `V`"
    );
}

#[test]
fn test_diag_ambiguous_subquery() {
    let sub = Expr::list_comprehension(
        vec![demand(), Expr::int(1)],
        vec![Qualifier::Table("pod_info".into())],
    );
    let err = registry().infer(&sub).unwrap_err();
    insta::assert_snapshot!(
        render(&err),
        @"error[E0003]: ambiguous tuple type for sub-query: expected 1 output field, found 2: [SELECT pod_info.demand, 1 FROM pod_info]"
    );
}

#[test]
fn test_diag_view_cycle() {
    let view = |name: &str, reads: &str| View {
        name: name.into(),
        select: vec![Expr::column(reads, Column::new("X", ColumnKind::Integer))],
    };
    let err = check(&Program {
        tables: vec![],
        views: vec![view("b", "c"), view("c", "b")],
    })
    .unwrap_err();
    insta::assert_snapshot!(render(&err), @"error[E0004]: views depend on each other: B -> C -> B");
}

// ── Internal errors ────────────────────────────────────────────────────

#[test]
fn test_diag_reregistered_table() {
    let err = registry().register_table(&pod_info()).unwrap_err();
    insta::assert_snapshot!(
        render(&err),
        @"internal compiler error[I0001]: scope `pod_info` is already registered"
    );
}

#[test]
fn test_diag_unknown_scope_and_field() {
    let meta = registry();
    insta::assert_snapshot!(
        render(&meta.type_of("node_info", "uid").unwrap_err()),
        @"internal compiler error[I0002]: unknown scope `node_info`"
    );
    insta::assert_snapshot!(
        render(&meta.position_of("pod_info", "cpu").unwrap_err()),
        @"internal compiler error[I0003]: scope `pod_info` has no field `cpu`"
    );
}

#[test]
fn test_diag_unsupported_literal_and_function() {
    let meta = registry();
    insta::assert_snapshot!(
        render(&meta.infer(&Expr::Literal(Literal::Null)).unwrap_err()),
        @"internal compiler error[I0004]: no type for literal `NULL`"
    );
    insta::assert_snapshot!(
        render(
            &meta
                .infer(&Expr::call(Function::Max, vec![demand(), demand()]))
                .unwrap_err()
        ),
        @"internal compiler error[I0005]: unsupported function `MAX` with 2 arguments: MAX(pod_info.demand, pod_info.demand)"
    );
}

// ── Layouts ────────────────────────────────────────────────────────────

#[test]
fn test_layout_rendering() {
    let mut meta = registry();
    meta.register_view(
        "per_pod",
        &[
            Expr::column("pod_info", Column::new("uid", ColumnKind::String)),
            Expr::call(
                Function::Sum,
                vec![Expr::column(
                    "pod_info",
                    Column::controllable("node_name", ColumnKind::Integer),
                )],
            )
            .aliased("placed"),
        ],
    )
    .unwrap();

    let rendered: Vec<String> = meta.layouts().iter().map(|l| l.to_string()).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    pod_info(uid@0: String, node_name@1: IntVar, demand@2: Integer)
    PER_POD(UID@0: String, PLACED@1: IntVar)
    ");
}
