//! Whole-program driver.
//!
//! Registers every table, then every view in dependency order, and returns
//! the populated registry.

use dcm_common::names::normalize_view_name;
use dcm_common::schema::Table;
use dcm_common::view_graph::{topological_sort, ViewGraph, ViewId};
use dcm_ir::Expr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TypeError;
use crate::registry::TupleMetadata;

/// A named projection over tables and earlier views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub select: Vec<Expr>,
}

/// Schema facts plus the views of one compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub views: Vec<View>,
}

/// Type-check a program.
///
/// Views may be listed in any order; each one is registered after the views
/// it reads from. The first error aborts the whole program.
pub fn check(program: &Program) -> Result<TupleMetadata, TypeError> {
    let mut meta = TupleMetadata::new();
    for table in &program.tables {
        meta.register_table(table)?;
    }

    // A view named like a table would otherwise look like it reads itself.
    if let Some(view) = program.views.iter().find(|v| meta.names_table(&v.name)) {
        return Err(TypeError::ScopeAlreadyRegistered {
            scope: normalize_view_name(&view.name),
        });
    }

    let mut graph = ViewGraph::new();
    let mut by_id: Vec<&View> = Vec::with_capacity(program.views.len());
    for view in &program.views {
        let id = graph.add_view(&view.name);
        if graph.view_count() == by_id.len() {
            return Err(TypeError::ScopeAlreadyRegistered {
                scope: graph.get(id).name.clone(),
            });
        }
        by_id.push(view);
    }

    for (i, view) in program.views.iter().enumerate() {
        let from = ViewId(i as u32);
        for expr in &view.select {
            for name in expr.referenced_tables() {
                if let Some(to) = graph.resolve(&name) {
                    graph.add_dependency(from, to);
                }
            }
        }
    }

    let order = topological_sort(&graph).map_err(|e| TypeError::ViewCycle {
        cycle: e.cycle_path,
    })?;

    for id in order {
        let view = by_id[id.0 as usize];
        debug!(view = %view.name, "typing view");
        meta.register_view(&view.name, &view.select)?;
    }
    Ok(meta)
}
