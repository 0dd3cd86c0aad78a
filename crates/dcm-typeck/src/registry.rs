//! Tuple metadata registry.
//!
//! Records, for every table and every view, the type and the tuple position
//! of each field. Code generation reads it to emit positional, correctly
//! typed tuple accessors.
//!
//! Table scopes are keyed by the table name as given. View scopes (and view
//! field names) are keyed by their normalized name; see
//! [`dcm_common::names::normalize_view_name`]. Every scope is written once
//! and never changed afterwards.

use std::fmt;

use dcm_common::names::normalize_view_name;
use dcm_common::schema::Table;
use dcm_ir::Expr;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::TypeError;
use crate::infer::{column_type, Infer};
use crate::ty::{Ty, TypeList};

/// Whether a scope describes a base table or a derived view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Table,
    View,
}

/// Field metadata of one table or view.
#[derive(Clone, Debug, Default)]
struct Scope {
    /// Field names in position order.
    fields: Vec<String>,
    types: FxHashMap<String, Ty>,
    positions: FxHashMap<String, usize>,
}

impl Scope {
    /// Append a field at the next free position. Returns `false` if the
    /// field already exists.
    fn push(&mut self, field: String, ty: Ty) -> bool {
        if self.types.contains_key(&field) {
            return false;
        }
        self.positions.insert(field.clone(), self.fields.len());
        self.types.insert(field.clone(), ty);
        self.fields.push(field);
        true
    }

    fn tuple_type(&self) -> TypeList {
        self.fields.iter().map(|f| self.types[f]).collect()
    }
}

/// One field of a [`ScopeLayout`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    pub name: String,
    pub position: usize,
    pub ty: Ty,
}

/// The compiled tuple layout of a scope, fields in position order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeLayout {
    pub scope: String,
    pub kind: ScopeKind,
    pub fields: Vec<FieldLayout>,
}

impl fmt::Display for ScopeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.scope)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}@{}: {}", field.name, field.position, field.ty)?;
        }
        write!(f, ")")
    }
}

/// Per-compilation registry of tuple types and field positions.
///
/// Owned by one compilation unit. Registration takes `&mut self`; once all
/// scopes are registered the registry can be shared for reads.
#[derive(Clone, Debug, Default)]
pub struct TupleMetadata {
    tables: FxHashMap<String, Scope>,
    views: FxHashMap<String, Scope>,
    /// Registration order, for layout listings.
    order: Vec<(ScopeKind, String)>,
}

impl TupleMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tuple type of a base table, one field per column in
    /// column order.
    pub fn register_table(&mut self, table: &Table) -> Result<TypeList, TypeError> {
        if self.tables.contains_key(&table.name)
            || self.views.contains_key(&normalize_view_name(&table.name))
        {
            return Err(TypeError::ScopeAlreadyRegistered {
                scope: table.name.clone(),
            });
        }

        let mut scope = Scope::default();
        for column in &table.columns {
            if !scope.push(column.name.clone(), column_type(column)) {
                return Err(TypeError::DuplicateField {
                    scope: table.name.clone(),
                    field: column.name.clone(),
                });
            }
        }

        let tuple = scope.tuple_type();
        debug!(table = %table.name, fields = tuple.len(), tuple = %tuple, "registered table");
        self.tables.insert(table.name.clone(), scope);
        self.order.push((ScopeKind::Table, table.name.clone()));
        Ok(tuple)
    }

    /// Record the tuple type of a view from its output expressions.
    ///
    /// Each output is named by its alias, or by its column name when it is
    /// a bare column reference. Nothing is recorded if any output fails.
    pub fn register_view(&mut self, name: &str, exprs: &[Expr]) -> Result<TypeList, TypeError> {
        let key = normalize_view_name(name);
        if self.views.contains_key(&key) || self.names_table(&key) {
            return Err(TypeError::ScopeAlreadyRegistered { scope: key });
        }

        let mut scope = Scope::default();
        for expr in exprs {
            let field = output_field_name(&key, expr)?;
            let ty = self.infer(expr)?;
            trace!(view = %key, field = %field, ty = %ty, "typed view field");
            if !scope.push(field.clone(), ty) {
                return Err(TypeError::DuplicateField { scope: key, field });
            }
        }

        let tuple = scope.tuple_type();
        debug!(view = %key, fields = tuple.len(), tuple = %tuple, "registered view");
        self.views.insert(key.clone(), scope);
        self.order.push((ScopeKind::View, key));
        Ok(tuple)
    }

    /// Type an expression list without registering a scope.
    pub fn infer_tuple(&self, exprs: &[Expr]) -> Result<TypeList, TypeError> {
        exprs.iter().map(|e| self.infer(e)).collect()
    }

    /// Type a single expression against the scopes registered so far.
    pub fn infer(&self, expr: &Expr) -> Result<Ty, TypeError> {
        Infer::new(self).infer(expr)
    }

    pub fn type_of(&self, scope: &str, field: &str) -> Result<Ty, TypeError> {
        let (scope, field) = self.resolve(scope, field)?;
        Ok(scope.types[&field])
    }

    pub fn position_of(&self, scope: &str, field: &str) -> Result<usize, TypeError> {
        let (scope, field) = self.resolve(scope, field)?;
        Ok(scope.positions[&field])
    }

    /// Whether a view called `name` would take the name of a registered
    /// table.
    pub(crate) fn names_table(&self, name: &str) -> bool {
        let key = normalize_view_name(name);
        self.tables.keys().any(|t| normalize_view_name(t) == key)
    }

    /// Whether `name` is a registered view. Tables are never views.
    pub fn is_view(&self, name: &str) -> bool {
        self.views.contains_key(&normalize_view_name(name))
    }

    /// The layout of one scope.
    pub fn layout(&self, scope: &str) -> Result<ScopeLayout, TypeError> {
        if let Some(table) = self.tables.get(scope) {
            return Ok(build_layout(scope, ScopeKind::Table, table));
        }
        let key = normalize_view_name(scope);
        match self.views.get(&key) {
            Some(view) => Ok(build_layout(&key, ScopeKind::View, view)),
            None => Err(TypeError::UnknownScope {
                scope: scope.to_string(),
            }),
        }
    }

    /// Layouts of every scope in registration order.
    pub fn layouts(&self) -> Vec<ScopeLayout> {
        self.order
            .iter()
            .filter_map(|(kind, name)| {
                let scope = match kind {
                    ScopeKind::Table => self.tables.get(name),
                    ScopeKind::View => self.views.get(name),
                }?;
                Some(build_layout(name, *kind, scope))
            })
            .collect()
    }

    /// Find a scope and the key its field is stored under.
    fn resolve(&self, scope: &str, field: &str) -> Result<(&Scope, String), TypeError> {
        let (found, key, field_key) = match self.tables.get(scope) {
            Some(table) => (table, scope.to_string(), field.to_string()),
            None => {
                let key = normalize_view_name(scope);
                let view = self
                    .views
                    .get(&key)
                    .ok_or_else(|| TypeError::UnknownScope {
                        scope: scope.to_string(),
                    })?;
                (view, key, normalize_view_name(field))
            }
        };
        if !found.types.contains_key(&field_key) {
            return Err(TypeError::UnknownField {
                scope: key,
                field: field.to_string(),
            });
        }
        Ok((found, field_key))
    }
}

/// The field name a view output expression is stored under.
fn output_field_name(view: &str, expr: &Expr) -> Result<String, TypeError> {
    if let Some(alias) = expr.alias() {
        return Ok(normalize_view_name(alias));
    }
    match expr.as_column() {
        Some(col) => Ok(normalize_view_name(&col.column.name)),
        None => Err(TypeError::UnaliasedOutputField {
            view: view.to_string(),
            expr: expr.to_string(),
        }),
    }
}

fn build_layout(name: &str, kind: ScopeKind, scope: &Scope) -> ScopeLayout {
    ScopeLayout {
        scope: name.to_string(),
        kind,
        fields: scope
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| FieldLayout {
                name: field.clone(),
                position,
                ty: scope.types[field],
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_common::schema::{Column, ColumnKind};
    use dcm_ir::{BinaryOp, Function};

    fn node_info() -> Table {
        Table::new(
            "node_info",
            vec![
                Column::new("uid", ColumnKind::String),
                Column::new("ready", ColumnKind::Bool),
                Column::new("cpu_capacity", ColumnKind::Long),
            ],
        )
    }

    #[test]
    fn test_scope_push_rejects_duplicates() {
        let mut scope = Scope::default();
        assert!(scope.push("A".into(), Ty::Bool));
        assert!(!scope.push("A".into(), Ty::Integer));
        assert_eq!(scope.fields, vec!["A".to_string()]);
        assert_eq!(scope.types["A"], Ty::Bool);
    }

    #[test]
    fn test_register_table_returns_tuple_type() {
        let mut meta = TupleMetadata::new();
        let tuple = meta.register_table(&node_info()).unwrap();
        assert_eq!(tuple.to_string(), "String, Bool, Long");
        assert_eq!(meta.position_of("node_info", "cpu_capacity"), Ok(2));
    }

    #[test]
    fn test_table_lookup_is_case_sensitive() {
        let mut meta = TupleMetadata::new();
        meta.register_table(&node_info()).unwrap();
        assert!(matches!(
            meta.type_of("NODE_INFO", "uid"),
            Err(TypeError::UnknownScope { .. })
        ));
        assert!(matches!(
            meta.type_of("node_info", "UID"),
            Err(TypeError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_view_lookup_normalizes_scope_and_field() {
        let mut meta = TupleMetadata::new();
        meta.register_table(&node_info()).unwrap();
        let uid = Expr::column("node_info", Column::new("uid", ColumnKind::String));
        meta.register_view("ready_nodes", &[uid]).unwrap();

        assert_eq!(meta.type_of("READY_NODES", "UID"), Ok(Ty::String));
        assert_eq!(meta.type_of("ready_nodes", "uid"), Ok(Ty::String));
        assert_eq!(meta.position_of("Ready_Nodes", "Uid"), Ok(0));
        assert!(meta.is_view("ready_nodes"));
        assert!(!meta.is_view("node_info"));
    }

    #[test]
    fn test_failed_view_leaves_no_scope() {
        let mut meta = TupleMetadata::new();
        meta.register_table(&node_info()).unwrap();
        let uid = Expr::column("node_info", Column::new("uid", ColumnKind::String));
        let bad = Expr::binary(BinaryOp::Add, Expr::int(1), Expr::int(2));
        let err = meta.register_view("v", &[uid.clone(), bad]).unwrap_err();
        assert!(matches!(err, TypeError::UnaliasedOutputField { .. }));
        assert!(!meta.is_view("v"));
        // The name is still free.
        assert!(meta.register_view("v", &[uid]).is_ok());
    }

    #[test]
    fn test_duplicate_view_field() {
        let mut meta = TupleMetadata::new();
        let uid = Expr::column("node_info", Column::new("uid", ColumnKind::String));
        let err = meta
            .register_view("v", &[uid.clone(), Expr::int(1).aliased("uid")])
            .unwrap_err();
        assert_eq!(
            err,
            TypeError::DuplicateField {
                scope: "V".into(),
                field: "UID".into(),
            }
        );
    }

    #[test]
    fn test_view_may_not_shadow_table() {
        let mut meta = TupleMetadata::new();
        meta.register_table(&node_info()).unwrap();
        let err = meta
            .register_view("NODE_INFO", &[Expr::int(1).aliased("one")])
            .unwrap_err();
        assert_eq!(
            err,
            TypeError::ScopeAlreadyRegistered {
                scope: "NODE_INFO".into(),
            }
        );
    }

    #[test]
    fn test_layouts_in_registration_order() {
        let mut meta = TupleMetadata::new();
        meta.register_table(&node_info()).unwrap();
        let demand = Expr::column("pod_info", Column::new("demand", ColumnKind::Integer));
        meta.register_view(
            "totals",
            &[Expr::call(Function::Sum, vec![demand]).aliased("total")],
        )
        .unwrap();

        let rendered: Vec<String> = meta.layouts().iter().map(|l| l.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "node_info(uid@0: String, ready@1: Bool, cpu_capacity@2: Long)".to_string(),
                "TOTALS(TOTAL@0: Long)".to_string(),
            ]
        );
        assert_eq!(meta.layout("totals").unwrap().kind, ScopeKind::View);
    }
}
