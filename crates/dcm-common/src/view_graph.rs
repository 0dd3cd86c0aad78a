//! View dependency graph.
//!
//! A view may only be typed once every view its expressions read from has
//! been typed. [`ViewGraph`] records those edges and [`topological_sort`]
//! produces a registration order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::names::normalize_view_name;

/// Index of a view inside a [`ViewGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u32);

/// A view node and the views it reads from.
#[derive(Debug)]
pub struct ViewNode {
    /// Normalized view name.
    pub name: String,
    pub dependencies: Vec<ViewId>,
}

/// Returned when views depend on each other in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// View names forming the cycle, first name repeated at the end.
    pub cycle_path: Vec<String>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cycle_path.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

/// Views in insertion order plus a normalized-name index.
#[derive(Debug, Default)]
pub struct ViewGraph {
    pub views: Vec<ViewNode>,
    name_to_id: FxHashMap<String, ViewId>,
}

impl ViewGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view, returning its id. Adding the same name twice returns the
    /// existing id.
    pub fn add_view(&mut self, name: &str) -> ViewId {
        let key = normalize_view_name(name);
        if let Some(id) = self.name_to_id.get(&key) {
            return *id;
        }
        let id = ViewId(self.views.len() as u32);
        self.name_to_id.insert(key.clone(), id);
        self.views.push(ViewNode {
            name: key,
            dependencies: Vec::new(),
        });
        id
    }

    /// Find a view by name (normalized before lookup).
    pub fn resolve(&self, name: &str) -> Option<ViewId> {
        self.name_to_id.get(&normalize_view_name(name)).copied()
    }

    /// Record that `from` reads from `to`. Duplicate edges are ignored;
    /// self edges are kept so that a self-referencing view reports a cycle.
    pub fn add_dependency(&mut self, from: ViewId, to: ViewId) {
        let deps = &mut self.views[from.0 as usize].dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn get(&self, id: ViewId) -> &ViewNode {
        &self.views[id.0 as usize]
    }

    /// For every view, the views that read from it.
    fn readers(&self) -> Vec<Vec<ViewId>> {
        let mut readers = vec![Vec::new(); self.views.len()];
        for (i, view) in self.views.iter().enumerate() {
            for dep in &view.dependencies {
                readers[dep.0 as usize].push(ViewId(i as u32));
            }
        }
        readers
    }
}

/// Order views so that every view comes after the views it reads from.
///
/// Among the views whose dependencies are all placed, the alphabetically
/// smallest name goes next, so the order does not depend on declaration
/// order.
pub fn topological_sort(graph: &ViewGraph) -> Result<Vec<ViewId>, CycleError> {
    let readers = graph.readers();
    let mut unplaced: Vec<usize> = graph.views.iter().map(|v| v.dependencies.len()).collect();

    let mut ready: BinaryHeap<Reverse<(&str, ViewId)>> = graph
        .views
        .iter()
        .enumerate()
        .filter(|(_, v)| v.dependencies.is_empty())
        .map(|(i, v)| Reverse((v.name.as_str(), ViewId(i as u32))))
        .collect();

    let mut order = Vec::with_capacity(graph.views.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        order.push(id);
        for &reader in &readers[id.0 as usize] {
            let left = &mut unplaced[reader.0 as usize];
            *left -= 1;
            if *left == 0 {
                ready.push(Reverse((graph.get(reader).name.as_str(), reader)));
            }
        }
    }

    if order.len() == graph.views.len() {
        return Ok(order);
    }
    let stuck: Vec<bool> = unplaced.iter().map(|&n| n > 0).collect();
    Err(CycleError {
        cycle_path: find_cycle(graph, &stuck),
    })
}

/// Extract one cycle among the views that could not be placed.
///
/// Every stuck view still waits on some other stuck view, so following
/// those edges from any stuck view must revisit a view. The walk starts at
/// the alphabetically smallest stuck view.
fn find_cycle(graph: &ViewGraph, stuck: &[bool]) -> Vec<String> {
    let Some(mut current) = graph
        .views
        .iter()
        .enumerate()
        .filter(|(i, _)| stuck[*i])
        .min_by(|(_, a), (_, b)| a.name.cmp(&b.name))
        .map(|(i, _)| ViewId(i as u32))
    else {
        return Vec::new();
    };

    let mut path: Vec<ViewId> = Vec::new();
    let mut on_path: FxHashMap<ViewId, usize> = FxHashMap::default();
    loop {
        if let Some(&begin) = on_path.get(&current) {
            return path[begin..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|id| graph.get(*id).name.clone())
                .collect();
        }
        on_path.insert(current, path.len());
        path.push(current);

        match graph
            .get(current)
            .dependencies
            .iter()
            .find(|dep| stuck[dep.0 as usize])
        {
            Some(dep) => current = *dep,
            None => return path.iter().map(|id| graph.get(*id).name.clone()).collect(),
        }
    }
}
