//! Module dependency graph
//!
//! Directed graph over module identifiers with merged, weighted,
//! kind-tagged edges. Construction is two-pass: every unit becomes a node,
//! then imports and calls become edges. References that cannot be resolved
//! to exactly one module in the analyzed set are dropped, never guessed.
//! Build time stays linear in units plus references; suffix resolution
//! runs against a precomputed index.

pub mod coupling;
pub mod cycles;

use crate::extract::SourceUnit;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// Why one module depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Imports,
    Calls,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Imports => f.write_str("imports"),
            DependencyKind::Calls => f.write_str("calls"),
        }
    }
}

/// Merged edge: one per (from, to, kind), weight accumulating repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub kind: DependencyKind,
    pub weight: u32,
}

/// Node payload for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: String,
    pub path: String,
    pub is_test: bool,
}

/// The built graph plus lookup indexes.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<ModuleNode, DependencyEdge>,
    by_id: FxHashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.by_id.contains_key(module_id)
    }

    pub fn node_index(&self, module_id: &str) -> Option<NodeIndex> {
        self.by_id.get(module_id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &ModuleNode {
        &self.graph[index]
    }

    /// Module identifiers in sorted order.
    pub fn module_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.graph.node_weights().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Modules this one depends on, sorted and distinct.
    pub fn dependencies_of(&self, module_id: &str) -> Vec<&str> {
        self.neighbor_ids(module_id, Direction::Outgoing)
    }

    /// Modules that depend on this one, sorted and distinct.
    pub fn dependents_of(&self, module_id: &str) -> Vec<&str> {
        self.neighbor_ids(module_id, Direction::Incoming)
    }

    fn neighbor_ids(&self, module_id: &str, direction: Direction) -> Vec<&str> {
        let Some(index) = self.node_index(module_id) else {
            return Vec::new();
        };
        let ids: BTreeSet<&str> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].id.as_str())
            .collect();
        ids.into_iter().collect()
    }

    /// Distinct neighbor count in one direction.
    pub fn distinct_degree(&self, index: NodeIndex, direction: Direction) -> usize {
        let neighbors: BTreeSet<NodeIndex> =
            self.graph.neighbors_directed(index, direction).collect();
        neighbors.len()
    }

    pub fn edge_between(
        &self,
        from: &str,
        to: &str,
        kind: DependencyKind,
    ) -> Option<&DependencyEdge> {
        let (from, to) = (self.node_index(from)?, self.node_index(to)?);
        self.graph
            .edges_connecting(from, to)
            .find(|e| e.weight().kind == kind)
            .map(|e| e.weight())
    }

    pub(crate) fn inner(&self) -> &DiGraph<ModuleNode, DependencyEdge> {
        &self.graph
    }

    /// Deterministic JSON export: sorted nodes, sorted edges.
    pub fn to_json(&self) -> serde_json::Value {
        let mut nodes: Vec<&ModuleNode> = self.graph.node_weights().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<serde_json::Value> = self
            .graph
            .edge_references()
            .map(|e| {
                json!({
                    "from": self.graph[e.source()].id,
                    "to": self.graph[e.target()].id,
                    "kind": e.weight().kind.to_string(),
                    "weight": e.weight().weight,
                })
            })
            .collect();
        edges.sort_by(|a, b| {
            let key = |v: &serde_json::Value| {
                (
                    v["from"].as_str().unwrap_or("").to_string(),
                    v["to"].as_str().unwrap_or("").to_string(),
                    v["kind"].as_str().unwrap_or("").to_string(),
                )
            };
            key(a).cmp(&key(b))
        });

        json!({ "nodes": nodes, "edges": edges })
    }
}

/// Incremental builder used by [`build_dependency_graph`]. Single writer:
/// the graph is immutable once built.
struct GraphBuilder {
    graph: DiGraph<ModuleNode, DependencyEdge>,
    by_id: FxHashMap<String, NodeIndex>,
    /// Path suffix (segment-aligned) to candidate nodes.
    by_suffix: FxHashMap<String, Vec<NodeIndex>>,
    /// Declared function name to declaring nodes.
    by_function: FxHashMap<String, Vec<NodeIndex>>,
    /// (from, to, kind) to existing edge, for merging.
    edge_index: FxHashMap<(NodeIndex, NodeIndex, DependencyKind), EdgeIndex>,
}

impl GraphBuilder {
    fn new(capacity: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(capacity, capacity * 2),
            by_id: FxHashMap::default(),
            by_suffix: FxHashMap::default(),
            by_function: FxHashMap::default(),
            edge_index: FxHashMap::default(),
        }
    }

    fn add_module(&mut self, unit: &SourceUnit) {
        if let Some(&existing) = self.by_id.get(&unit.module_id) {
            warn!(
                "Duplicate module id '{}' ({} shadows {}), keeping first occurrence",
                unit.module_id, unit.path, self.graph[existing].path
            );
            return;
        }

        let index = self.graph.add_node(ModuleNode {
            id: unit.module_id.clone(),
            path: unit.path.clone(),
            is_test: unit.facts.is_test,
        });
        self.by_id.insert(unit.module_id.clone(), index);

        for suffix in path_suffixes(&unit.module_id) {
            self.by_suffix.entry(suffix).or_default().push(index);
        }
        for name in unit.facts.function_names() {
            self.by_function
                .entry(name.to_string())
                .or_default()
                .push(index);
        }
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: DependencyKind, weight: u32) {
        match self.edge_index.get(&(from, to, kind)) {
            Some(&edge) => {
                self.graph[edge].weight += weight;
            }
            None => {
                let edge = self.graph.add_edge(from, to, DependencyEdge { kind, weight });
                self.edge_index.insert((from, to, kind), edge);
            }
        }
    }

    /// Resolve an import reference from `importer_dir` to exactly one
    /// module, or `None`. A reference that names an item inside a module
    /// (`models/Finding`) falls back to the module itself.
    ///
    /// A reference that spells out the importer's own id is a genuine
    /// self loop and is kept. A reference that only lands on the importer
    /// through suffix or parent fallback is an item reference to its own
    /// module, not a dependency.
    fn resolve_import(
        &self,
        reference: &str,
        importer_dir: &str,
        importer: NodeIndex,
    ) -> Option<NodeIndex> {
        let (candidate, exact_only) = if reference.starts_with("./") || reference.starts_with("../")
        {
            (join_relative(importer_dir, reference)?, true)
        } else {
            (reference.to_string(), false)
        };

        if self.by_id.get(&candidate).copied() == Some(importer) {
            return Some(importer);
        }
        self.lookup_with_variants(&candidate, exact_only)
            .or_else(|| self.lookup_parent(&candidate, exact_only))
            .filter(|&resolved| resolved != importer)
    }

    fn lookup_parent(&self, reference: &str, exact_only: bool) -> Option<NodeIndex> {
        let idx = reference.rfind('/')?;
        self.lookup_with_variants(&reference[..idx], exact_only)
    }

    fn lookup_with_variants(&self, candidate: &str, exact_only: bool) -> Option<NodeIndex> {
        for variant in [
            candidate.to_string(),
            format!("{candidate}/mod"),
            format!("{candidate}/index"),
            format!("{candidate}/__init__"),
        ] {
            if let Some(&index) = self.by_id.get(&variant) {
                return Some(index);
            }
            if exact_only {
                continue;
            }
            match self.by_suffix.get(&variant).map(Vec::as_slice) {
                Some([single]) => return Some(*single),
                Some(many) if many.len() > 1 => {
                    debug!(
                        "Import '{}' is ambiguous across {} modules, dropping",
                        candidate,
                        many.len()
                    );
                    return None;
                }
                _ => {}
            }
        }
        None
    }

    /// Resolve a callee name: the one module other than the caller that
    /// declares it. Local declarations win; ambiguity drops the edge.
    fn resolve_call(&self, callee: &str, caller: NodeIndex) -> Option<NodeIndex> {
        let declaring = self.by_function.get(callee)?;
        if declaring.contains(&caller) {
            return None;
        }
        match declaring.as_slice() {
            [single] => Some(*single),
            many => {
                debug!(
                    "Call '{}' is declared by {} modules, dropping",
                    callee,
                    many.len()
                );
                None
            }
        }
    }
}

/// Build the dependency graph for a set of extracted units.
///
/// Pass one registers every module. Pass two resolves imports and calls
/// into merged edges. An import that names its own module id becomes a
/// self loop; calls to local declarations never become edges.
pub fn build_dependency_graph(units: &[SourceUnit]) -> DependencyGraph {
    let mut builder = GraphBuilder::new(units.len());

    for unit in units {
        builder.add_module(unit);
    }

    let mut dropped = 0usize;
    for unit in units {
        let Some(from) = builder.by_id.get(&unit.module_id).copied() else {
            continue;
        };
        if builder.graph[from].path != unit.path {
            // Shadowed duplicate; its references would be misattributed.
            continue;
        }
        let importer_dir = parent_dir(&unit.module_id);

        for reference in &unit.facts.imports {
            match builder.resolve_import(reference, importer_dir, from) {
                Some(to) => builder.add_edge(from, to, DependencyKind::Imports, 1),
                None => dropped += 1,
            }
        }

        for (callee, &count) in &unit.facts.calls {
            match builder.resolve_call(callee, from) {
                Some(to) => builder.add_edge(from, to, DependencyKind::Calls, count),
                None => dropped += 1,
            }
        }
    }

    debug!(
        "Graph built: {} modules, {} edges, {} unresolved references dropped",
        builder.graph.node_count(),
        builder.graph.edge_count(),
        dropped
    );

    DependencyGraph {
        graph: builder.graph,
        by_id: builder.by_id,
    }
}

fn parent_dir(module_id: &str) -> &str {
    match module_id.rfind('/') {
        Some(idx) => &module_id[..idx],
        None => "",
    }
}

/// All segment-aligned suffixes of a module id: `a/b/c` yields `c`, `b/c`,
/// `a/b/c`.
fn path_suffixes(module_id: &str) -> Vec<String> {
    let segments: Vec<&str> = module_id.split('/').collect();
    (0..segments.len())
        .map(|start| segments[start..].join("/"))
        .collect()
}

/// Join a `./` or `../` reference against a directory. Traversal above the
/// root is unresolvable.
fn join_relative(dir: &str, reference: &str) -> Option<String> {
    let mut stack: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };

    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        None
    } else {
        Some(stack.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_unit, SourceFile};

    fn units(files: &[(&str, &str)]) -> Vec<SourceUnit> {
        files
            .iter()
            .map(|(path, text)| extract_unit(&SourceFile::new(*path, *text)))
            .collect()
    }

    #[test]
    fn test_import_edges_resolve() {
        let units = units(&[
            ("app/main.py", "from app.service import run\n"),
            ("app/service.py", "def run(): pass\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.module_count(), 2);
        assert!(graph
            .edge_between("app/main", "app/service", DependencyKind::Imports)
            .is_some());
    }

    #[test]
    fn test_relative_import_resolution() {
        let units = units(&[
            ("pkg/sub/worker.py", "from ..shared.types import Kind\n"),
            ("pkg/shared/types.py", "class Kind: pass\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert!(graph
            .edge_between("pkg/sub/worker", "pkg/shared/types", DependencyKind::Imports)
            .is_some());
    }

    #[test]
    fn test_unresolvable_imports_dropped() {
        let units = units(&[("app/main.py", "import os\nimport requests\n")]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.module_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_ambiguous_suffix_dropped() {
        let units = units(&[
            ("a/util.py", "def helper_a(): pass\n"),
            ("b/util.py", "def helper_b(): pass\n"),
            ("main.py", "import util\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_call_edges_weighted_and_merged() {
        let units = units(&[
            (
                "app/main.py",
                "from app.work import run_job\n\ndef main():\n    run_job()\n    run_job()\n",
            ),
            ("app/work.py", "def run_job(): pass\n"),
        ]);
        let graph = build_dependency_graph(&units);
        let calls = graph
            .edge_between("app/main", "app/work", DependencyKind::Calls)
            .copied();
        assert_eq!(calls.map(|e| e.weight), Some(2));
        // The import edge lives alongside the call edge.
        assert!(graph
            .edge_between("app/main", "app/work", DependencyKind::Imports)
            .is_some());
    }

    #[test]
    fn test_self_calls_never_create_edges() {
        let units = units(&[(
            "app/solo.py",
            "def helper(): pass\n\ndef main():\n    helper()\n",
        )]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_exact_self_import_becomes_self_loop() {
        let units = units(&[("pkg/util.py", "import pkg.util\n")]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph
            .edge_between("pkg/util", "pkg/util", DependencyKind::Imports)
            .is_some());
    }

    #[test]
    fn test_own_item_import_is_not_a_self_loop() {
        // graph/mod.rs referencing one of its own items resolves to the
        // importer only through the parent fallback.
        let units = units(&[("src/graph/mod.rs", "use crate::graph::NodeIndex;\n")]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_ambiguous_call_dropped() {
        let units = units(&[
            ("a.py", "def setup(): pass\n"),
            ("b.py", "def setup(): pass\n"),
            ("main.py", "setup()\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_rust_mod_and_use_resolution() {
        let units = units(&[
            ("src/lib.rs", "mod scoring;\nmod naming;\n"),
            ("src/scoring/mod.rs", "use crate::naming::grade;\n"),
            ("src/naming.rs", "pub fn grade() {}\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert!(graph
            .edge_between("src/lib", "src/scoring/mod", DependencyKind::Imports)
            .is_some());
        assert!(graph
            .edge_between("src/lib", "src/naming", DependencyKind::Imports)
            .is_some());
        assert!(graph
            .edge_between("src/scoring/mod", "src/naming", DependencyKind::Imports)
            .is_some());
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let units = units(&[
            ("a.py", "import b\nimport c\n"),
            ("b.py", ""),
            ("c.py", "import b\n"),
        ]);
        let graph = build_dependency_graph(&units);
        assert_eq!(graph.dependencies_of("a"), vec!["b", "c"]);
        assert_eq!(graph.dependents_of("b"), vec!["a", "c"]);
        assert!(graph.dependencies_of("missing").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let graph = build_dependency_graph(&[]);
        assert_eq!(graph.module_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_json_export_shape() {
        let units = units(&[("a.py", "import b\n"), ("b.py", "")]);
        let graph = build_dependency_graph(&units);
        let value = graph.to_json();
        assert_eq!(value["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["edges"][0]["from"], "a");
        assert_eq!(value["edges"][0]["to"], "b");
        assert_eq!(value["edges"][0]["kind"], "imports");
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("a/b", "./c"), Some("a/b/c".to_string()));
        assert_eq!(join_relative("a/b", "../c"), Some("a/c".to_string()));
        assert_eq!(join_relative("a", "../../c"), None);
        assert_eq!(join_relative("", "./c"), Some("c".to_string()));
    }
}
