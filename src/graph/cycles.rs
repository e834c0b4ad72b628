//! Cycle detection
//!
//! Strongly connected components come from Tarjan's algorithm; elementary
//! cycles inside each component are enumerated with a rank-bounded DFS and
//! capped per component, since a dense component can hold exponentially
//! many. Cycles are normalized to start at their lexicographically
//! smallest module, so output is deterministic.

use super::{DependencyEdge, DependencyGraph, ModuleNode};
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tracing::debug;

/// Enumeration stops after this many elementary cycles per component. The
/// component itself is still reported in full.
pub const MAX_CYCLES_PER_SCC: usize = 32;

/// True when the module graph has no dependency cycles.
pub fn is_acyclic(graph: &DependencyGraph) -> bool {
    !is_cyclic_directed(graph.inner())
}

/// Strongly connected components with more than one module, or a single
/// module with a self edge. Members sorted, components sorted by first
/// member.
pub fn strongly_connected_components(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let inner = graph.inner();
    let mut components: Vec<Vec<String>> = Vec::new();

    for scc in tarjan_scc(inner) {
        let cyclic = scc.len() > 1
            || (scc.len() == 1 && inner.find_edge(scc[0], scc[0]).is_some());
        if !cyclic {
            continue;
        }
        let mut members: Vec<String> = scc.iter().map(|&n| inner[n].id.clone()).collect();
        members.sort_unstable();
        components.push(members);
    }

    components.sort();
    components
}

/// Enumerate elementary dependency cycles as ordered module lists, each
/// rotated so its smallest module comes first. Bounded by
/// [`MAX_CYCLES_PER_SCC`] within each component.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let inner = graph.inner();
    let mut cycles: Vec<Vec<String>> = Vec::new();

    for scc in tarjan_scc(inner) {
        // Self edges are length-1 cycles wherever they sit.
        for &node in &scc {
            if inner.find_edge(node, node).is_some() {
                cycles.push(vec![inner[node].id.clone()]);
            }
        }
        if scc.len() > 1 {
            cycles.extend(enumerate_component_cycles(inner, &scc));
        }
    }

    cycles.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    cycles
}

struct CycleSearch<'a> {
    inner: &'a DiGraph<ModuleNode, DependencyEdge>,
    rank: FxHashMap<NodeIndex, usize>,
    found: BTreeSet<Vec<String>>,
    capped: bool,
}

fn enumerate_component_cycles(
    inner: &DiGraph<ModuleNode, DependencyEdge>,
    scc: &[NodeIndex],
) -> Vec<Vec<String>> {
    let mut ordered: Vec<NodeIndex> = scc.to_vec();
    ordered.sort_by(|&a, &b| inner[a].id.cmp(&inner[b].id));

    let rank: FxHashMap<NodeIndex, usize> = ordered
        .iter()
        .enumerate()
        .map(|(position, &node)| (node, position))
        .collect();

    let mut search = CycleSearch {
        inner,
        rank,
        found: BTreeSet::new(),
        capped: false,
    };

    // Cycles whose smallest member is `start` are found from `start` only,
    // so every elementary cycle appears exactly once.
    for (start_rank, &start) in ordered.iter().enumerate() {
        if search.capped {
            break;
        }
        let mut path = vec![start];
        let mut on_path: FxHashSet<NodeIndex> = FxHashSet::default();
        on_path.insert(start);
        search.explore(start, start_rank, start, &mut path, &mut on_path);
    }

    if search.capped {
        debug!(
            "Cycle enumeration capped at {} for a component of {} modules",
            MAX_CYCLES_PER_SCC,
            scc.len()
        );
    }
    search.found.into_iter().collect()
}

impl<'a> CycleSearch<'a> {
    fn explore(
        &mut self,
        start: NodeIndex,
        start_rank: usize,
        current: NodeIndex,
        path: &mut Vec<NodeIndex>,
        on_path: &mut FxHashSet<NodeIndex>,
    ) {
        if self.capped {
            return;
        }
        let inner: &'a DiGraph<ModuleNode, DependencyEdge> = self.inner;

        for next in inner.neighbors(current) {
            if self.capped {
                return;
            }
            if next == start && path.len() >= 2 {
                let cycle: Vec<String> = path.iter().map(|&n| inner[n].id.clone()).collect();
                self.found.insert(cycle);
                if self.found.len() >= MAX_CYCLES_PER_SCC {
                    self.capped = true;
                }
                continue;
            }
            let Some(&next_rank) = self.rank.get(&next) else {
                continue;
            };
            if next_rank <= start_rank || on_path.contains(&next) {
                continue;
            }
            path.push(next);
            on_path.insert(next);
            self.explore(start, start_rank, next, path, on_path);
            path.pop();
            on_path.remove(&next);
        }
    }
}
