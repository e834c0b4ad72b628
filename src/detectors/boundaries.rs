//! Service boundary detector
//!
//! Services are approximated by top-level directories, since strict
//! weakly-connected components never share an edge and so cannot be
//! compared for coupling. A service whose dependency traffic mostly
//! crosses its own line has no real boundary, and a module that
//! bypasses another service's surface to reach nested internals is
//! flagged individually.

use super::base::{AnalysisContext, Detector};
use crate::graph::DependencyGraph;
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet};

/// A service keeping less than this share of its touching edges internal
/// is a boundary smell.
const BOUNDARY_COHESION_MIN: f64 = 0.5;

/// Services touched by fewer edges than this are too small to judge.
const MIN_TOUCHING_EDGES: usize = 4;

/// Cross-service targets nested this many path segments deep (or more)
/// count as internals.
const DEEP_REACH_MIN_SEGMENTS: usize = 3;

/// Top-level path segment a module belongs to.
pub fn top_level_group(module_id: &str) -> &str {
    module_id.split('/').next().unwrap_or(module_id)
}

/// Share of dependency edges that stay inside their own top-level group.
///
/// 1.0 means perfectly separated services; `None` when the graph has no
/// edges to judge.
pub fn boundary_score(graph: &DependencyGraph) -> Option<f64> {
    let inner = graph.inner();
    let mut total = 0usize;
    let mut crossing = 0usize;
    for edge in inner.edge_references() {
        let from = inner[edge.source()].id.as_str();
        let to = inner[edge.target()].id.as_str();
        total += 1;
        if top_level_group(from) != top_level_group(to) {
            crossing += 1;
        }
    }
    if total == 0 {
        None
    } else {
        Some(1.0 - crossing as f64 / total as f64)
    }
}

/// Per-group edge statistics: edges inside the group and edges touching
/// it at either end.
#[derive(Debug, Default, Clone, Copy)]
struct GroupEdges {
    intra: usize,
    touching: usize,
}

/// Flags services with more outward than inward dependency traffic, and
/// modules that reach into another service's internals.
#[derive(Debug, Default)]
pub struct ServiceBoundaryDetector;

impl ServiceBoundaryDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for ServiceBoundaryDetector {
    fn name(&self) -> &'static str {
        "ServiceBoundaryDetector"
    }

    fn description(&self) -> &'static str {
        "Detects leaky service boundaries and deep reaches across them"
    }

    fn category(&self) -> &'static str {
        "coupling"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let inner = ctx.graph.inner();

        let mut group_sizes: BTreeMap<&str, usize> = BTreeMap::new();
        for node in inner.node_weights() {
            *group_sizes.entry(top_level_group(&node.id)).or_default() += 1;
        }

        let mut group_edges: BTreeMap<&str, GroupEdges> = BTreeMap::new();
        let mut deep_reaches: BTreeSet<(&str, &str)> = BTreeSet::new();

        for edge in inner.edge_references() {
            let from = inner[edge.source()].id.as_str();
            let to = inner[edge.target()].id.as_str();
            let from_group = top_level_group(from);
            let to_group = top_level_group(to);

            if from_group == to_group {
                let entry = group_edges.entry(from_group).or_default();
                entry.intra += 1;
                entry.touching += 1;
                continue;
            }
            group_edges.entry(from_group).or_default().touching += 1;
            group_edges.entry(to_group).or_default().touching += 1;
            if to.split('/').count() >= DEEP_REACH_MIN_SEGMENTS {
                deep_reaches.insert((from, to));
            }
        }

        let mut findings = Vec::new();

        for (group, edges) in &group_edges {
            if group_sizes.get(group).copied().unwrap_or(0) < 2
                || edges.touching < MIN_TOUCHING_EDGES
            {
                continue;
            }
            let cohesion = edges.intra as f64 / edges.touching as f64;
            if cohesion < BOUNDARY_COHESION_MIN {
                findings.push(
                    Finding::new(
                        self.name(),
                        FindingKind::BoundarySmell,
                        Severity::Minor,
                        vec![group.to_string()],
                        format!(
                            "service {} keeps only {} of {} dependency edges internal",
                            group, edges.intra, edges.touching
                        ),
                    )
                    .with_suggested_fix(format!(
                        "Pull the code {group} constantly reaches for inside it, or split {group} along its real seams"
                    )),
                );
            }
        }

        for (from, to) in deep_reaches {
            let to_group = top_level_group(to);
            findings.push(
                Finding::new(
                    self.name(),
                    FindingKind::BoundarySmell,
                    Severity::Minor,
                    vec![from.to_string(), to.to_string()],
                    format!("{from} reaches into the internals of {to_group} ({to})"),
                )
                .with_suggested_fix(format!(
                    "Depend on what {to_group} exposes at its top level instead of {to}"
                )),
            );
        }

        Ok(findings)
    }
}
