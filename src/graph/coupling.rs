//! Afferent and efferent coupling
//!
//! Classic Martin metrics over the module graph. Counts are distinct
//! neighbor modules, so an import edge and a call edge between the same
//! pair contribute one unit of coupling, not two.

use super::DependencyGraph;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Coupling numbers for one module. Instability is `Ce / (Ca + Ce)`,
/// `0.0` for an isolated module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleCoupling {
    pub module: String,
    /// Ca: modules depending on this one.
    pub afferent: usize,
    /// Ce: modules this one depends on.
    pub efferent: usize,
    pub instability: f64,
}

impl ModuleCoupling {
    pub fn total(&self) -> usize {
        self.afferent + self.efferent
    }
}

/// Compute Ca, Ce, and instability for every module, sorted by module id.
pub fn calculate_coupling_metrics(graph: &DependencyGraph) -> Vec<ModuleCoupling> {
    let inner = graph.inner();
    let mut metrics: Vec<ModuleCoupling> = inner
        .node_indices()
        .map(|index| {
            let afferent = graph.distinct_degree(index, Direction::Incoming);
            let efferent = graph.distinct_degree(index, Direction::Outgoing);
            let denominator = afferent + efferent;
            let instability = if denominator == 0 {
                0.0
            } else {
                efferent as f64 / denominator as f64
            };
            ModuleCoupling {
                module: inner[index].id.clone(),
                afferent,
                efferent,
                instability,
            }
        })
        .collect();

    metrics.sort_by(|a, b| a.module.cmp(&b.module));
    metrics
}

/// Mean instability across modules. `None` for an empty graph.
pub fn mean_instability(metrics: &[ModuleCoupling]) -> Option<f64> {
    if metrics.is_empty() {
        return None;
    }
    let sum: f64 = metrics.iter().map(|m| m.instability).sum();
    Some(sum / metrics.len() as f64)
}

/// Highest instability across modules. `None` for an empty graph.
pub fn max_instability(metrics: &[ModuleCoupling]) -> Option<f64> {
    metrics
        .iter()
        .map(|m| m.instability)
        .fold(None, |best, value| match best {
            Some(b) if b >= value => Some(b),
            _ => Some(value),
        })
}

/// Mean total coupling degree across modules. `None` for an empty graph.
pub fn mean_degree(metrics: &[ModuleCoupling]) -> Option<f64> {
    if metrics.is_empty() {
        return None;
    }
    let sum: usize = metrics.iter().map(ModuleCoupling::total).sum();
    Some(sum as f64 / metrics.len() as f64)
}
