//! Circular dependency detector

use super::base::{AnalysisContext, Detector};
use crate::graph::cycles::{detect_cycles, strongly_connected_components, MAX_CYCLES_PER_SCC};
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;
use std::collections::BTreeSet;

/// Cycles at or above this length are critical regardless of layering.
const CRITICAL_CYCLE_LEN: usize = 4;

/// Finds elementary dependency cycles and dependency tangles.
///
/// A short cycle between peers is major; a long cycle, or one that spans
/// declared layers, is critical. When a dense component has more
/// elementary cycles than the enumeration cap, the component itself is
/// reported so nothing is hidden by truncation.
#[derive(Debug, Default)]
pub struct CircularDependencyDetector;

impl CircularDependencyDetector {
    pub fn new() -> Self {
        Self
    }

    fn crosses_layers(cycle: &[String], ctx: &AnalysisContext) -> bool {
        let ranks: BTreeSet<u32> = cycle
            .iter()
            .filter_map(|module| super::layering::layer_of(module, &ctx.config.layer_map))
            .collect();
        ranks.len() > 1
    }
}

impl Detector for CircularDependencyDetector {
    fn name(&self) -> &'static str {
        "CircularDependencyDetector"
    }

    fn description(&self) -> &'static str {
        "Detects circular dependencies between modules"
    }

    fn category(&self) -> &'static str {
        "dependency_health"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let cycles = detect_cycles(ctx.graph);
        let mut findings = Vec::new();

        for cycle in &cycles {
            let severity = if cycle.len() >= CRITICAL_CYCLE_LEN
                || Self::crosses_layers(cycle, ctx)
            {
                Severity::Critical
            } else {
                Severity::Major
            };

            let mut rendered = cycle.join(" -> ");
            rendered.push_str(" -> ");
            rendered.push_str(&cycle[0]);

            findings.push(
                Finding::new(
                    self.name(),
                    FindingKind::Cycle,
                    severity,
                    cycle.clone(),
                    format!("Circular dependency: {rendered}"),
                )
                .with_suggested_fix(
                    "Break the cycle by moving the shared pieces into a module both sides can depend on"
                        .to_string(),
                ),
            );
        }

        // Components whose cycle enumeration hit the cap get a summary
        // finding so the full membership is visible.
        for component in strongly_connected_components(ctx.graph) {
            let members: BTreeSet<&str> = component.iter().map(String::as_str).collect();
            let enumerated = cycles
                .iter()
                .filter(|cycle| cycle.iter().all(|m| members.contains(m.as_str())))
                .count();
            if enumerated >= MAX_CYCLES_PER_SCC {
                findings.push(Finding::new(
                    self.name(),
                    FindingKind::Cycle,
                    Severity::Critical,
                    component.clone(),
                    format!(
                        "Dependency tangle of {} mutually reachable modules (cycle listing capped at {})",
                        component.len(),
                        MAX_CYCLES_PER_SCC
                    ),
                ));
            }
        }

        Ok(findings)
    }
}
