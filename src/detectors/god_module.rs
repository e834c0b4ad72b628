//! God module detector

use super::base::{AnalysisContext, Detector};
use crate::config::GodModuleRule;
use crate::graph::coupling::calculate_coupling_metrics;
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;

/// Flags modules whose combined fan-in and fan-out dwarfs the rest of
/// the codebase.
#[derive(Debug, Default)]
pub struct GodModuleDetector;

impl GodModuleDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for GodModuleDetector {
    fn name(&self) -> &'static str {
        "GodModuleDetector"
    }

    fn description(&self) -> &'static str {
        "Detects modules coupled to an outsized share of the codebase"
    }

    fn category(&self) -> &'static str {
        "dependency_health"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let metrics = calculate_coupling_metrics(ctx.graph);
        if metrics.is_empty() {
            return Ok(Vec::new());
        }

        let threshold = match ctx.config.god_module {
            GodModuleRule::Absolute(cap) => cap as f64,
            GodModuleRule::StdDev(sigma) => {
                let degrees: Vec<f64> = metrics.iter().map(|m| m.total() as f64).collect();
                let mean = degrees.iter().sum::<f64>() / degrees.len() as f64;
                let variance = degrees
                    .iter()
                    .map(|d| (d - mean).powi(2))
                    .sum::<f64>()
                    / degrees.len() as f64;
                (mean + sigma * variance.sqrt()).max(ctx.config.god_module_min_degree as f64)
            }
        };

        let mut findings = Vec::new();
        for coupling in &metrics {
            let degree = coupling.total() as f64;
            if degree > threshold {
                findings.push(
                    Finding::new(
                        self.name(),
                        FindingKind::GodModule,
                        Severity::Major,
                        vec![coupling.module.clone()],
                        format!(
                            "{} is coupled to {} modules ({} dependents, {} dependencies)",
                            coupling.module,
                            coupling.total(),
                            coupling.afferent,
                            coupling.efferent
                        ),
                    )
                    .with_suggested_fix(format!(
                        "Split {} by responsibility until no single module carries this much of the graph",
                        coupling.module
                    )),
                );
            }
        }

        Ok(findings)
    }
}
