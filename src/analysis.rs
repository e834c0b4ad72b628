//! End-to-end analysis pipeline
//!
//! One [`QualityAnalysis::run`] call takes source files through the full
//! pipeline: parallel fact extraction, a single-writer graph build, the
//! detector engine, and scoring. The products stay on the struct so
//! reports at repository, module, or file scope come from one analysis
//! pass. Running never fails; validating the configuration beforehand is
//! the only fallible step.

use crate::api_surface::{extract_api_contracts, ApiSignature};
use crate::config::ScoreConfig;
use crate::detectors::{create_engine, AnalysisContext, DetectionSummary};
use crate::extract::{extract_units, SourceFile, SourceUnit};
use crate::graph::{build_dependency_graph, DependencyGraph};
use crate::models::{Finding, QualityReport};
use crate::scoring::Scorer;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// A completed analysis run: extracted units, the dependency graph, and
/// every detector finding.
pub struct QualityAnalysis {
    config: ScoreConfig,
    units: Vec<SourceUnit>,
    graph: DependencyGraph,
    findings: Vec<Finding>,
    detection: DetectionSummary,
}

impl QualityAnalysis {
    /// Analyze a set of source files under the given configuration.
    pub fn run(files: &[SourceFile], config: &ScoreConfig) -> Self {
        let started = Instant::now();

        let units = extract_units(files, config.effective_workers());
        let graph = build_dependency_graph(&units);
        let engine = create_engine(config);
        let ctx = AnalysisContext::new(&units, &graph, config);
        let (findings, detection) = engine.run(&ctx);

        info!(
            "Analyzed {} files ({} modules, {} findings) in {:?}",
            files.len(),
            graph.module_count(),
            findings.len(),
            started.elapsed()
        );

        Self {
            config: config.clone(),
            units,
            graph,
            findings,
            detection,
        }
    }

    /// Score and grade for the whole repository.
    pub fn repository_report(&self) -> QualityReport {
        self.scorer().repository_report(&self.findings)
    }

    /// Report for one module. `None` when the id matches nothing.
    pub fn module_report(&self, module_id: &str) -> Option<QualityReport> {
        self.scorer().module_report(module_id, &self.findings)
    }

    /// Report for one input path. `None` when the path was not analyzed.
    pub fn file_report(&self, path: &str) -> Option<QualityReport> {
        self.scorer().file_report(path, &self.findings)
    }

    /// The module dependency graph, for callers that want to walk it.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// All findings, most severe first.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn detection_summary(&self) -> &DetectionSummary {
        &self.detection
    }

    /// Public function signatures per module.
    pub fn api_contracts(&self) -> BTreeMap<String, Vec<ApiSignature>> {
        extract_api_contracts(&self.units)
    }

    fn scorer(&self) -> Scorer<'_> {
        Scorer::new(&self.units, &self.graph, &self.config)
    }
}
