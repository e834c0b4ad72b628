//! Base detector trait and types
//!
//! Core abstractions for quality detection: the `Detector` trait every
//! analyzer implements, the read-only `AnalysisContext` handed to each
//! run, and `DetectorResult` for capturing execution outcomes.

use crate::config::ScoreConfig;
use crate::extract::SourceUnit;
use crate::graph::DependencyGraph;
use crate::models::{Finding, Severity};
use anyhow::Result;
use std::collections::{BTreeSet, HashMap};

/// Everything a detector may read: extracted units, the built dependency
/// graph, and thresholds. Shared immutably across parallel detector runs.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub units: &'a [SourceUnit],
    pub graph: &'a DependencyGraph,
    pub config: &'a ScoreConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        units: &'a [SourceUnit],
        graph: &'a DependencyGraph,
        config: &'a ScoreConfig,
    ) -> Self {
        Self {
            units,
            graph,
            config,
        }
    }

    /// Units that are not test files.
    pub fn production_units(&self) -> impl Iterator<Item = &'a SourceUnit> {
        self.units.iter().filter(|u| u.is_production())
    }

    /// Units recognized as test files.
    pub fn test_units(&self) -> impl Iterator<Item = &'a SourceUnit> {
        self.units.iter().filter(|u| !u.is_production())
    }

    pub fn unit_by_module(&self, module_id: &str) -> Option<&'a SourceUnit> {
        self.units.iter().find(|u| u.module_id == module_id)
    }

    /// All input paths, for convention lookups.
    pub fn known_paths(&self) -> BTreeSet<String> {
        self.units.iter().map(|u| u.path.clone()).collect()
    }
}

/// Result from running a single detector
#[derive(Debug, Clone)]
pub struct DetectorResult {
    /// Name of the detector that produced these results
    pub detector_name: String,
    /// Findings produced by the detector
    pub findings: Vec<Finding>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Whether the detector completed successfully
    pub success: bool,
    /// Error message if the detector failed
    pub error: Option<String>,
}

impl DetectorResult {
    /// Create a successful result
    pub fn success(detector_name: String, findings: Vec<Finding>, duration_ms: u64) -> Self {
        Self {
            detector_name,
            findings,
            duration_ms,
            success: true,
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(detector_name: String, error: String, duration_ms: u64) -> Self {
        Self {
            detector_name,
            findings: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Trait for all quality detectors
///
/// Detectors read the analysis context and report findings. A detector
/// failure is recorded and skipped, never fatal to the run.
pub trait Detector: Send + Sync {
    /// Unique identifier for this detector (e.g. "GodModuleDetector")
    fn name(&self) -> &'static str;

    /// Human-readable description of what this detector finds
    fn description(&self) -> &'static str;

    /// Run detection and return findings
    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>>;

    /// Category of issues this detector finds
    ///
    /// Used for grouping findings in reports.
    fn category(&self) -> &'static str {
        "code_quality"
    }
}

/// Progress callback for detector execution
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Summary statistics from running all detectors
#[derive(Debug, Clone, Default)]
pub struct DetectionSummary {
    /// Total number of detectors run
    pub detectors_run: usize,
    /// Number of detectors that succeeded
    pub detectors_succeeded: usize,
    /// Number of detectors that failed
    pub detectors_failed: usize,
    /// Total findings across all detectors
    pub total_findings: usize,
    /// Findings by severity
    pub by_severity: HashMap<Severity, usize>,
    /// Total execution time in milliseconds
    pub total_duration_ms: u64,
}

impl DetectionSummary {
    /// Update summary with a detector result
    pub fn add_result(&mut self, result: &DetectorResult) {
        self.detectors_run += 1;
        self.total_duration_ms += result.duration_ms;

        if result.success {
            self.detectors_succeeded += 1;
            self.total_findings += result.findings.len();

            for finding in &result.findings {
                *self.by_severity.entry(finding.severity).or_insert(0) += 1;
            }
        } else {
            self.detectors_failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_unit, SourceFile};
    use crate::graph::build_dependency_graph;
    use crate::models::FindingKind;

    #[test]
    fn test_detector_result_success() {
        let result = DetectorResult::success("TestDetector".to_string(), vec![], 100);
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.duration_ms, 100);
    }

    #[test]
    fn test_detector_result_failure() {
        let result = DetectorResult::failure("TestDetector".to_string(), "oops".to_string(), 50);
        assert!(!result.success);
        assert_eq!(result.error, Some("oops".to_string()));
    }

    #[test]
    fn test_detection_summary() {
        let mut summary = DetectionSummary::default();

        let finding = Finding::new(
            "D1",
            FindingKind::NamingIssue,
            Severity::Minor,
            vec!["m".to_string()],
            "generic name".to_string(),
        );
        let result1 = DetectorResult::success("D1".to_string(), vec![finding], 100);
        let result2 = DetectorResult::failure("D2".to_string(), "err".to_string(), 50);

        summary.add_result(&result1);
        summary.add_result(&result2);

        assert_eq!(summary.detectors_run, 2);
        assert_eq!(summary.detectors_succeeded, 1);
        assert_eq!(summary.detectors_failed, 1);
        assert_eq!(summary.total_findings, 1);
        assert_eq!(summary.by_severity.get(&Severity::Minor), Some(&1));
        assert_eq!(summary.total_duration_ms, 150);
    }

    #[test]
    fn test_context_unit_partitions() {
        let units = vec![
            extract_unit(&SourceFile::new("src/app.py", "def run(): pass\n")),
            extract_unit(&SourceFile::new(
                "tests/test_app.py",
                "def test_run(): pass\n",
            )),
        ];
        let graph = build_dependency_graph(&units);
        let config = ScoreConfig::default();
        let ctx = AnalysisContext::new(&units, &graph, &config);

        assert_eq!(ctx.production_units().count(), 1);
        assert_eq!(ctx.test_units().count(), 1);
        assert!(ctx.unit_by_module("src/app").is_some());
        assert!(ctx.known_paths().contains("tests/test_app.py"));
    }
}
