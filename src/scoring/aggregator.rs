//! Score aggregation
//!
//! [`Scorer`] turns extracted units, the dependency graph, and detector
//! findings into [`QualityReport`]s at repository, module, and file
//! scope. The pure pieces, [`calculate_weighted_score`] and
//! [`score_to_grade`], are exposed on their own so callers can rescore
//! a metric set under different weights without re-running analysis.

use crate::config::ScoreConfig;
use crate::detectors::{
    boundary_score, documentation_score, mock_call_ratio, pattern_consistency_score,
    test_coverage_ratio,
};
use crate::extract::SourceUnit;
use crate::graph::coupling::{calculate_coupling_metrics, mean_instability};
use crate::graph::DependencyGraph;
use crate::models::{
    sort_findings, Finding, FindingKind, FindingsSummary, Grade, MetricSet, QualityReport,
    ReportScope, Severity,
};
use crate::naming::average_name_quality;
use crate::scoring::{
    METRIC_BOUNDARY_SCORE, METRIC_COUPLING_QUALITY, METRIC_DEPENDENCY_HEALTH,
    METRIC_DOCUMENTATION_QUALITY, METRIC_NAMING_QUALITY, METRIC_PATTERN_CONSISTENCY,
    METRIC_TEST_HEALTH,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Minimum score for an A.
pub const GRADE_A_MIN: f64 = 90.0;
/// Minimum score for a B.
pub const GRADE_B_MIN: f64 = 80.0;
/// Minimum score for a C.
pub const GRADE_C_MIN: f64 = 70.0;
/// Minimum score for a D. Anything below is an F.
pub const GRADE_D_MIN: f64 = 60.0;

/// Score of a repository with nothing measurable and nothing wrong.
pub const PERFECT_SCORE: f64 = 100.0;

// Structural finding penalties on the 0-100 scale, before size scaling.
const PENALTY_CRITICAL: f64 = 10.0;
const PENALTY_MAJOR: f64 = 5.0;
const PENALTY_MINOR: f64 = 1.5;

/// Floor for the penalty divisor so one finding in a three-module
/// repository does not zero the dependency pillar.
const MIN_SIZE_FACTOR: f64 = 5.0;

/// Map a 0-100 score to its letter grade.
pub fn score_to_grade(score: f64) -> Grade {
    if score >= GRADE_A_MIN {
        Grade::A
    } else if score >= GRADE_B_MIN {
        Grade::B
    } else if score >= GRADE_C_MIN {
        Grade::C
    } else if score >= GRADE_D_MIN {
        Grade::D
    } else {
        Grade::F
    }
}

/// Weighted mean of the metrics, scaled to 0-100.
///
/// Metrics and weights are matched by name; entries present on only one
/// side do not participate. Both maps iterate in key order, so the sum
/// never depends on insertion order. An empty intersection (or an
/// all-zero one) scores [`PERFECT_SCORE`]: nothing measurable means
/// nothing wrong.
pub fn calculate_weighted_score(metrics: &MetricSet, weights: &BTreeMap<String, f64>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (name, value) in metrics.iter() {
        let Some(weight) = weights.get(name).copied() else {
            continue;
        };
        if weight <= 0.0 {
            continue;
        }
        weighted_sum += weight * value;
        weight_sum += weight;
    }
    if weight_sum <= 0.0 {
        return PERFECT_SCORE;
    }
    weighted_sum / weight_sum * 100.0
}

fn severity_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => PENALTY_CRITICAL,
        Severity::Major => PENALTY_MAJOR,
        Severity::Minor => PENALTY_MINOR,
    }
}

/// Finding kinds that damage the dependency pillar.
fn is_structural(kind: FindingKind) -> bool {
    matches!(
        kind,
        FindingKind::Cycle | FindingKind::GodModule | FindingKind::LayerViolation
    )
}

fn size_factor(module_count: usize) -> f64 {
    (module_count as f64).sqrt().max(MIN_SIZE_FACTOR)
}

/// Dependency pillar: start from perfect and subtract the size-scaled
/// penalty of every structural finding.
fn dependency_health(findings: &[Finding], module_count: usize) -> f64 {
    let penalty: f64 = findings
        .iter()
        .filter(|f| is_structural(f.kind))
        .map(|f| severity_penalty(f.severity))
        .sum();
    let scaled = penalty / size_factor(module_count);
    ((100.0 - scaled) / 100.0).max(0.0)
}

fn finding_touches(finding: &Finding, module_id: &str, path: Option<&str>) -> bool {
    finding
        .subjects
        .iter()
        .any(|s| s == module_id || path == Some(s.as_str()))
}

/// Computes metric sets and builds [`QualityReport`]s.
///
/// Borrows the analysis products rather than owning them, so one run of
/// extraction and detection can feed any number of reports.
pub struct Scorer<'a> {
    units: &'a [SourceUnit],
    graph: &'a DependencyGraph,
    config: &'a ScoreConfig,
}

impl<'a> Scorer<'a> {
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

    /// Score the whole repository.
    pub fn repository_report(&self, findings: &[Finding]) -> QualityReport {
        let production: Vec<&SourceUnit> =
            self.units.iter().filter(|u| u.is_production()).collect();
        let test_units: Vec<&SourceUnit> =
            self.units.iter().filter(|u| u.facts.is_test).collect();
        let known_paths = self.known_paths();

        let mut metrics = MetricSet::new();
        if self.graph.module_count() > 0 {
            metrics.insert(
                METRIC_DEPENDENCY_HEALTH,
                dependency_health(findings, self.graph.module_count()),
            );
            let coupling = calculate_coupling_metrics(self.graph);
            if let Some(mean) = mean_instability(&coupling) {
                metrics.insert(METRIC_COUPLING_QUALITY, 1.0 - mean);
            }
        }
        if let Some(naming) = average_name_quality(
            production.iter().flat_map(|u| u.facts.function_names()),
            &self.config.naming_exceptions,
        ) {
            metrics.insert(METRIC_NAMING_QUALITY, naming);
        }
        if let Some(docs) = documentation_score(&production) {
            metrics.insert(METRIC_DOCUMENTATION_QUALITY, docs);
        }
        if let Some(health) = self.test_health(&production, &test_units, &known_paths) {
            metrics.insert(METRIC_TEST_HEALTH, health);
        }
        if let Some(boundary) = boundary_score(self.graph) {
            metrics.insert(METRIC_BOUNDARY_SCORE, boundary);
        }
        if let Some(consistency) = pattern_consistency_score(&production) {
            metrics.insert(METRIC_PATTERN_CONSISTENCY, consistency);
        }

        self.build_report(ReportScope::Repository, metrics, findings.to_vec())
    }

    /// Score one module. `None` when the id matches no unit and no
    /// graph node.
    pub fn module_report(&self, module_id: &str, findings: &[Finding]) -> Option<QualityReport> {
        let unit = self.units.iter().find(|u| u.module_id == module_id);
        if unit.is_none() && !self.graph.contains(module_id) {
            return None;
        }
        let path = unit.map(|u| u.path.as_str());
        let scoped: Vec<Finding> = findings
            .iter()
            .filter(|f| finding_touches(f, module_id, path))
            .cloned()
            .collect();
        let metrics = self.scoped_metrics(unit, module_id, &scoped);
        Some(self.build_report(ReportScope::Module(module_id.to_string()), metrics, scoped))
    }

    /// Score one file. `None` when no unit was extracted from `path`.
    pub fn file_report(&self, path: &str, findings: &[Finding]) -> Option<QualityReport> {
        let unit = self.units.iter().find(|u| u.path == path)?;
        let scoped: Vec<Finding> = findings
            .iter()
            .filter(|f| finding_touches(f, &unit.module_id, Some(path)))
            .cloned()
            .collect();
        let metrics = self.scoped_metrics(Some(unit), &unit.module_id, &scoped);
        Some(self.build_report(ReportScope::File(path.to_string()), metrics, scoped))
    }

    fn known_paths(&self) -> BTreeSet<String> {
        self.units.iter().map(|u| u.path.clone()).collect()
    }

    /// Mean of test coverage and mock cleanliness, dropping whichever
    /// half has no data.
    fn test_health(
        &self,
        production: &[&SourceUnit],
        test_units: &[&SourceUnit],
        known_paths: &BTreeSet<String>,
    ) -> Option<f64> {
        let coverage = test_coverage_ratio(production, known_paths);
        let ratios: Vec<f64> = test_units
            .iter()
            .filter_map(|u| mock_call_ratio(&u.facts))
            .collect();
        let cleanliness = if ratios.is_empty() {
            None
        } else {
            Some(1.0 - ratios.iter().sum::<f64>() / ratios.len() as f64)
        };
        match (coverage, cleanliness) {
            (Some(c), Some(m)) => Some((c + m) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }

    /// Metric set for a single module or file.
    fn scoped_metrics(
        &self,
        unit: Option<&SourceUnit>,
        module_id: &str,
        scoped_findings: &[Finding],
    ) -> MetricSet {
        let mut metrics = MetricSet::new();

        if self.graph.contains(module_id) {
            metrics.insert(
                METRIC_DEPENDENCY_HEALTH,
                dependency_health(scoped_findings, 1),
            );
            let coupling = calculate_coupling_metrics(self.graph);
            if let Some(own) = coupling.iter().find(|m| m.module == module_id) {
                metrics.insert(METRIC_COUPLING_QUALITY, 1.0 - own.instability);
            }
        }

        let Some(unit) = unit else {
            return metrics;
        };

        if unit.is_production() {
            if let Some(naming) = average_name_quality(
                unit.facts.function_names(),
                &self.config.naming_exceptions,
            ) {
                metrics.insert(METRIC_NAMING_QUALITY, naming);
            }
            let scoped = [unit];
            if let Some(docs) = documentation_score(&scoped) {
                metrics.insert(METRIC_DOCUMENTATION_QUALITY, docs);
            }
            if let Some(coverage) = test_coverage_ratio(&scoped, &self.known_paths()) {
                metrics.insert(METRIC_TEST_HEALTH, coverage);
            }
        } else if let Some(ratio) = mock_call_ratio(&unit.facts) {
            metrics.insert(METRIC_TEST_HEALTH, 1.0 - ratio);
        }

        metrics
    }

    fn build_report(
        &self,
        scope: ReportScope,
        metrics: MetricSet,
        mut findings: Vec<Finding>,
    ) -> QualityReport {
        sort_findings(&mut findings);
        let score = calculate_weighted_score(&metrics, &self.config.weights.as_map());
        let grade = score_to_grade(score);
        let summary = FindingsSummary::from_findings(&findings);
        debug!(
            "Scored {}: {:.1} ({}) from {} metrics and {} findings",
            scope,
            score,
            grade,
            metrics.len(),
            findings.len()
        );
        QualityReport {
            scope,
            score,
            grade,
            metrics,
            findings,
            summary,
        }
    }
}
