//! Core data models for the scoring engine.
//!
//! These models are used throughout the codebase for representing
//! findings, metrics, and quality reports.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Generate a deterministic finding ID based on content hash.
///
/// This ensures findings have stable IDs across runs, enabling:
/// - Tracking findings over time (fixed vs new vs recurring)
/// - Suppression by ID in config files
/// - Reliable deduplication
///
/// The ID is a 16-character hex string derived from hashing:
/// - detector name (which detector found it)
/// - primary subject (where it was found)
/// - line number (specific location, 0 when not line-anchored)
/// - message (what the issue is)
pub fn deterministic_finding_id(detector: &str, subject: &str, line: u32, message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{detector}\n{subject}\n{line}\n{message}").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// The kind of structural problem a finding describes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    Cycle,
    GodModule,
    LayerViolation,
    #[default]
    NamingIssue,
    DocGap,
    HighMockDensity,
    MissingTest,
    BoundarySmell,
    PatternDeviation,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FindingKind::Cycle => "cycle",
            FindingKind::GodModule => "god-module",
            FindingKind::LayerViolation => "layer-violation",
            FindingKind::NamingIssue => "naming-issue",
            FindingKind::DocGap => "doc-gap",
            FindingKind::HighMockDensity => "high-mock-density",
            FindingKind::MissingTest => "missing-test",
            FindingKind::BoundarySmell => "boundary-smell",
            FindingKind::PatternDeviation => "pattern-deviation",
        };
        write!(f, "{name}")
    }
}

/// A code quality issue surfaced by one of the detectors
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub detector: String,
    #[serde(default)]
    pub kind: FindingKind,
    #[serde(default)]
    pub severity: Severity,
    /// Module IDs or file paths the finding is about, in report order.
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

impl Finding {
    /// Build a finding with its deterministic ID filled in.
    pub fn new(
        detector: &str,
        kind: FindingKind,
        severity: Severity,
        subjects: Vec<String>,
        message: String,
    ) -> Self {
        let anchor = subjects.first().map(String::as_str).unwrap_or("");
        let id = deterministic_finding_id(detector, anchor, 0, &message);
        Finding {
            id,
            detector: detector.to_string(),
            kind,
            severity,
            subjects,
            message,
            line: None,
            suggested_fix: None,
        }
    }

    /// Attach a line anchor and recompute the ID so two findings on
    /// different lines of the same file stay distinct.
    pub fn with_line(mut self, line: u32) -> Self {
        let anchor = self.subjects.first().map(String::as_str).unwrap_or("");
        self.id = deterministic_finding_id(&self.detector, anchor, line, &self.message);
        self.line = Some(line);
        self
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Major => summary.major += 1,
                Severity::Minor => summary.minor += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Letter grade derived from a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{letter}")
    }
}

/// Named sub-scores in the 0.0..=1.0 range, keyed by metric name.
///
/// Backed by a `BTreeMap` so iteration order, weighted sums, and JSON
/// output are deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<String, f64>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric value, clamped to the 0.0..=1.0 range.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value.clamp(0.0, 1.0));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for MetricSet {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        let mut set = MetricSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// What a quality report covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "level", content = "target")]
pub enum ReportScope {
    Repository,
    Module(String),
    File(String),
}

impl std::fmt::Display for ReportScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportScope::Repository => write!(f, "repository"),
            ReportScope::Module(id) => write!(f, "module {id}"),
            ReportScope::File(path) => write!(f, "file {path}"),
        }
    }
}

/// Quality report for one scope: score, grade, metric breakdown, findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub scope: ReportScope,
    pub score: f64,
    pub grade: Grade,
    pub metrics: MetricSet,
    pub findings: Vec<Finding>,
    pub summary: FindingsSummary,
}

/// Order findings for reporting: most severe first, then by kind and
/// primary subject so equal-severity output is stable.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.subjects.cmp(&b.subjects))
    });
}
