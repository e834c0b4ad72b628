//! Test coverage detector
//!
//! File-level correlation only: a production file counts as covered when
//! a conventionally named test file exists for it, or when it carries
//! inline tests. No execution, no line coverage.

use super::base::{AnalysisContext, Detector};
use crate::extract::test_files::{find_test_file_for, test_file_candidates};
use crate::extract::SourceUnit;
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;
use std::collections::BTreeSet;

fn is_covered(unit: &SourceUnit, known_paths: &BTreeSet<String>) -> bool {
    unit.facts.has_inline_tests || find_test_file_for(&unit.path, known_paths).is_some()
}

/// Share of production modules with declared functions that have a
/// matching test file or inline tests. `None` when there is nothing to
/// cover.
pub fn test_coverage_ratio(units: &[&SourceUnit], known_paths: &BTreeSet<String>) -> Option<f64> {
    let mut covered = 0u32;
    let mut total = 0u32;
    for unit in units {
        if unit.facts.functions.is_empty() {
            continue;
        }
        total += 1;
        if is_covered(unit, known_paths) {
            covered += 1;
        }
    }
    (total > 0).then(|| f64::from(covered) / f64::from(total))
}

/// Flags production modules that no test file pairs with.
#[derive(Debug, Default)]
pub struct TestCoverageDetector;

impl TestCoverageDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for TestCoverageDetector {
    fn name(&self) -> &'static str {
        "TestCoverageDetector"
    }

    fn description(&self) -> &'static str {
        "Detects production modules without a paired test file"
    }

    fn category(&self) -> &'static str {
        "test_health"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let known_paths = ctx.known_paths();
        let mut findings = Vec::new();

        for unit in ctx.production_units() {
            if unit.facts.functions.is_empty() || is_covered(unit, &known_paths) {
                continue;
            }

            let mut finding = Finding::new(
                self.name(),
                FindingKind::MissingTest,
                Severity::Minor,
                vec![unit.module_id.clone()],
                format!(
                    "{} declares {} functions and has no tests",
                    unit.module_id,
                    unit.facts.functions.len()
                ),
            );
            if let Some(candidate) = test_file_candidates(&unit.path).into_iter().next() {
                finding = finding.with_suggested_fix(format!("Start with {candidate}"));
            }
            findings.push(finding);
        }

        Ok(findings)
    }
}
