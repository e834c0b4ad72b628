//! Mock density detector
//!
//! A test suite that spends most of its calls on mocks exercises its
//! own wiring rather than the system under test. Density is the share
//! of call sites in a test file that hit mocking machinery.

use super::base::{AnalysisContext, Detector};
use crate::extract::FileFacts;
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;

/// Exact callee names that are mocking machinery without containing the
/// word.
const MOCK_INDICATORS: &[&str] = &["patch", "patch_object", "monkeypatch", "spy", "fake"];

/// Density at or above this is a major finding rather than a minor one.
const MOCK_DENSITY_MAJOR: f64 = 0.8;

/// True when a callee name belongs to mocking machinery.
pub fn is_mock_call(callee: &str) -> bool {
    if MOCK_INDICATORS.contains(&callee) {
        return true;
    }
    let lower = callee.to_lowercase();
    lower.contains("mock") || lower.contains("stub")
}

/// Share of call sites that are mock interactions, weighted by
/// occurrence count. `None` when the file makes no calls.
pub fn mock_call_ratio(facts: &FileFacts) -> Option<f64> {
    let total: u32 = facts.calls.values().sum();
    if total == 0 {
        return None;
    }
    let mocked: u32 = facts
        .calls
        .iter()
        .filter(|(callee, _)| is_mock_call(callee))
        .map(|(_, &count)| count)
        .sum();
    Some(f64::from(mocked) / f64::from(total))
}

/// Flags test modules whose call mix is dominated by mocks.
#[derive(Debug, Default)]
pub struct MockDensityDetector;

impl MockDensityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for MockDensityDetector {
    fn name(&self) -> &'static str {
        "MockDensityDetector"
    }

    fn description(&self) -> &'static str {
        "Detects test modules dominated by mock interactions"
    }

    fn category(&self) -> &'static str {
        "test_health"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let threshold = ctx.config.mock_density_threshold;
        let mut findings = Vec::new();

        for unit in ctx.test_units() {
            let total: u32 = unit.facts.calls.values().sum();
            if total < ctx.config.mock_min_calls {
                continue;
            }
            let Some(ratio) = mock_call_ratio(&unit.facts) else {
                continue;
            };
            if ratio <= threshold {
                continue;
            }

            let severity = if ratio >= MOCK_DENSITY_MAJOR {
                Severity::Major
            } else {
                Severity::Minor
            };
            findings.push(
                Finding::new(
                    self.name(),
                    FindingKind::HighMockDensity,
                    severity,
                    vec![unit.module_id.clone()],
                    format!(
                        "{:.0}% of calls in {} are mock interactions",
                        ratio * 100.0,
                        unit.module_id
                    ),
                )
                .with_suggested_fix(
                    "Exercise real collaborators where practical and reserve mocks for true externals"
                        .to_string(),
                ),
            );
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreConfig;
    use crate::extract::{extract_unit, SourceFile};
    use crate::graph::build_dependency_graph;

    fn run(files: &[(&str, &str)], config: &ScoreConfig) -> Vec<Finding> {
        let units: Vec<_> = files
            .iter()
            .map(|(path, text)| extract_unit(&SourceFile::new(*path, *text)))
            .collect();
        let graph = build_dependency_graph(&units);
        let ctx = AnalysisContext::new(&units, &graph, config);
        MockDensityDetector::new().detect(&ctx).unwrap()
    }

    #[test]
    fn test_mock_heavy_suite_is_flagged() {
        let source = "def test_checkout():\n    api = Mock()\n    db = MagicMock()\n    patch('svc.clock')\n    api.mock_calls()\n    stub_payment()\n    checkout(api, db)\n";
        let config = ScoreConfig::default();
        let findings = run(&[("tests/test_checkout.py", source)], &config);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::HighMockDensity);
        assert_eq!(findings[0].severity, Severity::Major);
    }

    #[test]
    fn test_balanced_suite_passes() {
        let source = "def test_checkout():\n    cart = build_cart()\n    add_item(cart)\n    add_item(cart)\n    total = price_cart(cart)\n    check_total(total)\n    fake_clock()\n";
        let config = ScoreConfig::default();
        let findings = run(&[("tests/test_checkout.py", source)], &config);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_tiny_suite_is_skipped() {
        let source = "def test_one():\n    m = Mock()\n    m2 = MagicMock()\n";
        let config = ScoreConfig::default();
        let findings = run(&[("tests/test_one.py", source)], &config);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_min_calls_gate_is_configurable() {
        // Four calls, three of them mocks: ratio 0.75 clears the density
        // threshold but the file sits under the default five-call gate.
        let source =
            "def test_refund():\n    api = Mock()\n    db = MagicMock()\n    stub_ledger()\n    refund(api)\n";

        let config = ScoreConfig::default();
        assert!(run(&[("tests/test_refund.py", source)], &config).is_empty());

        let mut low_gate = ScoreConfig::default();
        low_gate.mock_min_calls = 4;
        let findings = run(&[("tests/test_refund.py", source)], &low_gate);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Minor);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let source = "def test_checkout():\n    api = Mock()\n    db = MagicMock()\n    stub_payment()\n    checkout(api)\n    verify_total(api)\n    report_total(api)\n";
        let mut config = ScoreConfig::default();
        config.mock_density_threshold = 0.3;
        let findings = run(&[("tests/test_checkout.py", source)], &config);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Minor);
    }

    #[test]
    fn test_is_mock_call() {
        assert!(is_mock_call("Mock"));
        assert!(is_mock_call("MagicMock"));
        assert!(is_mock_call("mockImplementation"));
        assert!(is_mock_call("patch"));
        assert!(is_mock_call("stub_payment"));
        assert!(!is_mock_call("build_cart"));
        assert!(!is_mock_call("checkout"));
    }
}
