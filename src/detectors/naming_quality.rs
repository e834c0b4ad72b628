//! Naming quality detector

use super::base::{AnalysisContext, Detector};
use crate::models::{Finding, FindingKind, Severity};
use crate::naming::{
    classify_convention, detect_naming_convention, is_generic_name, is_single_letter,
    NamingConvention,
};
use anyhow::Result;

/// Convention drift is only judged once a module has this many
/// classifiable names.
const MIN_NAMES_FOR_CONVENTION: usize = 3;

/// Flags meaningless function names and modules that mix naming
/// conventions.
#[derive(Debug, Default)]
pub struct NamingQualityDetector;

impl NamingQualityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for NamingQualityDetector {
    fn name(&self) -> &'static str {
        "NamingQualityDetector"
    }

    fn description(&self) -> &'static str {
        "Detects generic names, bare single letters, and mixed conventions"
    }

    fn category(&self) -> &'static str {
        "naming"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let exceptions = &ctx.config.naming_exceptions;
        let mut findings = Vec::new();

        for unit in ctx.production_units() {
            for function in &unit.facts.functions {
                if is_generic_name(&function.name) {
                    findings.push(
                        Finding::new(
                            self.name(),
                            FindingKind::NamingIssue,
                            Severity::Minor,
                            vec![unit.module_id.clone()],
                            format!(
                                "{} in {} says nothing about what it does",
                                function.name, unit.module_id
                            ),
                        )
                        .with_line(function.line)
                        .with_suggested_fix(format!(
                            "Rename {} after the action it performs",
                            function.name
                        )),
                    );
                } else if is_single_letter(&function.name, exceptions) {
                    findings.push(
                        Finding::new(
                            self.name(),
                            FindingKind::NamingIssue,
                            Severity::Minor,
                            vec![unit.module_id.clone()],
                            format!(
                                "single-letter function {} in {}",
                                function.name, unit.module_id
                            ),
                        )
                        .with_line(function.line),
                    );
                }
            }

            let classifiable: Vec<&str> = unit
                .facts
                .functions
                .iter()
                .map(|f| f.name.as_str())
                .filter(|name| classify_convention(name).is_some())
                .collect();
            if classifiable.len() >= MIN_NAMES_FOR_CONVENTION
                && detect_naming_convention(classifiable.iter().copied())
                    == NamingConvention::Mixed
            {
                findings.push(Finding::new(
                    self.name(),
                    FindingKind::NamingIssue,
                    Severity::Minor,
                    vec![unit.module_id.clone()],
                    format!("{} mixes naming conventions with no clear majority", unit.module_id),
                ));
            }
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
        NamingQualityDetector::new().detect(&ctx).unwrap()
    }

    #[test]
    fn test_generic_names_are_flagged() {
        let config = ScoreConfig::default();
        let findings = run(
            &[("app.py", "def process_data(req):\n    pass\n\ndef temp(val):\n    pass\n")],
            &config,
        );
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.kind == FindingKind::NamingIssue));
        assert!(findings[0].line.is_some());
    }

    #[test]
    fn test_exempt_letters_pass_others_fail() {
        let config = ScoreConfig::default();
        let findings = run(&[("math_util.py", "def x(v):\n    pass\n\ndef q(v):\n    pass\n")], &config);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("single-letter function q"));
    }

    #[test]
    fn test_mixed_conventions_flagged() {
        let config = ScoreConfig::default();
        let source = "def load_user(a):\n    pass\n\ndef fetchOrder(a):\n    pass\n\ndef SaveItem(a):\n    pass\n";
        let findings = run(&[("store.py", source)], &config);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("mixes naming conventions"));
    }

    #[test]
    fn test_consistent_module_is_clean() {
        let config = ScoreConfig::default();
        let source = "def load_user(a):\n    pass\n\ndef save_user(a):\n    pass\n\ndef delete_user(a):\n    pass\n";
        let findings = run(&[("store.py", source)], &config);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_test_units_are_skipped() {
        let config = ScoreConfig::default();
        let findings = run(
            &[("tests/test_app.py", "def test_handler():\n    data = 1\n    assert data\n")],
            &config,
        );
        assert!(findings.is_empty());
    }
}
