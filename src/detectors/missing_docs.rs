//! Missing documentation detector
//!
//! Public functions are the contract a module offers, so an
//! undocumented public function is a gap regardless of how obvious its
//! body is. Private helpers are left alone.

use super::base::{AnalysisContext, Detector};
use crate::extract::{DocQuality, Language, SourceUnit};
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;

/// Modules with at least this many functions are expected to carry some
/// documentation somewhere.
const MODULE_DOC_MIN_FUNCTIONS: usize = 3;

fn doc_marker(language: Language) -> &'static str {
    match language {
        Language::Python => "a docstring",
        Language::Rust => "a /// comment",
        Language::JavaScript | Language::TypeScript => "a JSDoc block",
        Language::Go | Language::Java | Language::Unknown => "a leading comment",
    }
}

/// Mean documentation grade across production functions. `None` when
/// there are no functions to grade.
pub fn documentation_score(units: &[&SourceUnit]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for unit in units {
        for function in &unit.facts.functions {
            sum += function.doc.value();
            count += 1;
        }
    }
    (count > 0).then(|| sum / f64::from(count))
}

/// Flags undocumented public functions and modules with no documentation
/// at all.
#[derive(Debug, Default)]
pub struct MissingDocsDetector;

impl MissingDocsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for MissingDocsDetector {
    fn name(&self) -> &'static str {
        "MissingDocsDetector"
    }

    fn description(&self) -> &'static str {
        "Detects public functions and modules without documentation"
    }

    fn category(&self) -> &'static str {
        "documentation"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for unit in ctx.production_units() {
            for function in &unit.facts.functions {
                if !function.is_public
                    || function.doc != DocQuality::None
                    || function.name.starts_with("test")
                {
                    continue;
                }
                findings.push(
                    Finding::new(
                        self.name(),
                        FindingKind::DocGap,
                        Severity::Minor,
                        vec![unit.module_id.clone()],
                        format!(
                            "public function {} in {} has no documentation",
                            function.name, unit.module_id
                        ),
                    )
                    .with_line(function.line)
                    .with_suggested_fix(format!(
                        "Add {} describing what {} does and what it returns",
                        doc_marker(unit.language),
                        function.name
                    )),
                );
            }

            if unit.facts.functions.len() >= MODULE_DOC_MIN_FUNCTIONS && !unit.facts.has_docs {
                findings.push(Finding::new(
                    self.name(),
                    FindingKind::DocGap,
                    Severity::Minor,
                    vec![unit.module_id.clone()],
                    format!(
                        "{} declares {} functions and documents none of them",
                        unit.module_id,
                        unit.facts.functions.len()
                    ),
                ));
            }
        }

        Ok(findings)
    }
}
