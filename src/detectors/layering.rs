//! Layer violation detector
//!
//! Layers come from the configured `layer_map`, which assigns a rank to
//! a path prefix (larger rank = higher layer). An edge from a lower
//! layer into a higher one is a violation: infrastructure reaching up
//! into the UI, storage importing handlers, and so on. Modules outside
//! every configured prefix are not judged.

use super::base::{AnalysisContext, Detector};
use crate::models::{Finding, FindingKind, Severity};
use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolves a module to its layer rank via the longest matching prefix.
///
/// Prefixes match on whole path segments, so `api` covers `api/routes`
/// but not `apiclient`.
pub fn layer_of(module: &str, layer_map: &BTreeMap<String, u32>) -> Option<u32> {
    let mut best: Option<(usize, u32)> = None;
    for (prefix, rank) in layer_map {
        let matches = module == prefix
            || module
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        if matches {
            match best {
                Some((len, _)) if len >= prefix.len() => {}
                _ => best = Some((prefix.len(), *rank)),
            }
        }
    }
    best.map(|(_, rank)| rank)
}

/// Flags dependency edges that point from a lower layer into a higher one.
#[derive(Debug, Default)]
pub struct LayerViolationDetector;

impl LayerViolationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for LayerViolationDetector {
    fn name(&self) -> &'static str {
        "LayerViolationDetector"
    }

    fn description(&self) -> &'static str {
        "Detects dependencies that point against the configured layering"
    }

    fn category(&self) -> &'static str {
        "dependency_health"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let layer_map = &ctx.config.layer_map;
        if layer_map.is_empty() {
            return Ok(Vec::new());
        }

        let module_ids = ctx.graph.module_ids();
        for prefix in layer_map.keys() {
            let covers_any = module_ids.iter().any(|module| {
                *module == prefix
                    || module
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            });
            if !covers_any {
                warn!("Layer map entry '{}' matches no module, ignoring", prefix);
            }
        }

        let mut findings = Vec::new();
        for from in module_ids {
            let Some(from_rank) = layer_of(from, layer_map) else {
                debug!("Module {} outside configured layers, skipping", from);
                continue;
            };
            for to in ctx.graph.dependencies_of(from) {
                let Some(to_rank) = layer_of(to, layer_map) else {
                    continue;
                };
                if from_rank < to_rank {
                    findings.push(
                        Finding::new(
                            self.name(),
                            FindingKind::LayerViolation,
                            Severity::Major,
                            vec![from.to_string(), to.to_string()],
                            format!(
                                "{from} (layer {from_rank}) depends on {to} (layer {to_rank}) above it"
                            ),
                        )
                        .with_suggested_fix(format!(
                            "Invert the dependency: let {to} call down into {from} or extract the shared part"
                        )),
                    );
                }
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

    fn layered_config() -> ScoreConfig {
        let mut config = ScoreConfig::default();
        config.layer_map.insert("api".to_string(), 3);
        config.layer_map.insert("core".to_string(), 2);
        config.layer_map.insert("db".to_string(), 1);
        config
    }

    fn run(files: &[(&str, &str)], config: &ScoreConfig) -> Vec<Finding> {
        let units: Vec<_> = files
            .iter()
            .map(|(path, text)| extract_unit(&SourceFile::new(*path, *text)))
            .collect();
        let graph = build_dependency_graph(&units);
        let ctx = AnalysisContext::new(&units, &graph, config);
        LayerViolationDetector::new().detect(&ctx).unwrap()
    }

    #[test]
    fn test_layer_of_prefers_longest_prefix() {
        let mut layers = BTreeMap::new();
        layers.insert("api".to_string(), 3);
        layers.insert("api/internal".to_string(), 1);
        assert_eq!(layer_of("api/routes", &layers), Some(3));
        assert_eq!(layer_of("api/internal/wire", &layers), Some(1));
        assert_eq!(layer_of("apiclient", &layers), None);
    }

    #[test]
    fn test_upward_dependency_is_flagged() {
        let findings = run(
            &[
                ("db/repo.py", "from api.routes import handler\n"),
                ("api/routes.py", ""),
            ],
            &layered_config(),
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::LayerViolation);
        assert_eq!(
            findings[0].subjects,
            vec!["db/repo".to_string(), "api/routes".to_string()]
        );
    }

    #[test]
    fn test_downward_dependency_is_fine() {
        let findings = run(
            &[
                ("api/routes.py", "from db.repo import load\n"),
                ("db/repo.py", ""),
            ],
            &layered_config(),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unmapped_modules_are_ignored() {
        let findings = run(
            &[
                ("scripts/tool.py", "from api.routes import handler\n"),
                ("api/routes.py", ""),
            ],
            &layered_config(),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unknown_layer_entry_is_ignored() {
        let mut config = layered_config();
        config.layer_map.insert("legacy".to_string(), 9);
        let findings = run(
            &[
                ("api/routes.py", "from db.repo import load\n"),
                ("db/repo.py", ""),
            ],
            &config,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_no_layer_map_no_findings() {
        let findings = run(
            &[
                ("db/repo.py", "from api.routes import handler\n"),
                ("api/routes.py", ""),
            ],
            &ScoreConfig::default(),
        );
        assert!(findings.is_empty());
    }
}
