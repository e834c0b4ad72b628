//! Oink Score - Heuristic code-quality scoring engine
//!
//! Extracts facts from source text with regex heuristics, builds a module
//! dependency graph, runs structural and cross-cutting detectors over
//! both, and folds the results into a weighted 0-100 score with a letter
//! grade.
//!
//! The crate is a library. Callers hand in file contents and get reports
//! back; nothing here touches the network, and the only disk access is
//! the optional config-file loaders.
//!
//! ```
//! use oink_score::{QualityAnalysis, ScoreConfig, SourceFile};
//!
//! let files = vec![SourceFile::new(
//!     "app/service.py",
//!     "def serve(request):\n    \"\"\"Answer one request.\"\"\"\n    return request\n",
//! )];
//! let analysis = QualityAnalysis::run(&files, &ScoreConfig::default());
//! let report = analysis.repository_report();
//! println!("{}: {:.1} ({})", report.scope, report.score, report.grade);
//! ```

pub mod analysis;
pub mod api_surface;
pub mod config;
pub mod detectors;
pub mod extract;
pub mod graph;
pub mod models;
pub mod naming;
pub mod scoring;

pub use analysis::QualityAnalysis;
pub use api_surface::{extract_api_contracts, ApiSignature};
pub use config::{ConfigError, GodModuleRule, ScoreConfig, ScoreWeights};
pub use extract::{extract_unit, extract_units, Language, SourceFile, SourceUnit};
pub use graph::{build_dependency_graph, DependencyGraph, DependencyKind, ModuleNode};
pub use models::{
    Finding, FindingKind, FindingsSummary, Grade, MetricSet, QualityReport, ReportScope, Severity,
};
pub use scoring::{calculate_weighted_score, score_to_grade, Scorer};
