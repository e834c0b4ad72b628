//! Weighted Quality Scoring
//!
//! This module folds the sub-metrics produced by extraction, the graph
//! analyzers, and the detectors into one 0-100 score and a letter grade.
//! The score reflects measured qualities, not just finding counts.
//!
//! # Scoring Formula
//!
//! ```text
//! Score = Σ (weightᵢ × metricᵢ) / Σ weightᵢ × 100
//!
//! Where each metric is a sub-score in [0, 1], 1.0 = best:
//!   dependency_health      1 - scaled cycle/god-module/layering penalty
//!   coupling_quality       1 - mean instability (Ce / (Ca + Ce))
//!   naming_quality         mean name quality over production functions
//!   documentation_quality  mean doc quality over production functions
//!   test_health            mean of test coverage and mock cleanliness
//! ```
//!
//! Only metrics present in both the metric set and the weight map enter
//! the sum, so a repository with no test files is judged on what it has
//! rather than punished for the missing pillar. `boundary_score` and
//! `pattern_consistency` are always recorded but carry no weight unless
//! the configuration adds one.
//!
//! # Grades
//!
//! - 90 and up: A
//! - 80 and up: B
//! - 70 and up: C
//! - 60 and up: D
//! - below 60: F
//!
//! # Example
//!
//! A repository scoring 0.9 on naming (weight 0.20) and 0.6 on
//! documentation (weight 0.15), with every other pillar absent:
//!
//! Score = (0.20 × 0.9 + 0.15 × 0.6) / 0.35 × 100 ≈ 77.1 → C

mod aggregator;

pub use aggregator::{
    calculate_weighted_score, score_to_grade, Scorer, GRADE_A_MIN, GRADE_B_MIN, GRADE_C_MIN,
    GRADE_D_MIN, PERFECT_SCORE,
};

/// Metric name for the cycle/god-module/layering pillar.
pub const METRIC_DEPENDENCY_HEALTH: &str = "dependency_health";
/// Metric name for the instability pillar.
pub const METRIC_COUPLING_QUALITY: &str = "coupling_quality";
/// Metric name for the identifier quality pillar.
pub const METRIC_NAMING_QUALITY: &str = "naming_quality";
/// Metric name for the doc coverage pillar.
pub const METRIC_DOCUMENTATION_QUALITY: &str = "documentation_quality";
/// Metric name for the test coverage and mock usage pillar.
pub const METRIC_TEST_HEALTH: &str = "test_health";
/// Recorded service-boundary metric, unweighted by default.
pub const METRIC_BOUNDARY_SCORE: &str = "boundary_score";
/// Recorded structural-consistency metric, unweighted by default.
pub const METRIC_PATTERN_CONSISTENCY: &str = "pattern_consistency";
