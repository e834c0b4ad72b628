//! Quality detectors
//!
//! This module provides the detector framework and the implementations
//! that turn extracted facts and the dependency graph into findings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DetectorEngine                          │
//! │  - Registers detectors                                      │
//! │  - Runs detectors in parallel (rayon)                       │
//! │  - Skips failed detectors, keeps the rest                   │
//! │  - Collects, sorts, and truncates findings                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Detector Trait                         │
//! │  - name(): Unique identifier                                │
//! │  - description(): Human-readable description                │
//! │  - detect(ctx): Run detection, return findings              │
//! │  - category(): Scoring pillar the findings feed             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐ ┌──────────────────────────────┐
//! │ Graph-based              │ │ Fact-based                   │
//! │ (CircularDependency,     │ │ (NamingQuality, MissingDocs, │
//! │  GodModule, Layering,    │ │  TestCoverage, MockDensity,  │
//! │  ServiceBoundary)        │ │  PatternConsistency)         │
//! └──────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! Every detector reads the same immutable [`AnalysisContext`]; none of
//! them touch the filesystem or mutate shared state.
//!
//! # Usage
//!
//! ```ignore
//! use oink_score::detectors::{DetectorEngineBuilder, CircularDependencyDetector};
//! use std::sync::Arc;
//!
//! let engine = DetectorEngineBuilder::new()
//!     .workers(4)
//!     .detector(Arc::new(CircularDependencyDetector::new()))
//!     .build();
//! let (findings, summary) = engine.run(&ctx);
//! ```

mod base;
mod engine;

// Graph detectors
mod circular;
mod god_module;
mod layering;

// Cross-cutting detectors
mod boundaries;
mod consistency;
mod missing_docs;
mod mock_density;
mod naming_quality;
mod test_coverage;

// Re-export base types
pub use base::{AnalysisContext, DetectionSummary, Detector, DetectorResult, ProgressCallback};

// Re-export engine
pub use engine::{DetectorEngine, DetectorEngineBuilder};

// Re-export detector implementations and their scoring helpers
pub use boundaries::{boundary_score, top_level_group, ServiceBoundaryDetector};
pub use circular::CircularDependencyDetector;
pub use consistency::{
    pattern_consistency_score, structural_fingerprint, PatternConsistencyDetector,
};
pub use god_module::GodModuleDetector;
pub use layering::{layer_of, LayerViolationDetector};
pub use missing_docs::{documentation_score, MissingDocsDetector};
pub use mock_density::{is_mock_call, mock_call_ratio, MockDensityDetector};
pub use naming_quality::NamingQualityDetector;
pub use test_coverage::{test_coverage_ratio, TestCoverageDetector};

use crate::config::ScoreConfig;
use std::sync::Arc;

/// The full detector set, filtered by the per-detector enable switches
/// in the configuration.
pub fn default_detectors(config: &ScoreConfig) -> Vec<Arc<dyn Detector>> {
    let all: Vec<Arc<dyn Detector>> = vec![
        // Graph detectors
        Arc::new(CircularDependencyDetector::new()),
        Arc::new(GodModuleDetector::new()),
        Arc::new(LayerViolationDetector::new()),
        Arc::new(ServiceBoundaryDetector::new()),
        // Cross-cutting detectors
        Arc::new(PatternConsistencyDetector::new()),
        Arc::new(NamingQualityDetector::new()),
        Arc::new(MissingDocsDetector::new()),
        Arc::new(TestCoverageDetector::new()),
        Arc::new(MockDensityDetector::new()),
    ];

    all.into_iter()
        .filter(|detector| config.is_detector_enabled(detector.name()))
        .collect()
}

/// Build an engine carrying the default detector set and the limits the
/// configuration asks for.
pub fn create_engine(config: &ScoreConfig) -> DetectorEngine {
    DetectorEngineBuilder::new()
        .workers(config.effective_workers())
        .max_findings_per_detector(config.max_findings_per_detector)
        .detectors(default_detectors(config))
        .build()
}
