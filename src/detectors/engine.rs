//! Detector execution engine
//!
//! Runs every registered detector against a shared read-only context on a
//! rayon pool. A detector failure is logged and recorded in the summary;
//! the run always completes. Per-detector findings are sorted by severity
//! and truncated to the configured cap before merging.

use super::base::{AnalysisContext, DetectionSummary, Detector, DetectorResult, ProgressCallback};
use crate::config::DEFAULT_MAX_FINDINGS_PER_DETECTOR;
use crate::models::{sort_findings, Finding};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct DetectorEngine {
    detectors: Vec<Arc<dyn Detector>>,
    workers: usize,
    max_findings_per_detector: usize,
    progress: Option<ProgressCallback>,
}

/// Builder for [`DetectorEngine`].
pub struct DetectorEngineBuilder {
    detectors: Vec<Arc<dyn Detector>>,
    workers: usize,
    max_findings_per_detector: usize,
    progress: Option<ProgressCallback>,
}

impl Default for DetectorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorEngineBuilder {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            // Zero lets rayon pick its own pool size.
            workers: 0,
            max_findings_per_detector: DEFAULT_MAX_FINDINGS_PER_DETECTOR,
            progress: None,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn max_findings_per_detector(mut self, max: usize) -> Self {
        self.max_findings_per_detector = max;
        self
    }

    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn detectors(mut self, detectors: Vec<Arc<dyn Detector>>) -> Self {
        self.detectors.extend(detectors);
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn build(self) -> DetectorEngine {
        DetectorEngine {
            detectors: self.detectors,
            workers: self.workers,
            max_findings_per_detector: self.max_findings_per_detector,
            progress: self.progress,
        }
    }
}

impl DetectorEngine {
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Thread count the run pool is built with.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run all detectors and merge their findings, sorted most severe
    /// first. Failures land in the summary, not in an error.
    pub fn run(&self, ctx: &AnalysisContext) -> (Vec<Finding>, DetectionSummary) {
        let started = Instant::now();
        let total = self.detectors.len();
        info!("Running {} detectors with {} workers", total, self.workers);

        let completed = AtomicUsize::new(0);
        let run_one = |detector: &Arc<dyn Detector>| {
            let result = Self::execute(detector.as_ref(), ctx, self.max_findings_per_detector);
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = &self.progress {
                callback(detector.name(), done, total);
            }
            result
        };

        let results: Vec<DetectorResult> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| self.detectors.par_iter().map(run_one).collect()),
            Err(err) => {
                warn!("Thread pool construction failed, running serially: {err}");
                self.detectors.iter().map(run_one).collect()
            }
        };

        let mut summary = DetectionSummary::default();
        let mut findings = Vec::new();
        for result in results {
            summary.add_result(&result);
            if result.success {
                findings.extend(result.findings);
            }
        }
        sort_findings(&mut findings);

        debug!(
            "Detection finished in {:?}: {} findings, {} of {} detectors succeeded",
            started.elapsed(),
            findings.len(),
            summary.detectors_succeeded,
            summary.detectors_run
        );
        (findings, summary)
    }

    fn execute(detector: &dyn Detector, ctx: &AnalysisContext, cap: usize) -> DetectorResult {
        let started = Instant::now();
        let name = detector.name();

        match detector.detect(ctx) {
            Ok(mut findings) => {
                sort_findings(&mut findings);
                if findings.len() > cap {
                    debug!("{}: truncating {} findings to {}", name, findings.len(), cap);
                    findings.truncate(cap);
                }
                debug!("{}: {} findings", name, findings.len());
                DetectorResult::success(
                    name.to_string(),
                    findings,
                    started.elapsed().as_millis() as u64,
                )
            }
            Err(err) => {
                warn!("Detector {} failed, skipping: {err:#}", name);
                DetectorResult::failure(
                    name.to_string(),
                    err.to_string(),
                    started.elapsed().as_millis() as u64,
                )
            }
        }
    }
}
