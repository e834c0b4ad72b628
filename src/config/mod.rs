//! Analysis configuration
//!
//! Loads per-repository configuration from `oinkscore.toml` or
//! `.oinkscorerc.json` files, falling back to defaults when neither exists.
//!
//! Invalid configuration is the one hard failure in this crate: every loader
//! runs [`ScoreConfig::validate`] and analysis never starts with a config
//! that fails it. Everything downstream (extraction, detection, scoring)
//! degrades instead of erroring.
//!
//! # Configuration Format
//!
//! ```toml
//! # oinkscore.toml
//! mock_density_threshold = 0.6
//! mock_min_calls = 5
//! naming_exceptions = ["i", "j", "k", "n"]
//! workers = 8
//! god_module = { mode = "stddev", value = 3.0 }
//! god_module_min_degree = 10
//!
//! [weights]
//! dependency_health = 0.3
//! coupling_quality = 0.2
//! naming_quality = 0.2
//! documentation_quality = 0.15
//! test_health = 0.15
//!
//! [layer_map]
//! "core/storage" = 0
//! "api/handlers" = 2
//!
//! [detectors_enabled]
//! mock-density = false
//! ```

use crate::scoring::{
    METRIC_COUPLING_QUALITY, METRIC_DEPENDENCY_HEALTH, METRIC_DOCUMENTATION_QUALITY,
    METRIC_NAMING_QUALITY, METRIC_TEST_HEALTH,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Default weight of the dependency-health pillar.
pub const DEFAULT_DEPENDENCY_HEALTH_WEIGHT: f64 = 0.30;
/// Default weight of the coupling pillar.
pub const DEFAULT_COUPLING_QUALITY_WEIGHT: f64 = 0.20;
/// Default weight of the naming pillar.
pub const DEFAULT_NAMING_QUALITY_WEIGHT: f64 = 0.20;
/// Default weight of the documentation pillar.
pub const DEFAULT_DOCUMENTATION_QUALITY_WEIGHT: f64 = 0.15;
/// Default weight of the test-health pillar.
pub const DEFAULT_TEST_HEALTH_WEIGHT: f64 = 0.15;

/// Default sigma multiplier for statistical god-module detection.
pub const DEFAULT_GOD_MODULE_SIGMA: f64 = 3.0;
/// Default floor under the statistical god-module threshold. In a small
/// or uniformly connected graph the standard deviation collapses and
/// every module would clear `mean + sigma * std`.
pub const DEFAULT_GOD_MODULE_MIN_DEGREE: usize = 10;
/// Mock-call ratio above which a test file is flagged.
pub const DEFAULT_MOCK_DENSITY_THRESHOLD: f64 = 0.6;
/// Default minimum call count before a test file's mock ratio is judged.
pub const DEFAULT_MOCK_MIN_CALLS: u32 = 5;
/// Per-detector finding cap.
pub const DEFAULT_MAX_FINDINGS_PER_DETECTOR: usize = 50;
/// Upper bound on auto-detected worker threads.
pub const MAX_AUTO_WORKERS: usize = 16;

/// Single-letter names that are idiomatic in loops and math code and
/// therefore not flagged by default.
pub const DEFAULT_NAMING_EXCEPTIONS: &[&str] =
    &["x", "y", "z", "i", "j", "k", "n", "m", "t", "e", "f"];

const CONFIG_FILE_TOML: &str = "oinkscore.toml";
const CONFIG_FILE_JSON: &str = ".oinkscorerc.json";

/// Errors produced by configuration loading and validation.
///
/// These are the only errors this crate surfaces to callers: a config that
/// fails validation must be rejected before analysis starts, because every
/// downstream stage trusts the thresholds it carries.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A metric weight was negative.
    #[error("weight for '{metric}' is negative ({value}); weights must be >= 0")]
    NegativeWeight { metric: String, value: f64 },

    /// All metric weights were zero.
    #[error("metric weights sum to zero; at least one weight must be positive")]
    EmptyWeights,

    /// A threshold fell outside its valid range.
    #[error("threshold '{name}' is out of range ({value}); expected {expected}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// A naming exception entry was not a single letter.
    #[error("naming exception '{entry}' is invalid; entries must be a single ASCII letter")]
    InvalidNamingException { entry: String },

    /// Failed to read a config file that exists on disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config file.
    #[error("failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Weights for the scoring pillars.
///
/// The five built-in pillars have named fields; additional caller-defined
/// metrics can be weighted through the flattened map. The weighted mean
/// divides by the weight sum, so weights do not need to sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_dependency_health_weight")]
    pub dependency_health: f64,

    #[serde(default = "default_coupling_quality_weight")]
    pub coupling_quality: f64,

    #[serde(default = "default_naming_quality_weight")]
    pub naming_quality: f64,

    #[serde(default = "default_documentation_quality_weight")]
    pub documentation_quality: f64,

    #[serde(default = "default_test_health_weight")]
    pub test_health: f64,

    /// Weights for metrics beyond the built-in pillars (e.g. boundary_score).
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, f64>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            dependency_health: default_dependency_health_weight(),
            coupling_quality: default_coupling_quality_weight(),
            naming_quality: default_naming_quality_weight(),
            documentation_quality: default_documentation_quality_weight(),
            test_health: default_test_health_weight(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_dependency_health_weight() -> f64 {
    DEFAULT_DEPENDENCY_HEALTH_WEIGHT
}
fn default_coupling_quality_weight() -> f64 {
    DEFAULT_COUPLING_QUALITY_WEIGHT
}
fn default_naming_quality_weight() -> f64 {
    DEFAULT_NAMING_QUALITY_WEIGHT
}
fn default_documentation_quality_weight() -> f64 {
    DEFAULT_DOCUMENTATION_QUALITY_WEIGHT
}
fn default_test_health_weight() -> f64 {
    DEFAULT_TEST_HEALTH_WEIGHT
}

impl ScoreWeights {
    /// All weights keyed by metric name. Built-in pillar fields win over
    /// `extra` entries that reuse a pillar name.
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        let mut map = self.extra.clone();
        map.insert(METRIC_DEPENDENCY_HEALTH.to_string(), self.dependency_health);
        map.insert(METRIC_COUPLING_QUALITY.to_string(), self.coupling_quality);
        map.insert(METRIC_NAMING_QUALITY.to_string(), self.naming_quality);
        map.insert(
            METRIC_DOCUMENTATION_QUALITY.to_string(),
            self.documentation_quality,
        );
        map.insert(METRIC_TEST_HEALTH.to_string(), self.test_health);
        map
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.as_map().values().sum()
    }
}

/// How god modules are identified.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum GodModuleRule {
    /// Flag modules whose total degree exceeds mean + k standard deviations.
    StdDev(f64),
    /// Flag modules whose total degree exceeds a fixed cap.
    Absolute(usize),
}

impl Default for GodModuleRule {
    fn default() -> Self {
        GodModuleRule::StdDev(DEFAULT_GOD_MODULE_SIGMA)
    }
}

/// Repository-level analysis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreConfig {
    /// Pillar weights for the aggregate score.
    #[serde(default)]
    pub weights: ScoreWeights,

    /// God-module detection rule.
    #[serde(default)]
    pub god_module: GodModuleRule,

    /// Floor under the `stddev` god-module threshold: a module is never
    /// flagged below this total degree. 0 disables the floor. Ignored by
    /// the `absolute` rule.
    #[serde(default = "default_god_module_min_degree")]
    pub god_module_min_degree: usize,

    /// Mock-call ratio above which a test file is flagged.
    #[serde(default = "default_mock_density_threshold")]
    pub mock_density_threshold: f64,

    /// Test files with fewer calls than this are skipped by the mock
    /// density detector; their ratio is too noisy to judge.
    #[serde(default = "default_mock_min_calls")]
    pub mock_min_calls: u32,

    /// Single-letter names exempt from naming findings.
    #[serde(default = "default_naming_exceptions")]
    pub naming_exceptions: Vec<String>,

    /// Module ID -> layer rank. Lower ranks are closer to the core and must
    /// not depend on higher ranks. Empty map disables layering analysis.
    #[serde(default)]
    pub layer_map: BTreeMap<String, u32>,

    /// Worker threads for extraction and detection (0 = auto-detect).
    #[serde(default)]
    pub workers: usize,

    /// Per-detector enable overrides. Detectors default to enabled.
    #[serde(default)]
    pub detectors_enabled: BTreeMap<String, bool>,

    /// Findings kept per detector before truncation.
    #[serde(default = "default_max_findings_per_detector")]
    pub max_findings_per_detector: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            god_module: GodModuleRule::default(),
            god_module_min_degree: default_god_module_min_degree(),
            mock_density_threshold: default_mock_density_threshold(),
            mock_min_calls: default_mock_min_calls(),
            naming_exceptions: default_naming_exceptions(),
            layer_map: BTreeMap::new(),
            workers: 0,
            detectors_enabled: BTreeMap::new(),
            max_findings_per_detector: default_max_findings_per_detector(),
        }
    }
}

fn default_god_module_min_degree() -> usize {
    DEFAULT_GOD_MODULE_MIN_DEGREE
}

fn default_mock_density_threshold() -> f64 {
    DEFAULT_MOCK_DENSITY_THRESHOLD
}

fn default_mock_min_calls() -> u32 {
    DEFAULT_MOCK_MIN_CALLS
}

fn default_naming_exceptions() -> Vec<String> {
    DEFAULT_NAMING_EXCEPTIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_findings_per_detector() -> usize {
    DEFAULT_MAX_FINDINGS_PER_DETECTOR
}

impl ScoreConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScoreConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            format: "TOML",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScoreConfig = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            format: "JSON",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory.
    ///
    /// Searches in this order:
    /// 1. `oinkscore.toml`
    /// 2. `.oinkscorerc.json`
    ///
    /// A missing file is not an error (defaults are returned), but a file
    /// that exists and fails to read, parse, or validate is.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let toml_path = dir.join(CONFIG_FILE_TOML);
        if toml_path.exists() {
            let content = read_config_file(&toml_path)?;
            let config = Self::from_toml_str(&content)?;
            debug!("Loaded config from {}", toml_path.display());
            return Ok(config);
        }

        let json_path = dir.join(CONFIG_FILE_JSON);
        if json_path.exists() {
            let content = read_config_file(&json_path)?;
            let config = Self::from_json_str(&content)?;
            debug!("Loaded config from {}", json_path.display());
            return Ok(config);
        }

        debug!("No config file found in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    /// Check every threshold and weight. Called by all loaders; callers
    /// constructing a config in code should call it themselves before
    /// running an analysis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (metric, value) in self.weights.as_map() {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { metric, value });
            }
        }
        if self.weights.total() <= 0.0 {
            return Err(ConfigError::EmptyWeights);
        }

        if !(self.mock_density_threshold > 0.0 && self.mock_density_threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "mock_density_threshold",
                value: self.mock_density_threshold,
                expected: "a value in (0.0, 1.0]",
            });
        }

        match self.god_module {
            GodModuleRule::StdDev(k) if k <= 0.0 => {
                return Err(ConfigError::InvalidThreshold {
                    name: "god_module.stddev",
                    value: k,
                    expected: "a positive sigma multiplier",
                });
            }
            GodModuleRule::Absolute(cap) if cap == 0 => {
                return Err(ConfigError::InvalidThreshold {
                    name: "god_module.absolute",
                    value: 0.0,
                    expected: "a degree cap of at least 1",
                });
            }
            _ => {}
        }

        if self.max_findings_per_detector == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "max_findings_per_detector",
                value: 0.0,
                expected: "a cap of at least 1",
            });
        }

        for entry in &self.naming_exceptions {
            let mut chars = entry.chars();
            let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.next().is_none();
            if !valid {
                return Err(ConfigError::InvalidNamingException {
                    entry: entry.clone(),
                });
            }
        }

        Ok(())
    }

    /// Check if a detector is enabled (defaults to true if not specified).
    pub fn is_detector_enabled(&self, name: &str) -> bool {
        let normalized = normalize_detector_name(name);
        self.detectors_enabled
            .get(&normalized)
            .or_else(|| self.detectors_enabled.get(name))
            .copied()
            .unwrap_or(true)
    }

    /// Effective worker count: the configured value, or the available
    /// parallelism capped at [`MAX_AUTO_WORKERS`] when set to 0.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
            .min(MAX_AUTO_WORKERS)
    }

    /// All weights keyed by metric name.
    pub fn weight_map(&self) -> BTreeMap<String, f64> {
        self.weights.as_map()
    }
}

/// Normalize a detector name for config lookup. `CircularDependencyDetector`,
/// `circular_dependency`, and `circular-dependency` all become
/// `circular-dependency`.
pub fn normalize_detector_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_word_char = false;
    for ch in name.trim().chars() {
        if ch == '_' || ch == ' ' {
            out.push('-');
            prev_word_char = false;
            continue;
        }
        if ch.is_ascii_uppercase() {
            if prev_word_char {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_word_char = false;
        } else {
            out.push(ch);
            prev_word_char = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    if let Some(stripped) = out.strip_suffix("-detector") {
        return stripped.to_string();
    }
    out
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}
