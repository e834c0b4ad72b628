//! Pattern consistency detector
//!
//! Modules in the same directory usually share a shape: the same naming
//! convention, similar sizes, docs or no docs. Each module gets a
//! structural fingerprint, and a module that breaks a strong local
//! pattern is flagged.

use super::base::{AnalysisContext, Detector};
use crate::extract::SourceUnit;
use crate::models::{Finding, FindingKind, Severity};
use crate::naming::detect_naming_convention;
use anyhow::Result;
use std::collections::BTreeMap;
use xxhash_rust::xxh3::xxh3_64;

/// Directories with fewer modules than this are too small to have a
/// pattern worth enforcing.
const PATTERN_MIN_GROUP: usize = 4;

/// A fingerprint must cover at least this share of a directory before
/// outliers are reported.
const PATTERN_DOMINANCE_MIN: f64 = 0.6;

/// Structural fingerprint of a module: naming convention, documentation
/// presence, and bucketed size and arity. Equal fingerprints mean
/// "written the same way", not "same code".
pub fn structural_fingerprint(unit: &SourceUnit) -> u64 {
    let facts = &unit.facts;
    let convention = detect_naming_convention(facts.functions.iter().map(|f| f.name.as_str()));

    let size = match facts.functions.len() {
        0..=3 => "small",
        4..=9 => "medium",
        _ => "large",
    };

    let total_params: u32 = facts.functions.iter().map(|f| f.param_count).sum();
    let avg_params = if facts.functions.is_empty() {
        0.0
    } else {
        f64::from(total_params) / facts.functions.len() as f64
    };
    let arity = if avg_params < 2.0 {
        "lean"
    } else if avg_params < 4.0 {
        "moderate"
    } else {
        "wide"
    };

    let key = format!(
        "{}|{}|{}|{}",
        convention.as_str(),
        facts.has_docs,
        size,
        arity
    );
    xxh3_64(key.as_bytes())
}

fn directory_of(module_id: &str) -> &str {
    match module_id.rfind('/') {
        Some(pos) => &module_id[..pos],
        None => "",
    }
}

fn groups<'a>(units: &'a [&'a SourceUnit]) -> BTreeMap<&'a str, Vec<(&'a SourceUnit, u64)>> {
    let mut by_dir: BTreeMap<&str, Vec<(&SourceUnit, u64)>> = BTreeMap::new();
    for unit in units.iter().copied() {
        if unit.facts.functions.is_empty() {
            continue;
        }
        by_dir
            .entry(directory_of(&unit.module_id))
            .or_default()
            .push((unit, structural_fingerprint(unit)));
    }
    by_dir
}

fn dominant(members: &[(&SourceUnit, u64)]) -> (u64, usize) {
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for (_, fingerprint) in members {
        *counts.entry(*fingerprint).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .unwrap_or((0, 0))
}

/// Mean dominant-fingerprint share across directories with at least two
/// modules. `None` when no directory is big enough to judge.
pub fn pattern_consistency_score(units: &[&SourceUnit]) -> Option<f64> {
    let by_dir = groups(units);
    let mut sum = 0.0;
    let mut count = 0u32;
    for members in by_dir.values() {
        if members.len() < 2 {
            continue;
        }
        let (_, dominant_count) = dominant(members);
        sum += dominant_count as f64 / members.len() as f64;
        count += 1;
    }
    (count > 0).then(|| sum / f64::from(count))
}

/// Flags modules that diverge from the dominant structure of their
/// directory.
#[derive(Debug, Default)]
pub struct PatternConsistencyDetector;

impl PatternConsistencyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for PatternConsistencyDetector {
    fn name(&self) -> &'static str {
        "PatternConsistencyDetector"
    }

    fn description(&self) -> &'static str {
        "Detects modules that break the structural pattern of their directory"
    }

    fn category(&self) -> &'static str {
        "consistency"
    }

    fn detect(&self, ctx: &AnalysisContext) -> Result<Vec<Finding>> {
        let production: Vec<&SourceUnit> = ctx.production_units().collect();
        let mut findings = Vec::new();

        for (dir, members) in groups(&production) {
            if members.len() < PATTERN_MIN_GROUP {
                continue;
            }
            let (dominant_print, dominant_count) = dominant(&members);
            let share = dominant_count as f64 / members.len() as f64;
            if share < PATTERN_DOMINANCE_MIN {
                continue;
            }

            let dir_label = if dir.is_empty() { "the project root" } else { dir };
            for (unit, fingerprint) in &members {
                if *fingerprint == dominant_print {
                    continue;
                }
                findings.push(Finding::new(
                    self.name(),
                    FindingKind::PatternDeviation,
                    Severity::Minor,
                    vec![unit.module_id.clone()],
                    format!(
                        "{} diverges from the structure shared by {} of {} modules in {}",
                        unit.module_id,
                        dominant_count,
                        members.len(),
                        dir_label
                    ),
                ));
            }
        }

        Ok(findings)
    }
}
