//! Public API surface
//!
//! The externally visible contract of each module: its public function
//! signatures, boiled down to name and arity. Comparing two snapshots
//! shows what a change did to the surface without reading bodies.

use crate::extract::SourceUnit;
use serde::Serialize;
use std::collections::BTreeMap;

/// One public function as seen from outside the module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ApiSignature {
    pub name: String,
    pub param_count: u32,
}

/// Public signatures per production module, sorted for stable output.
/// Modules with no public functions are omitted.
pub fn extract_api_contracts(units: &[SourceUnit]) -> BTreeMap<String, Vec<ApiSignature>> {
    let mut contracts: BTreeMap<String, Vec<ApiSignature>> = BTreeMap::new();

    for unit in units.iter().filter(|u| u.is_production()) {
        let mut signatures: Vec<ApiSignature> = unit
            .facts
            .functions
            .iter()
            .filter(|f| f.is_public)
            .map(|f| ApiSignature {
                name: f.name.clone(),
                param_count: f.param_count,
            })
            .collect();
        if signatures.is_empty() {
            continue;
        }
        signatures.sort();
        contracts.insert(unit.module_id.clone(), signatures);
    }

    contracts
}
