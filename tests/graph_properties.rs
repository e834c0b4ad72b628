//! Property tests for graph analysis and scoring math
//!
//! - Imports that only point forward build a DAG, and a DAG reports no
//!   cycles
//! - A ring of imports is always reported as cyclic
//! - Afferent and efferent coupling agree with neighbor sets computed
//!   straight from the import lists
//! - Grades are monotonic in score, with exact breakpoint behavior
//! - The weighted score ignores insertion order and stays in 0..=100

use std::collections::{BTreeMap, BTreeSet};

use oink_score::graph::coupling::calculate_coupling_metrics;
use oink_score::graph::cycles::{detect_cycles, is_acyclic};
use oink_score::{
    build_dependency_graph, calculate_weighted_score, extract_unit, score_to_grade, Grade,
    MetricSet, SourceFile, SourceUnit,
};
use proptest::prelude::*;

/// Build one unit per module, importing exactly the given neighbors.
fn units_from_imports(n: usize, edges: &[(usize, usize)]) -> Vec<SourceUnit> {
    let mut imports: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for &(from, to) in edges {
        imports[from].insert(to);
    }
    (0..n)
        .map(|i| {
            let text: String = imports[i]
                .iter()
                .map(|j| format!("import mod_{j}\n"))
                .collect();
            extract_unit(&SourceFile::new(format!("mod_{i}.py"), text))
        })
        .collect()
}

proptest! {
    /// Imports from lower to higher indices can never form a cycle.
    #[test]
    fn prop_forward_imports_build_a_dag(
        n in 2usize..10,
        raw in prop::collection::vec((0usize..10, 0usize..10), 0..40),
    ) {
        let edges: Vec<(usize, usize)> = raw
            .iter()
            .map(|&(a, b)| (a % n, b % n))
            .filter(|&(a, b)| a < b)
            .collect();
        let units = units_from_imports(n, &edges);
        let graph = build_dependency_graph(&units);

        prop_assert!(is_acyclic(&graph));
        prop_assert!(detect_cycles(&graph).is_empty());
    }

    /// A ring of imports is always reported as cyclic, with the ring
    /// itself among the enumerated cycles.
    #[test]
    fn prop_import_ring_is_always_cyclic(n in 2usize..8) {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        let units = units_from_imports(n, &edges);
        let graph = build_dependency_graph(&units);

        prop_assert!(!is_acyclic(&graph));
        let cycles = detect_cycles(&graph);
        prop_assert!(cycles.iter().any(|cycle| cycle.len() == n));
    }

    /// Ca and Ce per module equal the distinct neighbor sets computed
    /// directly from the import lists, and instability follows from them.
    #[test]
    fn prop_coupling_matches_edge_degree(
        n in 1usize..10,
        raw in prop::collection::vec((0usize..10, 0usize..10), 0..40),
    ) {
        let edges: Vec<(usize, usize)> = raw.iter().map(|&(a, b)| (a % n, b % n)).collect();
        let units = units_from_imports(n, &edges);
        let graph = build_dependency_graph(&units);

        let mut expected_out: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        let mut expected_in: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for &(from, to) in &edges {
            expected_out.entry(from).or_default().insert(to);
            expected_in.entry(to).or_default().insert(from);
        }

        let metrics = calculate_coupling_metrics(&graph);
        prop_assert_eq!(metrics.len(), n);
        for metric in &metrics {
            let idx: usize = metric.module.trim_start_matches("mod_").parse().unwrap();
            let ce = expected_out.get(&idx).map_or(0, BTreeSet::len);
            let ca = expected_in.get(&idx).map_or(0, BTreeSet::len);
            prop_assert_eq!(metric.efferent, ce);
            prop_assert_eq!(metric.afferent, ca);

            let total = ca + ce;
            if total == 0 {
                prop_assert_eq!(metric.instability, 0.0);
            } else {
                let expected = ce as f64 / total as f64;
                prop_assert!((metric.instability - expected).abs() < 1e-12);
            }
        }
    }

    /// Higher scores never earn worse grades. `Grade` orders A first, so
    /// better grades compare smaller.
    #[test]
    fn prop_grades_are_monotonic(a in 0.0f64..110.0, b in 0.0f64..110.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_to_grade(high) <= score_to_grade(low));
    }

    /// The weighted score never depends on which entry went in first,
    /// and always lands in 0..=100.
    #[test]
    fn prop_weighted_score_order_free_and_bounded(
        entries in prop::collection::btree_map("[a-e]{1,2}", (0.0f64..=1.0, 0.0f64..=2.0), 0..8),
    ) {
        let pairs: Vec<(String, f64, f64)> = entries
            .into_iter()
            .map(|(name, (value, weight))| (name, value, weight))
            .collect();

        let mut metrics_fwd = MetricSet::new();
        let mut weights_fwd = BTreeMap::new();
        for (name, value, weight) in &pairs {
            metrics_fwd.insert(name.clone(), *value);
            weights_fwd.insert(name.clone(), *weight);
        }

        let mut metrics_rev = MetricSet::new();
        let mut weights_rev = BTreeMap::new();
        for (name, value, weight) in pairs.iter().rev() {
            metrics_rev.insert(name.clone(), *value);
            weights_rev.insert(name.clone(), *weight);
        }

        let forward = calculate_weighted_score(&metrics_fwd, &weights_fwd);
        let reversed = calculate_weighted_score(&metrics_rev, &weights_rev);
        prop_assert_eq!(forward, reversed);
        prop_assert!((0.0..=100.0).contains(&forward));
    }
}

#[test]
fn test_grade_breakpoints_are_exact() {
    assert_eq!(score_to_grade(90.0), Grade::A);
    assert_eq!(score_to_grade(89.999999), Grade::B);
    assert_eq!(score_to_grade(80.0), Grade::B);
    assert_eq!(score_to_grade(79.999999), Grade::C);
    assert_eq!(score_to_grade(70.0), Grade::C);
    assert_eq!(score_to_grade(69.999999), Grade::D);
    assert_eq!(score_to_grade(60.0), Grade::D);
    assert_eq!(score_to_grade(59.999999), Grade::F);
}
