//! Property-based tests for ontology closure and onset algebra invariants.

use proptest::prelude::*;
use rc_common::TermId;
use rc_core::onset::{AgeClass, OnsetInterval};
use rc_core::ontology::{Ontology, OntologyBuilder, OntologyQuery, FULL_DEPTH};
use std::collections::BTreeSet;

fn term_id(i: usize) -> String {
    format!("HP:{:07}", i)
}

/// Random rooted DAG: node 0 is the root, every other node gets a first
/// parent with a lower index (so it is reachable) plus optional extra
/// lower-index parents (so it stays acyclic).
fn dag_strategy() -> impl Strategy<Value = (Ontology, Vec<Vec<usize>>)> {
    (2usize..24)
        .prop_flat_map(|n| {
            let parents = (1..n)
                .map(|i| prop::collection::vec(0..i, 1..=3))
                .collect::<Vec<_>>();
            (Just(n), parents)
        })
        .prop_map(|(n, parents)| {
            let mut builder = OntologyBuilder::new();
            for i in 0..n {
                builder = builder.term(term_id(i), format!("term {}", i));
            }
            let mut table = vec![Vec::new()];
            for (offset, ps) in parents.into_iter().enumerate() {
                let child = offset + 1;
                let mut ps: Vec<usize> = ps;
                ps.sort_unstable();
                ps.dedup();
                for &p in &ps {
                    builder = builder.edge(term_id(p), term_id(child));
                }
                table.push(ps);
            }
            (builder.build().expect("generated DAG is valid"), table)
        })
}

fn subset_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..24, 1..6)
}

fn ids_in(ontology: &Ontology, picks: &[usize]) -> Vec<TermId> {
    picks
        .iter()
        .map(|&i| TermId::new(term_id(i % ontology.len())))
        .collect()
}

// ============================================================================
// Closure direction
// ============================================================================

proptest! {
    #[test]
    fn ancestor_descendant_symmetry((ontology, _) in dag_strategy()) {
        let all: Vec<TermId> = ontology.terms().map(|t| t.id.clone()).collect();
        for a in &all {
            let ancestors = ontology.ancestors(std::slice::from_ref(a), FULL_DEPTH);
            for b in &all {
                let descendants = ontology.descendants(std::slice::from_ref(b), FULL_DEPTH);
                prop_assert_eq!(ancestors.contains(b), descendants.contains(a));
            }
        }
    }

    #[test]
    fn depth_one_is_direct_parents((ontology, table) in dag_strategy()) {
        for (i, parents) in table.iter().enumerate() {
            let got = ontology.ancestors(&[TermId::new(term_id(i))], 1);
            let want: BTreeSet<TermId> = parents.iter().map(|&p| TermId::new(term_id(p))).collect();
            prop_assert_eq!(got, want);
        }
    }

    #[test]
    fn single_seed_never_echoed((ontology, _) in dag_strategy()) {
        for term in ontology.terms() {
            let seed = std::slice::from_ref(&term.id);
            prop_assert!(!ontology.ancestors(seed, FULL_DEPTH).contains(&term.id));
            prop_assert!(!ontology.descendants(seed, FULL_DEPTH).contains(&term.id));
        }
    }

    #[test]
    fn every_term_descends_from_root((ontology, _) in dag_strategy()) {
        let below = ontology.descendants(std::slice::from_ref(ontology.root()), FULL_DEPTH);
        prop_assert_eq!(below.len() + 1, ontology.len());
    }

    #[test]
    fn depth_is_monotone((ontology, _) in dag_strategy(), pick in 0usize..24, depth in 0usize..6) {
        let seed = ids_in(&ontology, &[pick]);
        let shallow = ontology.ancestors(&seed, depth);
        let deep = ontology.ancestors(&seed, depth + 1);
        prop_assert!(shallow.is_subset(&deep));
        prop_assert!(deep.is_subset(&ontology.ancestors(&seed, FULL_DEPTH)));
    }

    #[test]
    fn ranked_matches_closure((ontology, _) in dag_strategy(), pick in 0usize..24) {
        let seed = ids_in(&ontology, &[pick]);
        let ranked = ontology.ancestors_ranked(&seed[0], FULL_DEPTH);
        let as_set: BTreeSet<TermId> = ranked.iter().cloned().collect();
        prop_assert_eq!(as_set.len(), ranked.len());
        prop_assert_eq!(as_set, ontology.ancestors(&seed, FULL_DEPTH));
        // the most specific ancestor is a direct parent
        if let Some(first) = ranked.first() {
            prop_assert!(ontology.ancestors(&seed, 1).contains(first));
        }
    }
}

// ============================================================================
// Simplify
// ============================================================================

proptest! {
    #[test]
    fn simplify_is_subset_antichain((ontology, _) in dag_strategy(), picks in subset_strategy()) {
        let ids = ids_in(&ontology, &picks);
        let input: BTreeSet<TermId> = ids.iter().cloned().collect();
        let kept = ontology.simplify(&ids);

        prop_assert!(kept.is_subset(&input));
        prop_assert!(!kept.is_empty());
        for a in &kept {
            let ancestors = ontology.ancestors(std::slice::from_ref(a), FULL_DEPTH);
            for b in &kept {
                prop_assert!(!ancestors.contains(b), "{} is an ancestor of {}", b, a);
            }
        }
    }

    #[test]
    fn simplify_is_idempotent((ontology, _) in dag_strategy(), picks in subset_strategy()) {
        let once: Vec<TermId> = ontology.simplify(&ids_in(&ontology, &picks)).into_iter().collect();
        let twice: Vec<TermId> = ontology.simplify(&once).into_iter().collect();
        prop_assert_eq!(once, twice);
    }
}

// ============================================================================
// Onset algebra
// ============================================================================

fn bound() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-1.0f64..100.0).prop_map(Some),
    ]
}

fn interval() -> impl Strategy<Value = OnsetInterval> {
    prop_oneof![
        (bound(), bound()).prop_map(|(min, max)| OnsetInterval { min, max }),
        prop::sample::select(AgeClass::ALL.to_vec()).prop_map(AgeClass::interval),
    ]
}

proptest! {
    #[test]
    fn union_commutative(a in interval(), b in interval()) {
        prop_assert_eq!(a.union(b), b.union(a));
    }

    #[test]
    fn union_associative(a in interval(), b in interval(), c in interval()) {
        prop_assert_eq!(a.union(b).union(c), a.union(b.union(c)));
    }

    #[test]
    fn union_idempotent(a in interval()) {
        prop_assert_eq!(a.union(a), a);
    }

    #[test]
    fn union_widens(a in interval(), b in interval()) {
        let u = a.union(b);
        if let (Some(um), Some(am)) = (u.min, a.min) {
            prop_assert!(um <= am);
        }
        if let (Some(ux), Some(ax)) = (u.max, a.max) {
            prop_assert!(ux >= ax);
        }
        if a.min.is_none() {
            prop_assert!(u.min.is_none());
        }
    }
}

#[test]
fn antenatal_union_adult() {
    let got = AgeClass::Antenatal.interval().union(AgeClass::Adult.interval());
    assert_eq!(got, OnsetInterval::bounded(-0.5, 65.0));
}
