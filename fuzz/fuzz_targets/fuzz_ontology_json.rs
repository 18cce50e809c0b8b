//! Fuzz target for node-link ontology loading.
//!
//! Arbitrary graphs must either build into a valid DAG or be rejected with
//! an ontology error. A built ontology must answer closure queries.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_core::ontology::{Ontology, OntologyQuery, FULL_DEPTH};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(ontology) = Ontology::from_json(text) {
        let root = ontology.root().clone();
        let below = ontology.descendants(std::slice::from_ref(&root), FULL_DEPTH);
        assert_eq!(below.len() + 1, ontology.len());
        let ids: Vec<_> = below.into_iter().collect();
        let _ = ontology.simplify(&ids);
    }
});
