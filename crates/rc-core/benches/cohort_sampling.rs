//! Criterion benchmarks for ontology closure and cohort sampling.
//!
//! Uses a synthetic layered DAG and a synthetic annotation table so the
//! numbers do not depend on external data files.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rc_common::{FrequencyBand, TermId};
use rc_config::{get_preset, PresetName};
use rc_core::annotation::{AnnotationSet, DiseaseAnnotation, PhenotypeAnnotation};
use rc_core::cohort::{CohortAssembler, CohortRequest};
use rc_core::onset::{AgeClass, OnsetDescriptor};
use rc_core::ontology::{Ontology, OntologyBuilder, OntologyQuery, FULL_DEPTH};

// ── Helpers ──────────────────────────────────────────────────────────

fn term_id(i: usize) -> String {
    format!("HP:{:07}", i)
}

/// `layers` levels of `width` terms under a single root; each term has up to
/// two parents in the previous layer.
fn layered_ontology(layers: usize, width: usize) -> Ontology {
    let mut builder = OntologyBuilder::new().term(term_id(0), "root");
    for layer in 0..layers {
        for j in 0..width {
            let id = 1 + layer * width + j;
            builder = builder.term(term_id(id), format!("term {}", id));
            if layer == 0 {
                builder = builder.edge(term_id(0), term_id(id));
            } else {
                let prev = 1 + (layer - 1) * width;
                builder = builder.edge(term_id(prev + j), term_id(id));
                builder = builder.edge(term_id(prev + (j + 1) % width), term_id(id));
            }
        }
    }
    builder.build().expect("layered ontology is a valid DAG")
}

fn annotation_table(ontology: &Ontology, diseases: usize, terms_per_disease: usize) -> AnnotationSet {
    let bands = [
        FrequencyBand::Obligate,
        FrequencyBand::VeryFrequent,
        FrequencyBand::Frequent,
        FrequencyBand::Occasional,
    ];
    let mut rng = StdRng::seed_from_u64(42);
    (0..diseases)
        .map(|d| {
            let mut record = DiseaseAnnotation::default();
            for k in 0..terms_per_disease {
                let term = TermId::new(term_id(rng.random_range(1..ontology.len())));
                let row = PhenotypeAnnotation::with_band(bands[k % bands.len()]);
                record.phenotype.insert(term, row);
            }
            record.age_onset = vec![OnsetDescriptor::from(AgeClass::Childhood)];
            (format!("ORPHA:{}", d), record)
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_closure(c: &mut Criterion) {
    let ontology = layered_ontology(12, 200);
    let leaves: Vec<TermId> = (0..20).map(|j| TermId::new(term_id(1 + 11 * 200 + j))).collect();

    let mut group = c.benchmark_group("ontology_closure");
    group.bench_function("ancestors_full", |b| {
        b.iter(|| ontology.ancestors(black_box(&leaves), FULL_DEPTH))
    });
    group.bench_function("ancestors_depth_2", |b| {
        b.iter(|| ontology.ancestors(black_box(&leaves), 2))
    });
    group.bench_function("simplify", |b| b.iter(|| ontology.simplify(black_box(&leaves))));
    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let ontology = layered_ontology(8, 100);
    let annotations = annotation_table(&ontology, 50, 15);
    let config = get_preset(PresetName::Default);
    let assembler = CohortAssembler::new(&ontology, &annotations, &config);

    let mut group = c.benchmark_group("cohort_assemble");
    for parallel in [false, true] {
        let request = CohortRequest::new(20).with_seed(7).with_parallel(parallel);
        let label = if parallel { "parallel" } else { "serial" };
        group.bench_with_input(BenchmarkId::new("50x20", label), &request, |b, request| {
            b.iter(|| assembler.assemble(black_box(request)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_closure, bench_assemble);
criterion_main!(benches);
