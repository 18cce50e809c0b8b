//! Fuzz target for disease annotation parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_core::annotation::AnnotationSet;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(set) = AnnotationSet::from_json(text) {
        for (id, record) in set.iter() {
            let _ = record.validate(id);
            for row in record.phenotype.values() {
                let _ = row.band();
            }
        }
    }
});
