//! Fuzz target for onset tokens and interval folding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_core::onset::{AgeClass, OnsetDescriptor, OnsetInterval};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = AgeClass::parse(&text);

    let descriptors: Vec<OnsetDescriptor> = text
        .split(';')
        .map(|token| OnsetDescriptor::Class(token.to_string()))
        .collect();
    if let Ok(interval) = OnsetInterval::from_descriptors(&descriptors) {
        assert_eq!(interval.union(interval), interval);
    }
});
