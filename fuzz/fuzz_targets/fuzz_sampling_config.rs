//! Fuzz target for sampling.json configuration parsing.
//!
//! Parsing and validation must return errors, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_config::{validate_sampling, SamplingConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<SamplingConfig>(data) {
        let _ = validate_sampling(&config);
        let _ = config.poisson_lambda();
    }
});
