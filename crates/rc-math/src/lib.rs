//! RareCrowds math utilities.

pub mod math;

pub use math::stable::*;
pub use math::gumbel::*;
pub use math::normal::*;
pub use math::poisson::*;
pub use math::rejection::{Exhausted, RejectionSampler};
