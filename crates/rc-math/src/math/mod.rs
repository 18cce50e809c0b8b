//! Core math modules.

pub mod stable;
pub mod gumbel;
pub mod normal;
pub mod poisson;
pub mod rejection;
