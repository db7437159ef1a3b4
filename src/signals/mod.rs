//! Bias scoring and classification.

pub mod decision;
pub mod scoring;

pub use decision::*;
pub use scoring::*;
