//! Auxiliary tables that parameterize the decoder.
//!
//! Both tables are parsed once at configuration time and are immutable
//! afterwards; the decoder shares them behind `Arc`s.

pub mod labels;
pub mod priors;

pub use labels::LabelTable;
pub use priors::{AnchorPrior, PriorTable};
