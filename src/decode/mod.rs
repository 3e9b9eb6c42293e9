//! Per-frame decoding stages.
//!
//! `boxes` turns anchor-relative encodings into boxes, `score` turns logits
//! into confidences, and `assemble` drives both over every anchor and class.
//! `postprocessed` covers models whose graph already emits final boxes.

pub mod assemble;
pub mod boxes;
pub mod postprocessed;
pub mod score;

pub use assemble::{assemble_candidates, AssembleParams};
pub use boxes::{decode_box, BoxScales};
pub use postprocessed::{decode_postprocessed, PostprocessedOutputs};
pub use score::ScoreFilter;
