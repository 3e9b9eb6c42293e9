//! ssddecode turns raw SSD object-detection tensors into labeled boxes.
//!
//! The crate loads the two auxiliary resources an SSD model needs (a label
//! table and an anchor box-prior table), decodes anchor-relative box
//! encodings, scores class logits with a sigmoid cutoff, and removes
//! duplicate detections with class-aware greedy NMS. Batched multi-stream
//! input can be decoded in parallel via the `rayon` feature, and the
//! `tracing` feature emits spans and events for each stage.

pub mod candidate;
pub mod decode;
pub mod decoder;
pub mod geometry;
pub mod lowlevel;
pub mod model;
pub mod table;
mod trace;
pub mod util;

pub use candidate::nms::{nms, NmsParams};
pub use candidate::{Candidate, Detection};
pub use decode::{BoxScales, PostprocessedOutputs, ScoreFilter};
pub use decoder::{BatchInput, DecodeConfig, Decoder, FrameInput, OutputSpace};
pub use geometry::{BoundingBox, FrameSize, NormalizedBox};
pub use model::{ModelSpec, BOX_DIM};
pub use table::{AnchorPrior, LabelTable, PriorTable};
pub use util::{ErrorKind, SsdDecodeError, SsdDecodeResult};
