//! Low-level building blocks for custom decoding pipelines.
//!
//! These expose the individual stages behind [`Decoder`](crate::Decoder):
//! box decoding, score filtering, candidate assembly and suppression. Most
//! users should prefer the `Decoder` API.

pub use crate::candidate::nms::{nms, NmsParams};
pub use crate::decode::assemble::{assemble_candidates, AssembleParams};
pub use crate::decode::boxes::decode_box;
pub use crate::decode::postprocessed::decode_postprocessed;
pub use crate::decode::score::ScoreFilter;
