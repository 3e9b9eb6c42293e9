//! Detection candidates and their pruning.
//!
//! Includes score ordering, the top-N cap and class-aware non-maximum
//! suppression.

pub(crate) mod nms;
pub(crate) mod order;

use crate::geometry::BoundingBox;
use std::sync::Arc;

/// A scored, labeled box produced before suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Class index into the label table (never 0).
    pub class_id: usize,
    /// Label of `class_id`.
    pub label: Arc<str>,
    /// Box in the output coordinate space.
    pub bbox: BoundingBox,
    /// Sigmoid confidence.
    pub score: f32,
    /// Anchor the candidate was decoded from; orders ties.
    pub anchor: usize,
}

/// A final detection handed to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// Stream the detection belongs to (0 for unbatched input).
    pub stream_id: usize,
    /// Class index into the label table.
    pub class_id: usize,
    /// Label of `class_id`.
    pub label: Arc<str>,
    /// Box in the output coordinate space.
    pub bbox: BoundingBox,
    /// Confidence in `[0, 1]`.
    pub score: f32,
}

impl Detection {
    pub(crate) fn from_candidate(stream_id: usize, candidate: Candidate) -> Self {
        Self {
            stream_id,
            class_id: candidate.class_id,
            label: candidate.label,
            bbox: candidate.bbox,
            score: candidate.score,
        }
    }
}
