//! Class-aware greedy non-maximum suppression.

use crate::candidate::order::{cap_top_k, sort_candidates_desc};
use crate::candidate::Candidate;
use crate::trace::{trace_event, trace_span};

/// Suppression parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsParams {
    /// A candidate is dropped when a better one of the same class overlaps
    /// it by strictly more than this IoU.
    pub iou_threshold: f32,
    /// Only the best `max_candidates` take part in suppression (0 = all).
    ///
    /// Bounds the quadratic overlap scan at the cost of recall on crowded
    /// frames.
    pub max_candidates: usize,
}

impl Default for NmsParams {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            max_candidates: 100,
        }
    }
}

/// Suppresses overlapping candidates of the same class.
///
/// Candidates are capped, sorted by descending score (ties by anchor then
/// class), and walked greedily: each surviving candidate removes every later
/// candidate of its class whose IoU with it exceeds the threshold. Survivors
/// are returned in score order.
pub fn nms(mut candidates: Vec<Candidate>, params: NmsParams) -> Vec<Candidate> {
    let _span = trace_span!("nms", input = candidates.len()).entered();

    cap_top_k(&mut candidates, params.max_candidates);
    sort_candidates_desc(&mut candidates);

    let mut suppressed = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        let (head, tail) = candidates.split_at(i + 1);
        let best = &head[i];
        for (offset, other) in tail.iter().enumerate() {
            let j = i + 1 + offset;
            if suppressed[j] || other.class_id != best.class_id {
                continue;
            }
            if best.bbox.iou(&other.bbox) > params.iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    let kept: Vec<Candidate> = candidates
        .into_iter()
        .zip(suppressed)
        .filter_map(|(candidate, gone)| (!gone).then_some(candidate))
        .collect();
    trace_event!("nms_done", kept = kept.len());
    kept
}
