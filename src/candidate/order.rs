//! Deterministic score ordering for candidates.

use crate::candidate::Candidate;
use std::cmp::Ordering;

/// Descending score; ties fall back to discovery order (anchor, then class).
pub(crate) fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.anchor.cmp(&b.anchor))
        .then_with(|| a.class_id.cmp(&b.class_id))
}

/// Sorts candidates by descending score with deterministic tie-breaking.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}

/// Keeps the `k` best candidates, in no particular order.
///
/// `k == 0` disables the cap.
pub(crate) fn cap_top_k(candidates: &mut Vec<Candidate>, k: usize) {
    if k == 0 || candidates.len() <= k {
        return;
    }
    candidates.select_nth_unstable_by(k - 1, candidate_cmp_desc);
    candidates.truncate(k);
}
