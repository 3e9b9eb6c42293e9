//! Candidate assembly over every anchor and non-background class.

use crate::candidate::Candidate;
use crate::decode::boxes::{decode_box, BoxScales};
use crate::decode::score::ScoreFilter;
use crate::geometry::FrameSize;
use crate::model::{ModelSpec, BOX_DIM};
use crate::table::{LabelTable, PriorTable};
use crate::util::{SsdDecodeError, SsdDecodeResult};

/// Parameters for one assembly pass.
#[derive(Clone, Copy, Debug)]
pub struct AssembleParams {
    /// Network geometry the tensors were produced by.
    pub spec: ModelSpec,
    /// Box-coder scales.
    pub scales: BoxScales,
    /// Score cutoff.
    pub filter: ScoreFilter,
    /// Output coordinate space for the boxes.
    pub frame: FrameSize,
}

/// Checks the per-frame tensors and tables against the model geometry.
pub(crate) fn check_inputs(
    spec: &ModelSpec,
    priors: &PriorTable,
    labels: &LabelTable,
    boxes: &[f32],
    predictions: &[f32],
) -> SsdDecodeResult<()> {
    if priors.len() != spec.anchor_count {
        return Err(SsdDecodeError::TableMismatch {
            table: "prior",
            expected: spec.anchor_count,
            got: priors.len(),
        });
    }
    if labels.len() != spec.label_count {
        return Err(SsdDecodeError::TableMismatch {
            table: "label",
            expected: spec.label_count,
            got: labels.len(),
        });
    }
    if boxes.len() != spec.boxes_len() {
        return Err(SsdDecodeError::InputLength {
            tensor: "boxes",
            expected: spec.boxes_len(),
            got: boxes.len(),
        });
    }
    if predictions.len() != spec.predictions_len() {
        return Err(SsdDecodeError::InputLength {
            tensor: "predictions",
            expected: spec.predictions_len(),
            got: predictions.len(),
        });
    }
    Ok(())
}

/// Decodes every (anchor, class) pair that passes the score filter.
///
/// `boxes` holds `anchor_count × 4` encodings and `predictions` holds
/// `anchor_count × label_count` logits, both anchor-major. Class 0 is
/// skipped. Candidates come out in discovery order.
pub fn assemble_candidates(
    priors: &PriorTable,
    labels: &LabelTable,
    boxes: &[f32],
    predictions: &[f32],
    params: &AssembleParams,
) -> SsdDecodeResult<Vec<Candidate>> {
    let spec = &params.spec;
    check_inputs(spec, priors, labels, boxes, predictions)?;

    let mut candidates = Vec::new();
    let encodings = boxes.chunks_exact(BOX_DIM);
    let logits = predictions.chunks_exact(spec.label_count);
    for (anchor, ((prior, encoding), class_logits)) in
        priors.as_slice().iter().zip(encodings).zip(logits).enumerate()
    {
        let encoding = [encoding[0], encoding[1], encoding[2], encoding[3]];
        // Decode lazily: most anchors have no class above the cutoff.
        let mut decoded = None;
        for (class_id, (&logit, label)) in class_logits
            .iter()
            .zip(labels.as_slice())
            .enumerate()
            .skip(1)
        {
            let Some(score) = params.filter.apply(logit) else {
                continue;
            };
            let bbox = *decoded.get_or_insert_with(|| {
                decode_box(prior, &encoding, &params.scales).project(params.frame)
            });
            candidates.push(Candidate {
                class_id,
                label: label.clone(),
                bbox,
                score,
                anchor,
            });
        }
    }

    Ok(candidates)
}
