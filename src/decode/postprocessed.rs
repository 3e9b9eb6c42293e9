//! Decoding for models that ship their own detection post-processor.
//!
//! Such models already ran box decoding and suppression in-graph and emit
//! four tensors: boxes `[N, 4]` as `ymin, xmin, ymax, xmax`, class indices
//! `[N]`, scores `[N]` and the number of valid rows `[1]`. Their class indices
//! do not count the background class, so they are shifted by one to index the
//! label table.

use crate::candidate::Detection;
use crate::geometry::{FrameSize, NormalizedBox};
use crate::model::BOX_DIM;
use crate::table::LabelTable;
use crate::util::{SsdDecodeError, SsdDecodeResult};

/// Borrowed outputs of an in-graph detection post-processor.
#[derive(Clone, Copy, Debug)]
pub struct PostprocessedOutputs<'a> {
    /// Corner boxes, four values per row.
    pub boxes: &'a [f32],
    /// Class index per row, background excluded.
    pub classes: &'a [f32],
    /// Confidence per row.
    pub scores: &'a [f32],
    /// Number of valid rows, as emitted by the model.
    pub count: f32,
}

impl PostprocessedOutputs<'_> {
    fn valid_rows(&self) -> SsdDecodeResult<usize> {
        let count = self.count;
        if !count.is_finite() || count < 0.0 {
            return Err(SsdDecodeError::InvalidCount { count });
        }
        let rows = count as usize;
        if rows > self.scores.len()
            || rows > self.classes.len()
            || rows * BOX_DIM > self.boxes.len()
        {
            return Err(SsdDecodeError::InvalidCount { count });
        }
        Ok(rows)
    }
}

/// Maps post-processed rows to detections in `frame` coordinates.
///
/// Rows keep the model's order. Scores are passed through unfiltered.
pub fn decode_postprocessed(
    labels: &LabelTable,
    outputs: &PostprocessedOutputs<'_>,
    frame: FrameSize,
    stream_id: usize,
) -> SsdDecodeResult<Vec<Detection>> {
    let rows = outputs.valid_rows()?;
    let mut detections = Vec::with_capacity(rows);
    for row in 0..rows {
        let raw_class = outputs.classes[row];
        if !raw_class.is_finite() || raw_class < 0.0 {
            return Err(SsdDecodeError::InvalidClassValue { value: raw_class });
        }
        let class_id = raw_class as usize + 1;
        let label = labels.get(class_id).ok_or(SsdDecodeError::ClassOutOfRange {
            class_id,
            label_count: labels.len(),
        })?;
        let b = &outputs.boxes[row * BOX_DIM..(row + 1) * BOX_DIM];
        let corners = NormalizedBox {
            ymin: b[0],
            xmin: b[1],
            ymax: b[2],
            xmax: b[3],
        };
        detections.push(Detection {
            stream_id,
            class_id,
            label: label.clone(),
            bbox: corners.project(frame),
            score: outputs.scores[row],
        });
    }
    Ok(detections)
}
