//! Decoder instances holding configuration and swappable tables.
//!
//! A [`Decoder`] owns its configuration and shares its label and prior tables
//! behind `Arc`s. Every decode call takes a snapshot of both tables up front,
//! so a concurrent reload swaps in new tables for later calls without touching
//! a decode already in flight. Instances share no state with each other.

use crate::candidate::nms::{nms, NmsParams};
use crate::candidate::Detection;
use crate::decode::postprocessed::{decode_postprocessed, PostprocessedOutputs};
use crate::decode::{assemble_candidates, AssembleParams, BoxScales, ScoreFilter};
use crate::geometry::FrameSize;
use crate::model::ModelSpec;
use crate::table::{LabelTable, PriorTable};
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdDecodeError, SsdDecodeResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Coordinate space detections are reported in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSpace {
    /// The model's input resolution.
    #[default]
    Model,
    /// A fixed frame size, typically the source video resolution.
    Frame(FrameSize),
}

/// Configuration for decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Network geometry.
    pub model: ModelSpec,
    /// Box-coder scales.
    pub scales: BoxScales,
    /// Minimum sigmoid confidence for a candidate.
    pub score_threshold: f32,
    /// Same-class overlap above which the weaker candidate is suppressed.
    pub iou_threshold: f32,
    /// Candidates kept for suppression, best first (0 = unlimited).
    pub max_candidates: usize,
    /// Default output coordinate space.
    pub output: OutputSpace,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        let nms = NmsParams::default();
        Self {
            model: ModelSpec::default(),
            scales: BoxScales::default(),
            score_threshold: ScoreFilter::default().threshold(),
            iou_threshold: nms.iou_threshold,
            max_candidates: nms.max_candidates,
            output: OutputSpace::Model,
        }
    }
}

impl DecodeConfig {
    /// Checks the configuration for values the decoder cannot work with.
    pub fn validate(&self) -> SsdDecodeResult<()> {
        self.model.validate()?;
        self.scales.validate()?;
        ScoreFilter::new(self.score_threshold)?;
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(SsdDecodeError::InvalidConfig(
                "iou threshold must lie in [0, 1]",
            ));
        }
        if let OutputSpace::Frame(frame) = self.output {
            check_frame(frame)?;
        }
        Ok(())
    }

    fn nms_params(&self) -> NmsParams {
        NmsParams {
            iou_threshold: self.iou_threshold,
            max_candidates: self.max_candidates,
        }
    }

    fn default_frame(&self) -> FrameSize {
        match self.output {
            OutputSpace::Model => self.model.input_size(),
            OutputSpace::Frame(frame) => frame,
        }
    }
}

fn check_frame(frame: FrameSize) -> SsdDecodeResult<()> {
    if frame.width == 0 || frame.height == 0 {
        return Err(SsdDecodeError::InvalidConfig("frame size must be non-zero"));
    }
    Ok(())
}

// An overflowing product saturates; no slice is that long, so it is rejected.
fn check_batch_len(
    tensor: &'static str,
    got: usize,
    batch_size: usize,
    per_frame: usize,
) -> SsdDecodeResult<()> {
    let expected = batch_size.saturating_mul(per_frame);
    if got != expected {
        return Err(SsdDecodeError::InputLength {
            tensor,
            expected,
            got,
        });
    }
    Ok(())
}

/// Raw network outputs for a single frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    /// Box encodings, `anchor_count × 4`.
    pub boxes: &'a [f32],
    /// Class logits, `anchor_count × label_count`.
    pub predictions: &'a [f32],
    /// Output space override for this frame.
    pub frame: Option<FrameSize>,
    /// Stream tag copied onto every detection.
    pub stream_id: usize,
}

/// Raw network outputs for a batch of frames laid out back to back.
#[derive(Clone, Copy, Debug)]
pub struct BatchInput<'a> {
    /// Box encodings, `batch_size × anchor_count × 4`.
    pub boxes: &'a [f32],
    /// Class logits, `batch_size × anchor_count × label_count`.
    pub predictions: &'a [f32],
    /// Number of frames in the batch.
    pub batch_size: usize,
    /// Per-stream output sizes; empty uses the configured output space.
    pub frame_sizes: &'a [FrameSize],
}

/// SSD output decoder with its label and prior tables.
pub struct Decoder {
    cfg: DecodeConfig,
    filter: ScoreFilter,
    labels: RwLock<Option<Arc<LabelTable>>>,
    priors: RwLock<Option<Arc<PriorTable>>>,
}

impl Decoder {
    /// Creates a decoder without tables; load them before decoding.
    pub fn new(cfg: DecodeConfig) -> SsdDecodeResult<Self> {
        cfg.validate()?;
        let filter = ScoreFilter::new(cfg.score_threshold)?;
        Ok(Self {
            cfg,
            filter,
            labels: RwLock::new(None),
            priors: RwLock::new(None),
        })
    }

    /// Creates a decoder with both tables in place.
    pub fn with_tables(
        cfg: DecodeConfig,
        labels: LabelTable,
        priors: PriorTable,
    ) -> SsdDecodeResult<Self> {
        let decoder = Self::new(cfg)?;
        decoder.set_labels(labels)?;
        decoder.set_priors(priors)?;
        Ok(decoder)
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Loads and installs a label table; the previous table stays on failure.
    pub fn load_labels<P: AsRef<Path>>(&self, path: P) -> SsdDecodeResult<()> {
        let table = LabelTable::load(path, self.cfg.model.label_count)?;
        self.set_labels(table)
    }

    /// Loads and installs a prior table; the previous table stays on failure.
    pub fn load_priors<P: AsRef<Path>>(&self, path: P) -> SsdDecodeResult<()> {
        let table = PriorTable::load(path, self.cfg.model.anchor_count)?;
        self.set_priors(table)
    }

    /// Installs a label table sized for this decoder's model.
    pub fn set_labels(&self, table: LabelTable) -> SsdDecodeResult<()> {
        if table.len() != self.cfg.model.label_count {
            return Err(SsdDecodeError::TableMismatch {
                table: "label",
                expected: self.cfg.model.label_count,
                got: table.len(),
            });
        }
        *self.labels.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
        Ok(())
    }

    /// Installs a prior table sized for this decoder's model.
    pub fn set_priors(&self, table: PriorTable) -> SsdDecodeResult<()> {
        if table.len() != self.cfg.model.anchor_count {
            return Err(SsdDecodeError::TableMismatch {
                table: "prior",
                expected: self.cfg.model.anchor_count,
                got: table.len(),
            });
        }
        *self.priors.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
        Ok(())
    }

    /// Current label table, if loaded.
    pub fn labels(&self) -> Option<Arc<LabelTable>> {
        self.labels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current prior table, if loaded.
    pub fn priors(&self) -> Option<Arc<PriorTable>> {
        self.priors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true once both tables are loaded.
    pub fn is_configured(&self) -> bool {
        self.labels().is_some() && self.priors().is_some()
    }

    fn label_snapshot(&self) -> SsdDecodeResult<Arc<LabelTable>> {
        self.labels()
            .ok_or(SsdDecodeError::NotConfigured { missing: "labels" })
    }

    fn snapshot(&self) -> SsdDecodeResult<(Arc<PriorTable>, Arc<LabelTable>)> {
        let labels = self.label_snapshot()?;
        let priors = self
            .priors()
            .ok_or(SsdDecodeError::NotConfigured {
                missing: "box priors",
            })?;
        Ok((priors, labels))
    }

    /// Decodes one frame into the configured output space as stream 0.
    pub fn decode(&self, boxes: &[f32], predictions: &[f32]) -> SsdDecodeResult<Vec<Detection>> {
        self.decode_frame(&FrameInput {
            boxes,
            predictions,
            frame: None,
            stream_id: 0,
        })
    }

    /// Decodes one frame: candidate assembly followed by suppression.
    pub fn decode_frame(&self, input: &FrameInput<'_>) -> SsdDecodeResult<Vec<Detection>> {
        let (priors, labels) = self.snapshot()?;
        let frame = match input.frame {
            Some(frame) => {
                check_frame(frame)?;
                frame
            }
            None => self.cfg.default_frame(),
        };
        self.decode_stream(
            &priors,
            &labels,
            input.boxes,
            input.predictions,
            frame,
            input.stream_id,
        )
    }

    /// Decodes every frame of a batch; result `i` holds stream `i`.
    ///
    /// With the `rayon` feature streams are decoded in parallel. The output
    /// is identical either way.
    pub fn decode_batch(&self, batch: &BatchInput<'_>) -> SsdDecodeResult<Vec<Vec<Detection>>> {
        let _span = trace_span!("decode_batch", batch_size = batch.batch_size).entered();
        let (priors, labels) = self.snapshot()?;
        let spec = &self.cfg.model;

        let boxes_len = spec.boxes_len();
        let predictions_len = spec.predictions_len();
        check_batch_len("boxes", batch.boxes.len(), batch.batch_size, boxes_len)?;
        check_batch_len(
            "predictions",
            batch.predictions.len(),
            batch.batch_size,
            predictions_len,
        )?;
        if !batch.frame_sizes.is_empty() && batch.frame_sizes.len() != batch.batch_size {
            return Err(SsdDecodeError::FrameSizeCount {
                expected: batch.batch_size,
                got: batch.frame_sizes.len(),
            });
        }
        for &frame in batch.frame_sizes {
            check_frame(frame)?;
        }

        let run = |stream: usize| {
            let frame = batch
                .frame_sizes
                .get(stream)
                .copied()
                .unwrap_or_else(|| self.cfg.default_frame());
            let boxes = &batch.boxes[stream * boxes_len..(stream + 1) * boxes_len];
            let predictions =
                &batch.predictions[stream * predictions_len..(stream + 1) * predictions_len];
            self.decode_stream(&priors, &labels, boxes, predictions, frame, stream)
        };

        #[cfg(feature = "rayon")]
        let results: SsdDecodeResult<Vec<_>> =
            (0..batch.batch_size).into_par_iter().map(run).collect();
        #[cfg(not(feature = "rayon"))]
        let results: SsdDecodeResult<Vec<_>> = (0..batch.batch_size).map(run).collect();
        results
    }

    /// Maps the outputs of an in-graph post-processor to detections.
    ///
    /// `frame` overrides the configured output space.
    pub fn decode_postprocessed(
        &self,
        outputs: &PostprocessedOutputs<'_>,
        frame: Option<FrameSize>,
    ) -> SsdDecodeResult<Vec<Detection>> {
        let labels = self.label_snapshot()?;
        let frame = match frame {
            Some(frame) => {
                check_frame(frame)?;
                frame
            }
            None => self.cfg.default_frame(),
        };
        decode_postprocessed(&labels, outputs, frame, 0)
    }

    fn decode_stream(
        &self,
        priors: &PriorTable,
        labels: &LabelTable,
        boxes: &[f32],
        predictions: &[f32],
        frame: FrameSize,
        stream_id: usize,
    ) -> SsdDecodeResult<Vec<Detection>> {
        let _span = trace_span!("decode_frame", stream = stream_id).entered();
        let params = AssembleParams {
            spec: self.cfg.model,
            scales: self.cfg.scales,
            filter: self.filter,
            frame,
        };
        let candidates = assemble_candidates(priors, labels, boxes, predictions, &params)?;
        let found = candidates.len();
        let kept = nms(candidates, self.cfg.nms_params());
        trace_event!(
            "frame_decoded",
            stream = stream_id,
            candidates = found,
            detections = kept.len()
        );
        Ok(kept
            .into_iter()
            .map(|candidate| Detection::from_candidate(stream_id, candidate))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeConfig, Decoder, OutputSpace};
    use crate::geometry::FrameSize;
    use crate::util::{ErrorKind, SsdDecodeError};

    #[test]
    fn default_config_is_valid() {
        assert!(DecodeConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_thresholds_and_frames() {
        let cfg = DecodeConfig {
            iou_threshold: -0.1,
            ..DecodeConfig::default()
        };
        assert_eq!(cfg.validate().unwrap_err().kind(), ErrorKind::Config);
        let cfg = DecodeConfig {
            output: OutputSpace::Frame(FrameSize::new(0, 480)),
            ..DecodeConfig::default()
        };
        assert!(Decoder::new(cfg).is_err());
    }

    #[test]
    fn unconfigured_decoder_refuses_to_decode() {
        let decoder = Decoder::new(DecodeConfig::default()).unwrap();
        assert!(!decoder.is_configured());
        let err = decoder.decode(&[], &[]).unwrap_err();
        assert_eq!(err, SsdDecodeError::NotConfigured { missing: "labels" });
        assert_eq!(err.kind(), ErrorKind::Contract);
    }
}
