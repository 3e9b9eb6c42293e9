//! Logit-to-confidence conversion and thresholding.

use crate::util::math::sigmoid;
use crate::util::{SsdDecodeError, SsdDecodeResult};

/// Converts raw class logits to scores and keeps those above a cutoff.
///
/// The cutoff is a heuristic carried over from the TensorFlow demo app. It
/// drops good detections on some models and lets noise through on others,
/// so it is configuration rather than a constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreFilter {
    threshold: f32,
}

impl Default for ScoreFilter {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl ScoreFilter {
    /// Creates a filter keeping scores `>= threshold`.
    pub fn new(threshold: f32) -> SsdDecodeResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SsdDecodeError::InvalidConfig(
                "score threshold must lie in [0, 1]",
            ));
        }
        Ok(Self { threshold })
    }

    /// The configured cutoff.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Confidence for a raw logit.
    #[inline]
    pub fn score(&self, logit: f32) -> f32 {
        sigmoid(logit)
    }

    /// Returns the confidence if it passes the cutoff.
    #[inline]
    pub fn apply(&self, logit: f32) -> Option<f32> {
        let score = sigmoid(logit);
        (score >= self.threshold).then_some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreFilter;

    #[test]
    fn keeps_scores_at_threshold() {
        let filter = ScoreFilter::default();
        assert_eq!(filter.apply(0.0), Some(0.5));
        assert!(filter.apply(-0.01).is_none());
    }

    #[test]
    fn nan_logits_are_dropped() {
        assert!(ScoreFilter::default().apply(f32::NAN).is_none());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(ScoreFilter::new(1.5).is_err());
        assert!(ScoreFilter::new(f32::NAN).is_err());
        assert!(ScoreFilter::new(0.0).is_ok());
    }
}
