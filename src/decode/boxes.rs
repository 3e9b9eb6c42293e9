//! Anchor-relative box decoding.

use crate::geometry::NormalizedBox;
use crate::table::AnchorPrior;
use crate::util::{SsdDecodeError, SsdDecodeResult};

/// Divisors applied to the raw box encodings before decoding.
///
/// These are training hyperparameters of the box coder; the defaults match
/// the TensorFlow object-detection SSD models (`10, 10, 5, 5`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxScales {
    pub y: f32,
    pub x: f32,
    pub h: f32,
    pub w: f32,
}

impl Default for BoxScales {
    fn default() -> Self {
        Self {
            y: 10.0,
            x: 10.0,
            h: 5.0,
            w: 5.0,
        }
    }
}

impl BoxScales {
    pub(crate) fn validate(&self) -> SsdDecodeResult<()> {
        let all_valid = [self.y, self.x, self.h, self.w]
            .iter()
            .all(|s| s.is_finite() && *s > 0.0);
        if !all_valid {
            return Err(SsdDecodeError::InvalidConfig(
                "box scales must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Decodes one anchor's encoding `[dy, dx, dh, dw]` against its prior.
///
/// Non-finite encodings propagate into the result instead of being clamped.
#[inline]
pub fn decode_box(prior: &AnchorPrior, encoding: &[f32; 4], scales: &BoxScales) -> NormalizedBox {
    let [dy, dx, dh, dw] = *encoding;
    let center_y = (dy / scales.y) * prior.height + prior.center_y;
    let center_x = (dx / scales.x) * prior.width + prior.center_x;
    let half_h = (dh / scales.h).exp() * prior.height / 2.0;
    let half_w = (dw / scales.w).exp() * prior.width / 2.0;
    NormalizedBox {
        ymin: center_y - half_h,
        xmin: center_x - half_w,
        ymax: center_y + half_h,
        xmax: center_x + half_w,
    }
}
