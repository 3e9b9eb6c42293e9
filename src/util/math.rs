//! Scalar helpers shared by the decoder stages.

/// Logistic sigmoid, `1 / (1 + e^-x)`.
///
/// NaN inputs yield NaN; infinities saturate to 0 or 1.
#[inline]
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Length of the overlap between `[a0, a1)` and `[b0, b1)`, clamped at zero.
#[inline]
pub(crate) fn overlap_1d(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}
