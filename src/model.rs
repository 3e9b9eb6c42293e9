//! Fixed geometry of the detection network being decoded.

use crate::geometry::FrameSize;
use crate::util::{SsdDecodeError, SsdDecodeResult};

/// Number of box-encoding values per anchor (`dy, dx, dh, dw`).
pub const BOX_DIM: usize = 4;

/// Shape parameters of an SSD network's outputs and input.
///
/// The defaults describe SSD MobileNet trained on COCO: 1917 anchors, 91
/// classes including background, and a 300×300 input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    /// Number of anchors (box priors) the network regresses against.
    pub anchor_count: usize,
    /// Number of classes per anchor, including the background class 0.
    pub label_count: usize,
    /// Model input width in pixels.
    pub input_width: u32,
    /// Model input height in pixels.
    pub input_height: u32,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            anchor_count: 1917,
            label_count: 91,
            input_width: 300,
            input_height: 300,
        }
    }
}

impl ModelSpec {
    /// Model input resolution as a frame size.
    pub fn input_size(&self) -> FrameSize {
        FrameSize::new(self.input_width, self.input_height)
    }

    /// Expected length of the box-encoding tensor for one frame.
    pub fn boxes_len(&self) -> usize {
        self.anchor_count * BOX_DIM
    }

    /// Expected length of the class-prediction tensor for one frame.
    pub fn predictions_len(&self) -> usize {
        self.anchor_count * self.label_count
    }

    pub(crate) fn validate(&self) -> SsdDecodeResult<()> {
        if self.anchor_count == 0 {
            return Err(SsdDecodeError::InvalidConfig("anchor_count must be non-zero"));
        }
        if self.label_count < 2 {
            return Err(SsdDecodeError::InvalidConfig(
                "label_count must include background and at least one class",
            ));
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(SsdDecodeError::InvalidConfig(
                "model input size must be non-zero",
            ));
        }
        Ok(())
    }
}
