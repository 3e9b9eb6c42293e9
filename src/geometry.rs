//! Box types and the overlap measure used by suppression.
//!
//! Two box forms appear in the pipeline. [`NormalizedBox`] holds corner
//! coordinates relative to the model input (nominally 0..1, although decoded
//! boxes may extend past the edges). [`BoundingBox`] is the projected form in
//! an output coordinate space, stored as top-left corner plus extent.
//!
//! IoU follows a single convention everywhere: boxes are real-valued
//! half-open rectangles `[x, x + width) × [y, y + height)`, so two boxes that
//! only share an edge do not overlap, and no `+1` pixel correction is applied.

use crate::util::math::overlap_1d;

/// Width and height of an output coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Creates a frame size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Corner-form box in model-relative coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    pub ymin: f32,
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
}

impl NormalizedBox {
    /// Scales the box into `frame` coordinates.
    pub fn project(&self, frame: FrameSize) -> BoundingBox {
        let fw = frame.width as f32;
        let fh = frame.height as f32;
        BoundingBox {
            x: self.xmin * fw,
            y: self.ymin * fh,
            width: (self.xmax - self.xmin) * fw,
            height: (self.ymax - self.ymin) * fh,
        }
    }
}

/// Axis-aligned box in an output coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Creates a box from its top-left corner and extent.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the box; zero for degenerate or inverted extents.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Area shared with `other`.
    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let w = overlap_1d(self.x, self.x + self.width, other.x, other.x + other.width);
        let h = overlap_1d(
            self.y,
            self.y + self.height,
            other.y,
            other.y + other.height,
        );
        w * h
    }

    /// Intersection over union with `other`.
    ///
    /// Returns 0 when the union is empty, so degenerate boxes never suppress
    /// anything.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = self.intersection(other);
        let union = self.area() + other.area() - inter;
        if union.is_nan() || union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, FrameSize, NormalizedBox};

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_edge_touching_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_shifted_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_boxes_have_zero_iou() {
        let a = BoundingBox::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn project_scales_corners() {
        let nb = NormalizedBox {
            ymin: 0.25,
            xmin: 0.5,
            ymax: 0.75,
            xmax: 1.0,
        };
        let b = nb.project(FrameSize::new(640, 480));
        assert_eq!(b, BoundingBox::new(320.0, 120.0, 320.0, 240.0));
    }
}
