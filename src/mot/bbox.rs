//! Bounding boxes in pixel and normalized space, and the conversion between
//! them.

use std::marker::PhantomData;

use super::space::{Normalized, Pixel};

/// A box anchored at its top-left corner: `(x, y, width, height)`.
///
/// This is the shape ground-truth rows use. Like the rest of the pipeline it
/// accepts any values; callers decide what counts as degenerate.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

/// A box anchored at its center: `(cx, cy, width, height)`.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxCXCYWH<TSpace> {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

/// A ground-truth box in absolute pixels.
pub type PixelBox = BBoxXYWH<Pixel>;

/// A label box as written to YOLO label files.
pub type NormalizedBox = BBoxCXCYWH<Normalized>;

impl<TSpace> BBoxXYWH<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            _space: PhantomData,
        }
    }

    /// Returns true if all four fields are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

impl<TSpace> BBoxCXCYWH<TSpace> {
    #[inline]
    pub fn new(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            cx,
            cy,
            w,
            h,
            _space: PhantomData,
        }
    }
}

impl BBoxXYWH<Pixel> {
    /// Converts a pixel box into a normalized center box for a frame of the
    /// given size.
    ///
    /// Each field is clamped to `[0, 1]`, since tracking boxes routinely
    /// stick out of the frame. Returns `None` when the frame size is not
    /// positive or when the clamped width or height is not positive.
    ///
    /// Degeneracy is judged on the exact value, before any rounding for
    /// output: a sub-pixel box survives and may print as `0.000000`.
    pub fn normalize_clamped(
        &self,
        frame_width: f64,
        frame_height: f64,
    ) -> Option<BBoxCXCYWH<Normalized>> {
        if !(frame_width > 0.0 && frame_height > 0.0) {
            return None;
        }

        let cx = clamp_unit((self.x + self.w / 2.0) / frame_width);
        let cy = clamp_unit((self.y + self.h / 2.0) / frame_height);
        let w = clamp_unit(self.w / frame_width);
        let h = clamp_unit(self.h / frame_height);

        // NaN fails both comparisons and is dropped here too.
        if !(w > 0.0 && h > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return None;
        }

        Some(BBoxCXCYWH::new(cx, cy, w, h))
    }
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

impl<TSpace> std::fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

impl<TSpace> std::fmt::Debug for BBoxCXCYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxCXCYWH")
            .field("cx", &self.cx)
            .field("cy", &self.cy)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}
