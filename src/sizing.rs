//! Container sizing and pixel-to-frame conversion.

use crate::error::{Result, SpinError};
use crate::input::Axis;

/// Effective size of the frame area in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Combine explicit dimensions with the measured box.
    ///
    /// Explicit values win; the measured box fills whatever is unset.
    pub fn resolve(width: Option<f64>, height: Option<f64>, measured: ContainerSize) -> Self {
        Self {
            width: width.unwrap_or(measured.width),
            height: height.unwrap_or(measured.height),
        }
    }

    /// Length along the given axis.
    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Pixels of drag needed to move one frame along `axis`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use spin_view::{Axis, ContainerSize};
    ///
    /// let size = ContainerSize::new(720.0, 480.0);
    /// assert_eq!(size.frame_step(Axis::Horizontal, 36).unwrap(), 20.0);
    /// ```
    pub fn frame_step(&self, axis: Axis, frame_count: usize) -> Result<f64> {
        let length = self.along(axis);
        if frame_count == 0 {
            return Err(SpinError::NoFrames);
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(SpinError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(length / frame_count as f64)
    }
}

/// Whole frames covered by a pixel offset, rounded toward negative infinity.
///
/// A drag of 0.5 steps to the right is still frame 0; half a step to the
/// left is already frame -1.
#[inline]
pub fn frame_delta(offset: f64, frame_step: f64) -> i64 {
    (offset / frame_step).floor() as i64
}
