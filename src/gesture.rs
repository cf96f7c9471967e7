//! Drag gesture tracking.

use crate::input::{Axis, PointerSample};
use crate::sizing::frame_delta;

/// State of one drag gesture.
///
/// The tracker only produces frame deltas relative to the frame the gesture
/// started on; turning the delta into a frame index is the caller's job.
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    /// Axis and pointer offset recorded on press; `None` when not dragging
    origin: Option<(Axis, f64)>,
    /// Frame shown when the gesture started
    anchor_frame: usize,
    /// Last delta handed out during this gesture
    last_delta: Option<i64>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter drag mode.
    pub fn begin(&mut self, sample: PointerSample, axis: Axis, current_frame: usize) {
        self.origin = Some((axis, sample.along(axis)));
        self.anchor_frame = current_frame;
        self.last_delta = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Axis recorded when the gesture started.
    #[inline]
    pub fn axis(&self) -> Option<Axis> {
        self.origin.map(|(axis, _)| axis)
    }

    #[inline]
    pub fn anchor_frame(&self) -> usize {
        self.anchor_frame
    }

    /// Frame delta for a pointer move, or `None` when not dragging or when
    /// the delta equals the one already applied.
    pub fn update(&mut self, sample: PointerSample, reverse: bool, frame_step: f64) -> Option<i64> {
        let (axis, origin) = self.origin?;
        let mut offset = sample.along(axis) - origin;
        if reverse {
            offset = -offset;
        }

        let delta = frame_delta(offset, frame_step);
        if self.last_delta == Some(delta) {
            return None;
        }
        self.last_delta = Some(delta);
        Some(delta)
    }

    /// Leave drag mode and anchor the next gesture at `current_frame`.
    ///
    /// Returns `false` when no gesture was in progress.
    pub fn end(&mut self, current_frame: usize) -> bool {
        let was_dragging = self.origin.take().is_some();
        self.anchor_frame = current_frame;
        self.last_delta = None;
        was_dragging
    }
}
