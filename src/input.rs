//! Platform-neutral input samples.

/// Axis a drag is measured along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Which family of events drives the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputModality {
    /// touchstart / touchmove / touchend
    Touch,
    /// mousedown / mousemove / mouseup, plus wheel when enabled
    Mouse,
}

impl InputModality {
    /// Event names for (start, move, end).
    pub fn event_names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            InputModality::Touch => ("touchstart", "touchmove", "touchend"),
            InputModality::Mouse => ("mousedown", "mousemove", "mouseup"),
        }
    }
}

/// Pointer position relative to the container's top-left corner, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a sample from page-level client coordinates and the container offset.
    pub fn from_client(client_x: f64, client_y: f64, offset_left: f64, offset_top: f64) -> Self {
        Self {
            x: client_x - offset_left,
            y: client_y - offset_top,
        }
    }

    /// Coordinate along the given axis.
    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Raw wheel readings. Browsers disagree on which field carries the motion,
/// so all three are kept and reduced to a unit step by [`WheelDelta::direction`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelDelta {
    /// `WheelEvent.deltaY`
    pub delta_y: f64,
    /// `DOMMouseScroll` `detail`
    pub detail: f64,
    /// legacy `mousewheel` `wheelDelta` (opposite sign)
    pub wheel_delta: f64,
}

impl WheelDelta {
    pub fn from_delta_y(delta_y: f64) -> Self {
        Self {
            delta_y,
            ..Default::default()
        }
    }

    /// +1 or -1 for the first non-zero reading, `None` when there is no motion.
    pub fn direction(&self) -> Option<i64> {
        [self.delta_y, self.detail, -self.wheel_delta]
            .into_iter()
            .find(|v| *v != 0.0 && v.is_finite())
            .map(|v| if v > 0.0 { 1 } else { -1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_along_axis() {
        let p = PointerSample::from_client(150.0, 90.0, 50.0, 40.0);
        assert_eq!(p.along(Axis::Horizontal), 100.0);
        assert_eq!(p.along(Axis::Vertical), 50.0);
    }

    #[test]
    fn test_wheel_direction_precedence() {
        assert_eq!(WheelDelta::from_delta_y(53.0).direction(), Some(1));
        assert_eq!(WheelDelta::from_delta_y(-0.5).direction(), Some(-1));

        let legacy = WheelDelta {
            wheel_delta: 120.0,
            ..Default::default()
        };
        assert_eq!(legacy.direction(), Some(-1));

        let firefox = WheelDelta {
            detail: 3.0,
            wheel_delta: 120.0,
            ..Default::default()
        };
        assert_eq!(firefox.direction(), Some(1));
    }

    #[test]
    fn test_wheel_without_motion() {
        assert_eq!(WheelDelta::default().direction(), None);
        assert_eq!(WheelDelta::from_delta_y(f64::NAN).direction(), None);
    }

    #[test]
    fn test_modality_event_names() {
        assert_eq!(InputModality::Touch.event_names().0, "touchstart");
        assert_eq!(InputModality::Mouse.event_names().2, "mouseup");
    }
}
