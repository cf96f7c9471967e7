//! Viewer configuration.

use crate::error::{Result, SpinError};
use crate::input::Axis;

/// Default delay between steps of `turn_to`, in milliseconds.
pub const DEFAULT_SPEED_MS: u32 = 50;
/// Default delay between autoplay steps, in milliseconds.
pub const DEFAULT_PLAY_SPEED_MS: u32 = 100;

/// Options fixed at construction, plus the mutable subset covered by [`ConfigUpdate`].
///
/// Field names serialize in camelCase so the same struct deserializes the
/// option bag a page passes in (`{ playSpeed: 80, cycle: false }`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ViewerConfig {
    /// Bind wheel events (mouse modality only)
    pub scroll: bool,
    /// Drag along the y axis instead of x
    pub vertical: bool,
    /// Invert drag and wheel direction
    pub reverse: bool,
    /// Wrap frame indices instead of clamping
    pub cycle: bool,
    /// Initial frame, normalized at construction
    pub start: i64,
    /// Delay between `turn_to` steps (ms)
    pub speed: u32,
    /// Start playing right after construction
    pub autoplay: bool,
    /// Delay between autoplay steps (ms)
    pub play_speed: u32,
    /// Explicit container width; measured when unset
    pub width: Option<f64>,
    /// Explicit container height; measured when unset
    pub height: Option<f64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scroll: false,
            vertical: false,
            reverse: false,
            cycle: true,
            start: 0,
            speed: DEFAULT_SPEED_MS,
            autoplay: false,
            play_speed: DEFAULT_PLAY_SPEED_MS,
            width: None,
            height: None,
        }
    }
}

impl ViewerConfig {
    /// Parse a TOML document into a `ViewerConfig`; missing keys take defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// The axis drags are measured along.
    #[inline]
    pub fn axis(&self) -> Axis {
        if self.vertical {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Reject values the viewer cannot work with.
    pub fn validate(&self) -> Result<()> {
        check_speed("speed", self.speed)?;
        check_speed("playSpeed", self.play_speed)?;
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        Ok(())
    }

    /// Apply the mutable subset of options in place.
    ///
    /// Nothing is changed when any provided value is invalid.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<()> {
        if let Some(speed) = update.speed {
            check_speed("speed", speed)?;
        }
        if let Some(play_speed) = update.play_speed {
            check_speed("playSpeed", play_speed)?;
        }

        self.vertical = update.vertical.unwrap_or(self.vertical);
        self.reverse = update.reverse.unwrap_or(self.reverse);
        self.cycle = update.cycle.unwrap_or(self.cycle);
        self.speed = update.speed.unwrap_or(self.speed);
        self.play_speed = update.play_speed.unwrap_or(self.play_speed);
        Ok(())
    }
}

/// Runtime-mutable options. `None` leaves the current value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ConfigUpdate {
    pub vertical: Option<bool>,
    pub reverse: Option<bool>,
    pub cycle: Option<bool>,
    pub speed: Option<u32>,
    pub play_speed: Option<u32>,
}

fn check_speed(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(SpinError::InvalidConfig(format!("{} must be at least 1 ms", name)));
    }
    Ok(())
}

fn check_dimension(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(SpinError::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            name, v
        ))),
        _ => Ok(()),
    }
}
