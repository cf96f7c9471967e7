//! # spin-view
//!
//! Turn an ordered sequence of still images into a spinnable 360° object
//! viewer: dragging, touching or scrolling across the container swaps the
//! visible frame to simulate rotation.
//!
//! This crate provides platform-agnostic state and logic for:
//! - Mapping drag offsets and wheel ticks to frame changes
//! - Wrapping or clamping frame indices
//! - Stepped turns and autoplay, driven by host timers
//! - Keeping exactly one frame visible on a [`FrameSurface`]
//! - Binding all of the above to the DOM (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for configuration
//! - `toml` - Load [`ViewerConfig`] from TOML
//! - `web` - Enable DOM mounting, event listeners and wasm exports
//! - `console_error` - Install a panic hook that logs to the browser console
//!
//! ## Example
//!
//! ```rust
//! use spin_view::{ContainerSize, MemorySurface, SpinViewer, ViewerConfig, WheelDelta};
//!
//! let surface = MemorySurface::new(36, ContainerSize::new(720.0, 480.0));
//! let config = ViewerConfig {
//!     cycle: false,
//!     ..Default::default()
//! };
//! let mut viewer = SpinViewer::new(surface, config).unwrap();
//!
//! viewer.on_change(|frame, total| println!("frame {} of {}", frame + 1, total));
//! viewer.wheel(WheelDelta::from_delta_y(-100.0)).unwrap();
//! assert_eq!(viewer.current_frame(), 0);
//!
//! viewer.go_to(12).unwrap();
//! assert_eq!(viewer.surface().visible_frames(), vec![12]);
//! ```
//!
//! In a browser build, mount on a container holding `<img>` frames:
//!
//! ```rust,ignore
//! let widget = spin_view::mount("product", ViewerConfig::default())?;
//! ```

mod animation;
mod config;
mod error;
mod frames;
mod gesture;
mod input;
mod sizing;
pub mod surface;
mod viewer;

#[cfg(feature = "web")]
pub mod widget;

pub use animation::{SequenceState, Step, StepSchedule, StepSequencer, StepToken};
pub use config::{ConfigUpdate, ViewerConfig, DEFAULT_PLAY_SPEED_MS, DEFAULT_SPEED_MS};
pub use error::{Result, SpinError};
pub use frames::FrameRange;
pub use gesture::DragTracker;
pub use input::{Axis, InputModality, PointerSample, WheelDelta};
pub use sizing::{frame_delta, ContainerSize};
pub use surface::{FrameSurface, MemorySurface};
pub use viewer::{ChangeCallback, SpinViewer};

#[cfg(feature = "web")]
pub use surface::web::DomSurface;
#[cfg(feature = "web")]
pub use widget::{create, mount, SpinWidget};
