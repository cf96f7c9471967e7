//! Frame presentation backends.
//!
//! The viewer never touches the DOM directly. It drives a [`FrameSurface`],
//! which knows how many frames there are and how to show or hide one of them.
//! [`MemorySurface`] keeps everything in memory for headless use; the `web`
//! feature adds [`web::DomSurface`] over a container's `<img>` children.

use crate::error::{Result, SpinError};
use crate::sizing::ContainerSize;

/// A container of ordered frames, exactly one of which the viewer keeps visible.
pub trait FrameSurface {
    /// Number of frames in the container.
    fn frame_count(&self) -> usize;

    /// Measured size of the container box.
    fn measure(&self) -> ContainerSize;

    /// Apply container layout and hide every frame.
    fn prepare(&mut self) -> Result<()>;

    /// Show or hide a single frame.
    fn set_frame_visible(&mut self, index: usize, visible: bool) -> Result<()>;

    /// Show or hide the whole container.
    fn set_visible(&mut self, visible: bool) -> Result<()>;
}

/// In-memory surface recording frame and container visibility.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    frames: Vec<bool>,
    size: ContainerSize,
    visible: bool,
    prepared: bool,
}

impl MemorySurface {
    /// Create a surface with `frame_count` frames, all initially visible
    /// (as images are before the viewer takes over).
    pub fn new(frame_count: usize, size: ContainerSize) -> Self {
        Self {
            frames: vec![true; frame_count],
            size,
            visible: true,
            prepared: false,
        }
    }

    /// Indices of all currently visible frames.
    pub fn visible_frames(&self) -> Vec<usize> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, visible)| **visible)
            .map(|(i, _)| i)
            .collect()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

impl FrameSurface for MemorySurface {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn measure(&self) -> ContainerSize {
        self.size
    }

    fn prepare(&mut self) -> Result<()> {
        self.frames.iter_mut().for_each(|f| *f = false);
        self.prepared = true;
        Ok(())
    }

    fn set_frame_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        let frame = self
            .frames
            .get_mut(index)
            .ok_or_else(|| SpinError::Dom(format!("no frame at index {}", index)))?;
        *frame = visible;
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.visible = visible;
        Ok(())
    }
}

/// DOM-backed surface.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    /// Tag name of frame elements inside the container.
    pub const FRAME_TAG: &str = "img";

    /// Frames are the container's `<img>` descendants, in document order.
    ///
    /// The list is captured once at construction; images added later are not
    /// picked up.
    #[derive(Clone, Debug)]
    pub struct DomSurface {
        container: HtmlElement,
        frames: Vec<HtmlElement>,
    }

    impl DomSurface {
        pub fn new(container: HtmlElement) -> Result<Self> {
            let collection = container.get_elements_by_tag_name(FRAME_TAG);
            let mut frames = Vec::with_capacity(collection.length() as usize);
            for i in 0..collection.length() {
                let Some(element) = collection.item(i) else {
                    continue;
                };
                let frame = element
                    .dyn_into::<HtmlElement>()
                    .map_err(|_| SpinError::Dom(format!("frame {} is not an HTML element", i)))?;
                frames.push(frame);
            }
            Ok(Self { container, frames })
        }

        /// The container element.
        pub fn container(&self) -> &HtmlElement {
            &self.container
        }

        fn frame(&self, index: usize) -> Result<&HtmlElement> {
            self.frames
                .get(index)
                .ok_or_else(|| SpinError::Dom(format!("no frame at index {}", index)))
        }
    }

    impl FrameSurface for DomSurface {
        fn frame_count(&self) -> usize {
            self.frames.len()
        }

        fn measure(&self) -> ContainerSize {
            ContainerSize::new(
                self.container.client_width() as f64,
                self.container.client_height() as f64,
            )
        }

        fn prepare(&mut self) -> Result<()> {
            for frame in &self.frames {
                let style = frame.style();
                style.set_property("display", "none")?;
                style.set_property("width", "100%")?;
            }
            let style = self.container.style();
            style.set_property("position", "relative")?;
            style.set_property("width", "100%")?;
            Ok(())
        }

        fn set_frame_visible(&mut self, index: usize, visible: bool) -> Result<()> {
            let display = if visible { "block" } else { "none" };
            self.frame(index)?.style().set_property("display", display)?;
            Ok(())
        }

        fn set_visible(&mut self, visible: bool) -> Result<()> {
            let display = if visible { "block" } else { "none" };
            self.container.style().set_property("display", display)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_surface_prepare_hides_all() {
        let mut surface = MemorySurface::new(3, ContainerSize::new(300.0, 200.0));
        assert_eq!(surface.visible_frames(), vec![0, 1, 2]);
        assert!(!surface.is_prepared());

        surface.prepare().unwrap();
        assert!(surface.visible_frames().is_empty());
        assert!(surface.is_prepared());

        surface.set_frame_visible(1, true).unwrap();
        assert_eq!(surface.visible_frames(), vec![1]);
    }

    #[test]
    fn test_memory_surface_out_of_range() {
        let mut surface = MemorySurface::new(2, ContainerSize::default());
        assert!(matches!(
            surface.set_frame_visible(2, true),
            Err(SpinError::Dom(_))
        ));
    }
}
