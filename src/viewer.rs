//! The spin viewer: frame state, input mapping and public controls.

use log::{debug, trace};

use crate::animation::{Step, StepSchedule, StepSequencer, StepToken};
use crate::config::{ConfigUpdate, ViewerConfig};
use crate::error::{Result, SpinError};
use crate::frames::FrameRange;
use crate::gesture::DragTracker;
use crate::input::{PointerSample, WheelDelta};
use crate::sizing::ContainerSize;
use crate::surface::FrameSurface;

/// Called with `(frame, frame_count)` whenever the shown frame changes.
pub type ChangeCallback = Box<dyn FnMut(usize, usize)>;

/// Spinnable frame viewer over a [`FrameSurface`].
///
/// The viewer owns the current frame and keeps exactly one frame of the
/// surface visible. It never waits: operations that start or continue a
/// timed sequence return a [`StepSchedule`], and the host calls
/// [`SpinViewer::tick`] with its token once the delay has passed.
///
/// ## Example
///
/// ```rust
/// use spin_view::{ContainerSize, MemorySurface, PointerSample, SpinViewer, ViewerConfig};
///
/// let surface = MemorySurface::new(8, ContainerSize::new(800.0, 400.0));
/// let mut viewer = SpinViewer::new(surface, ViewerConfig::default()).unwrap();
///
/// // Drag one frame step (800 / 8 px) to the right.
/// viewer.pointer_down(PointerSample::new(10.0, 0.0));
/// viewer.pointer_move(PointerSample::new(110.0, 0.0)).unwrap();
/// viewer.pointer_up();
/// assert_eq!(viewer.current_frame(), 1);
///
/// // Autoplay is driven by the host timer.
/// let mut next = viewer.play().unwrap();
/// while let Some(schedule) = next.take() {
///     if viewer.current_frame() == 4 {
///         viewer.stop();
///     }
///     next = viewer.tick(schedule.token).unwrap();
/// }
/// assert_eq!(viewer.current_frame(), 4);
/// ```
pub struct SpinViewer<S: FrameSurface> {
    surface: S,
    config: ViewerConfig,
    range: FrameRange,
    size: ContainerSize,
    current: usize,
    drag: DragTracker,
    sequencer: StepSequencer,
    on_change: Option<ChangeCallback>,
    /// Schedule produced during construction, not yet handed to the host
    pending: Option<StepSchedule>,
    /// Change that happened before any callback was registered
    unreported: Option<(usize, usize)>,
}

impl<S: FrameSurface> SpinViewer<S> {
    /// Take over `surface`: hide every frame except the start frame.
    ///
    /// With `autoplay` set, playback starts here and its first step is taken
    /// immediately. The schedule for the second step is kept until the host
    /// collects it with [`SpinViewer::take_pending_schedule`].
    pub fn new(mut surface: S, config: ViewerConfig) -> Result<Self> {
        config.validate()?;

        let frame_count = surface.frame_count();
        if frame_count == 0 {
            return Err(SpinError::NoFrames);
        }

        let size = ContainerSize::resolve(config.width, config.height, surface.measure());
        size.frame_step(config.axis(), frame_count)?;

        let range = FrameRange::new(frame_count, config.cycle);
        let current = range.normalize(config.start);

        surface.prepare()?;
        surface.set_frame_visible(current, true)?;

        debug!(
            "spin viewer ready: {} frames, {}x{} px, start frame {}",
            frame_count, size.width, size.height, current
        );

        let mut viewer = Self {
            surface,
            config,
            range,
            size,
            current,
            drag: DragTracker::new(),
            sequencer: StepSequencer::new(),
            on_change: None,
            pending: None,
            unreported: None,
        };
        if viewer.config.autoplay {
            viewer.pending = viewer.play()?;
        }
        Ok(viewer)
    }

    /// Register the frame change callback, replacing any previous one.
    ///
    /// A change made before any callback existed (the first autoplay step)
    /// is reported to the new callback right away.
    pub fn on_change<F>(&mut self, callback: F)
    where
        F: FnMut(usize, usize) + 'static,
    {
        let mut callback: ChangeCallback = Box::new(callback);
        if let Some((frame, total)) = self.unreported.take() {
            callback(frame, total);
        }
        self.on_change = Some(callback);
    }

    /// Schedule left by autoplay at construction, if it has not been taken yet.
    ///
    /// Returns `None` once the sequence it belongs to has been cancelled.
    pub fn take_pending_schedule(&mut self) -> Option<StepSchedule> {
        self.pending
            .take()
            .filter(|schedule| self.sequencer.is_live(schedule.token))
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.range.count()
    }

    #[inline]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[inline]
    pub fn size(&self) -> ContainerSize {
        self.size
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    #[inline]
    pub fn is_turning(&self) -> bool {
        self.sequencer.is_turning()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Map any index into the valid frame range using the current cycle setting.
    #[inline]
    pub fn normalize(&self, index: i64) -> usize {
        self.range.normalize(index)
    }

    // Input

    /// Press: stop any sequence and start a drag at `sample`.
    pub fn pointer_down(&mut self, sample: PointerSample) {
        self.sequencer.cancel();
        self.drag.begin(sample, self.config.axis(), self.current);
    }

    /// Move while pressed. Returns `true` when the shown frame changed.
    pub fn pointer_move(&mut self, sample: PointerSample) -> Result<bool> {
        let Some(axis) = self.drag.axis() else {
            return Ok(false);
        };
        let frame_step = self.size.frame_step(axis, self.range.count())?;
        let Some(delta) = self.drag.update(sample, self.config.reverse, frame_step) else {
            return Ok(false);
        };

        let next = self.range.offset(self.drag.anchor_frame(), delta);
        self.change_frame(next)
    }

    /// Release. Returns `false` when no drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.drag.end(self.current)
    }

    /// One wheel tick moves exactly one frame, whatever its magnitude.
    pub fn wheel(&mut self, delta: WheelDelta) -> Result<bool> {
        let Some(mut direction) = delta.direction() else {
            return Ok(false);
        };
        self.sequencer.cancel();
        if self.config.reverse {
            direction = -direction;
        }
        let next = self.range.offset(self.current, direction);
        self.change_frame(next)
    }

    // Controls

    /// Step toward `target` one frame at a time, `speed` ms apart.
    ///
    /// The first step is taken immediately. The change callback fires once,
    /// on arrival.
    pub fn turn_to(&mut self, target: i64) -> Result<Option<StepSchedule>> {
        let target = self.range.normalize(target);
        let token = self.sequencer.start_turn(target);
        self.advance(token)
    }

    /// Jump straight to `target`. Returns `true` when the frame changed.
    pub fn go_to(&mut self, target: i64) -> Result<bool> {
        self.sequencer.cancel();
        let next = self.range.normalize(target);
        self.change_frame(next)
    }

    /// Step forward every `play_speed` ms until stopped.
    ///
    /// Unlike a turn, every step is reported to the change callback so a page
    /// can follow autoplay.
    pub fn play(&mut self) -> Result<Option<StepSchedule>> {
        let token = self.sequencer.start_play();
        self.advance(token)
    }

    /// Cancel a running turn or autoplay. Returns `true` if one was running.
    pub fn stop(&mut self) -> bool {
        self.sequencer.cancel()
    }

    /// Continue the sequence identified by `token`.
    ///
    /// Returns the next schedule, or `None` when the sequence is finished,
    /// cancelled, or superseded.
    pub fn tick(&mut self, token: StepToken) -> Result<Option<StepSchedule>> {
        self.advance(token)
    }

    pub fn show(&mut self) -> Result<()> {
        self.surface.set_visible(true)
    }

    pub fn hide(&mut self) -> Result<()> {
        self.surface.set_visible(false)
    }

    /// Update orientation, direction, cycling and speeds in place.
    ///
    /// Rejected as a whole when the container has no usable size along the
    /// axis the update would select.
    pub fn set(&mut self, update: &ConfigUpdate) -> Result<()> {
        let mut config = self.config.clone();
        config.apply(update)?;
        self.size.frame_step(config.axis(), self.range.count())?;

        self.config = config;
        self.range.set_cycle(self.config.cycle);
        Ok(())
    }

    fn advance(&mut self, token: StepToken) -> Result<Option<StepSchedule>> {
        match self.sequencer.next_step(token, self.current, &self.range) {
            Step::Advance(next) => {
                let playing = self.sequencer.is_playing();
                if let Err(e) = self.show_frame(next) {
                    self.sequencer.cancel();
                    return Err(e);
                }
                // A turn only reports on arrival
                if playing {
                    self.notify();
                }
                let delay_ms = if playing {
                    self.config.play_speed
                } else {
                    self.config.speed
                };
                Ok(Some(StepSchedule { token, delay_ms }))
            }
            Step::Arrived(_) => {
                self.notify();
                Ok(None)
            }
            Step::Idle => Ok(None),
        }
    }

    fn change_frame(&mut self, next: usize) -> Result<bool> {
        let changed = self.show_frame(next)?;
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    fn show_frame(&mut self, next: usize) -> Result<bool> {
        if next == self.current {
            return Ok(false);
        }
        self.surface.set_frame_visible(self.current, false)?;
        self.surface.set_frame_visible(next, true)?;
        trace!("frame {} -> {}", self.current, next);
        self.current = next;
        Ok(true)
    }

    fn notify(&mut self) {
        let (current, count) = (self.current, self.range.count());
        if let Some(callback) = self.on_change.as_mut() {
            callback(current, count);
        } else {
            self.unreported = Some((current, count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<(usize, usize)>>>;

    fn viewer(frames: usize, config: ViewerConfig) -> (SpinViewer<MemorySurface>, Calls) {
        let surface = MemorySurface::new(frames, ContainerSize::new(800.0, 400.0));
        let mut viewer = SpinViewer::new(surface, config).unwrap();
        let calls: Calls = Rc::default();
        let sink = Rc::clone(&calls);
        viewer.on_change(move |frame, total| sink.borrow_mut().push((frame, total)));
        (viewer, calls)
    }

    fn visible(viewer: &SpinViewer<MemorySurface>) -> Vec<usize> {
        viewer.surface().visible_frames()
    }

    /// Run ticks until the sequence ends, stopping after `limit` ticks.
    fn run(viewer: &mut SpinViewer<MemorySurface>, mut next: Option<StepSchedule>, limit: usize) -> usize {
        let mut ticks = 0;
        while let Some(schedule) = next {
            if ticks == limit {
                break;
            }
            next = viewer.tick(schedule.token).unwrap();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_construction_shows_start_frame() {
        let config = ViewerConfig {
            start: -1,
            ..Default::default()
        };
        let (viewer, calls) = viewer(8, config);
        assert_eq!(viewer.current_frame(), 7);
        assert_eq!(visible(&viewer), vec![7]);
        assert!(viewer.surface().is_prepared());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_construction_rejects_empty_container() {
        let surface = MemorySurface::new(0, ContainerSize::new(800.0, 400.0));
        assert_eq!(
            SpinViewer::new(surface, ViewerConfig::default()).err(),
            Some(SpinError::NoFrames)
        );
    }

    #[test]
    fn test_construction_rejects_zero_size() {
        let surface = MemorySurface::new(8, ContainerSize::new(0.0, 400.0));
        assert!(matches!(
            SpinViewer::new(surface, ViewerConfig::default()),
            Err(SpinError::InvalidSize { .. })
        ));

        // An explicit width rescues an unmeasurable container.
        let surface = MemorySurface::new(8, ContainerSize::new(0.0, 400.0));
        let config = ViewerConfig {
            width: Some(320.0),
            ..Default::default()
        };
        let viewer = SpinViewer::new(surface, config).unwrap();
        assert_eq!(viewer.size(), ContainerSize::new(320.0, 400.0));
    }

    #[test]
    fn test_go_to() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());

        assert!(viewer.go_to(5).unwrap());
        assert_eq!(visible(&viewer), vec![5]);
        assert_eq!(*calls.borrow(), vec![(5, 8)]);

        assert!(!viewer.go_to(5).unwrap());
        assert_eq!(calls.borrow().len(), 1);

        viewer.go_to(9).unwrap();
        assert_eq!(viewer.current_frame(), 1);
        assert_eq!(visible(&viewer), vec![1]);
    }

    #[test]
    fn test_drag_one_step_advances_one_frame() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());

        viewer.pointer_down(PointerSample::new(10.0, 0.0));
        assert!(viewer.is_dragging());
        assert!(viewer.pointer_move(PointerSample::new(110.0, 0.0)).unwrap());
        assert!(!viewer.pointer_move(PointerSample::new(150.0, 0.0)).unwrap());
        assert!(viewer.pointer_up());

        assert_eq!(viewer.current_frame(), 1);
        assert_eq!(visible(&viewer), vec![1]);
        assert_eq!(*calls.borrow(), vec![(1, 8)]);
    }

    #[test]
    fn test_drag_is_relative_to_gesture_start() {
        let (mut viewer, _) = viewer(8, ViewerConfig::default());

        viewer.pointer_down(PointerSample::new(0.0, 0.0));
        viewer.pointer_move(PointerSample::new(300.0, 0.0)).unwrap();
        viewer.pointer_up();
        assert_eq!(viewer.current_frame(), 3);

        // Second gesture starts from frame 3, leftwards past zero.
        viewer.pointer_down(PointerSample::new(500.0, 0.0));
        viewer.pointer_move(PointerSample::new(150.0, 0.0)).unwrap();
        assert_eq!(viewer.current_frame(), 7);
        viewer.pointer_move(PointerSample::new(500.0, 0.0)).unwrap();
        assert_eq!(viewer.current_frame(), 3);
        viewer.pointer_up();
    }

    #[test]
    fn test_drag_reverse_vertical_without_cycle() {
        let config = ViewerConfig {
            vertical: true,
            reverse: true,
            cycle: false,
            start: 2,
            ..Default::default()
        };
        let (mut viewer, calls) = viewer(8, config);

        // Vertical frame step is 400 / 8 = 50 px; reverse turns down into back.
        viewer.pointer_down(PointerSample::new(0.0, 100.0));
        viewer.pointer_move(PointerSample::new(0.0, 150.0)).unwrap();
        assert_eq!(viewer.current_frame(), 1);
        viewer.pointer_move(PointerSample::new(0.0, 390.0)).unwrap();
        assert_eq!(viewer.current_frame(), 0);
        viewer.pointer_up();

        assert_eq!(*calls.borrow(), vec![(1, 8), (0, 8)]);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());
        assert!(!viewer.pointer_move(PointerSample::new(400.0, 0.0)).unwrap());
        assert!(!viewer.pointer_up());
        assert_eq!(viewer.current_frame(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_wheel_moves_one_frame() {
        let (mut viewer, calls) = viewer(4, ViewerConfig::default());

        assert!(viewer.wheel(WheelDelta::from_delta_y(480.0)).unwrap());
        assert_eq!(viewer.current_frame(), 1);
        assert!(viewer.wheel(WheelDelta::from_delta_y(-3.0)).unwrap());
        assert!(viewer.wheel(WheelDelta::from_delta_y(-3.0)).unwrap());
        assert_eq!(viewer.current_frame(), 3);
        assert!(!viewer.wheel(WheelDelta::default()).unwrap());

        viewer.set(&ConfigUpdate {
            reverse: Some(true),
            cycle: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert!(!viewer.wheel(WheelDelta::from_delta_y(-1.0)).unwrap());
        assert_eq!(viewer.current_frame(), 3);

        assert_eq!(*calls.borrow(), vec![(1, 4), (0, 4), (3, 4)]);
    }

    #[test]
    fn test_turn_to_steps_and_reports_on_arrival() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());

        let first = viewer.turn_to(3).unwrap().unwrap();
        assert_eq!(first.delay_ms, 50);
        assert_eq!(viewer.current_frame(), 1);
        assert!(viewer.is_turning());
        assert!(calls.borrow().is_empty());

        // Two more steps, then the arrival tick.
        let ticks = run(&mut viewer, Some(first), 10);
        assert_eq!(ticks, 3);
        assert_eq!(viewer.current_frame(), 3);
        assert_eq!(visible(&viewer), vec![3]);
        assert!(!viewer.is_turning());
        assert_eq!(*calls.borrow(), vec![(3, 8)]);
    }

    #[test]
    fn test_turn_to_current_reports_immediately() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());
        assert_eq!(viewer.turn_to(8).unwrap(), None);
        assert_eq!(*calls.borrow(), vec![(0, 8)]);
    }

    #[test]
    fn test_play_then_stop() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());

        let schedule = viewer.play().unwrap().unwrap();
        assert_eq!(schedule.delay_ms, 100);
        assert!(viewer.is_playing());
        assert_eq!(viewer.current_frame(), 1);

        assert!(viewer.stop());
        assert_eq!(viewer.tick(schedule.token).unwrap(), None);
        assert_eq!(viewer.current_frame(), 1);
        assert_eq!(*calls.borrow(), vec![(1, 8)]);
    }

    #[test]
    fn test_play_wraps_until_stopped() {
        let (mut viewer, calls) = viewer(4, ViewerConfig::default());
        let first = viewer.play();
        let ticks = run(&mut viewer, first.unwrap(), 5);
        assert_eq!(ticks, 5);
        assert!(viewer.is_playing());
        // 1 from play(), then 5 ticks: 2, 3, 0, 1, 2
        assert_eq!(viewer.current_frame(), 2);
        assert_eq!(calls.borrow().len(), 6);
        assert_eq!(visible(&viewer), vec![2]);
    }

    #[test]
    fn test_drag_cancels_autoplay() {
        let config = ViewerConfig {
            autoplay: true,
            ..Default::default()
        };
        let (mut viewer, _) = viewer(8, config);
        let schedule = viewer.take_pending_schedule().unwrap();

        viewer.pointer_down(PointerSample::default());
        assert!(!viewer.is_playing());
        assert_eq!(viewer.tick(schedule.token).unwrap(), None);
        assert_eq!(viewer.current_frame(), 1);
    }

    #[test]
    fn test_autoplay_starts_at_construction() {
        let surface = MemorySurface::new(8, ContainerSize::new(800.0, 400.0));
        let config = ViewerConfig {
            autoplay: true,
            play_speed: 70,
            ..Default::default()
        };
        let mut viewer = SpinViewer::new(surface, config).unwrap();
        assert!(viewer.is_playing());
        assert_eq!(viewer.current_frame(), 1);
        assert_eq!(viewer.surface().visible_frames(), vec![1]);

        // The first step is reported once a callback shows up.
        let calls: Calls = Rc::default();
        let sink = Rc::clone(&calls);
        viewer.on_change(move |frame, total| sink.borrow_mut().push((frame, total)));
        assert_eq!(*calls.borrow(), vec![(1, 8)]);

        let schedule = viewer.take_pending_schedule().unwrap();
        assert_eq!(schedule.delay_ms, 70);
        assert_eq!(viewer.take_pending_schedule(), None);

        viewer.tick(schedule.token).unwrap();
        assert_eq!(viewer.current_frame(), 2);
        assert_eq!(*calls.borrow(), vec![(1, 8), (2, 8)]);
    }

    #[test]
    fn test_pending_schedule_dropped_after_stop() {
        let surface = MemorySurface::new(8, ContainerSize::new(800.0, 400.0));
        let config = ViewerConfig {
            autoplay: true,
            ..Default::default()
        };
        let mut viewer = SpinViewer::new(surface, config).unwrap();
        viewer.stop();
        assert_eq!(viewer.take_pending_schedule(), None);
    }

    #[test]
    fn test_no_pending_schedule_without_autoplay() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());
        assert!(!viewer.is_playing());
        assert_eq!(viewer.take_pending_schedule(), None);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_set_rejects_axis_without_size() {
        let surface = MemorySurface::new(8, ContainerSize::new(800.0, 0.0));
        let mut viewer = SpinViewer::new(surface, ViewerConfig::default()).unwrap();

        let update = ConfigUpdate {
            vertical: Some(true),
            reverse: Some(true),
            ..Default::default()
        };
        assert!(matches!(viewer.set(&update), Err(SpinError::InvalidSize { .. })));
        assert!(!viewer.config().vertical);
        assert!(!viewer.config().reverse);

        // Dragging still works on the original axis.
        viewer.pointer_down(PointerSample::new(0.0, 0.0));
        assert!(viewer.pointer_move(PointerSample::new(100.0, 0.0)).unwrap());
        assert_eq!(viewer.current_frame(), 1);
    }

    #[test]
    fn test_set_changes_speed_mid_sequence() {
        let (mut viewer, _) = viewer(8, ViewerConfig::default());
        let schedule = viewer.play().unwrap().unwrap();
        viewer
            .set(&ConfigUpdate {
                play_speed: Some(25),
                ..Default::default()
            })
            .unwrap();
        let next = viewer.tick(schedule.token).unwrap().unwrap();
        assert_eq!(next.delay_ms, 25);
    }

    #[test]
    fn test_show_hide_leave_frame_alone() {
        let (mut viewer, calls) = viewer(8, ViewerConfig::default());
        viewer.hide().unwrap();
        assert!(!viewer.surface().is_visible());
        viewer.show().unwrap();
        assert!(viewer.surface().is_visible());
        assert_eq!(visible(&viewer), vec![0]);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_exactly_one_frame_visible_throughout() {
        let (mut viewer, _) = viewer(6, ViewerConfig::default());
        viewer.go_to(4).unwrap();
        viewer.wheel(WheelDelta::from_delta_y(1.0)).unwrap();
        viewer.pointer_down(PointerSample::new(0.0, 0.0));
        for x in (-900..900).step_by(37) {
            viewer.pointer_move(PointerSample::new(x as f64, 0.0)).unwrap();
            assert_eq!(visible(&viewer), vec![viewer.current_frame()]);
        }
        viewer.pointer_up();
        let next = viewer.turn_to(1).unwrap();
        run(&mut viewer, next, 20);
        assert_eq!(visible(&viewer), vec![1]);
    }
}
