//! DOM widget: mounting, event listeners and step timers.
//!
//! A [`SpinWidget`] owns a [`SpinViewer`] over a [`DomSurface`] and feeds it
//! browser events. Timers are plain `setTimeout` calls holding a weak
//! reference to the widget state, so a widget that has been dropped never
//! sees a late tick. Pointer release is observed through one document-level
//! `mouseup` listener shared by every widget on the page.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::{Function, Reflect};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement, MouseEvent, TouchEvent, Window};

use crate::animation::StepSchedule;
use crate::config::{ConfigUpdate, ViewerConfig};
use crate::error::{Result, SpinError};
use crate::input::{InputModality, PointerSample, WheelDelta};
use crate::surface::web::DomSurface;
use crate::viewer::SpinViewer;

/// Attribute marking a container that already has a widget.
pub const MOUNTED_ATTR: &str = "data-spinview";

type Listener = Box<dyn FnMut(usize, usize)>;

struct WidgetState {
    viewer: SpinViewer<DomSurface>,
    timer: Option<i32>,
    /// Frame changes reported by the viewer, delivered once no borrow is held
    changes: Rc<RefCell<Vec<(usize, usize)>>>,
    listener: Option<Listener>,
    flushing: bool,
}

type SharedState = Rc<RefCell<WidgetState>>;

/// An event listener that unregisters itself when dropped.
struct Binding {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Binding {
    fn new(target: &EventTarget, event: &'static str, closure: Closure<dyn FnMut(Event)>) -> Result<Self> {
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Page-wide `mouseup` listener, installed while at least one widget is mounted.
#[derive(Default)]
struct ReleaseHub {
    binding: Option<Binding>,
    members: Vec<(u64, Weak<RefCell<WidgetState>>)>,
}

impl ReleaseHub {
    fn join(&mut self, id: u64, state: Weak<RefCell<WidgetState>>, document: &Document) -> Result<()> {
        if self.binding.is_none() {
            let closure = Closure::wrap(Box::new(|event: Event| release_all(&event)) as Box<dyn FnMut(Event)>);
            self.binding = Some(Binding::new(document.as_ref(), "mouseup", closure)?);
            debug!("release listener installed");
        }
        self.members.push((id, state));
        Ok(())
    }

    fn leave(&mut self, id: u64) {
        self.members.retain(|(member, _)| *member != id);
        if self.members.is_empty() && self.binding.take().is_some() {
            debug!("release listener removed");
        }
    }
}

thread_local! {
    static RELEASE_HUB: RefCell<ReleaseHub> = RefCell::new(ReleaseHub::default());
    static NEXT_WIDGET_ID: Cell<u64> = const { Cell::new(1) };
}

fn release_all(event: &Event) {
    let members: Vec<SharedState> = RELEASE_HUB.with(|hub| {
        hub.borrow()
            .members
            .iter()
            .filter_map(|(_, state)| state.upgrade())
            .collect()
    });

    for state in members {
        let released = match state.try_borrow_mut() {
            Ok(mut s) => s.viewer.pointer_up(),
            Err(_) => false,
        };
        if released {
            event.prevent_default();
        }
    }
}

/// Number of widgets currently sharing the release listener.
pub fn release_listener_count() -> usize {
    RELEASE_HUB.with(|hub| hub.borrow().members.len())
}

/// Touch when the window advertises touch events, mouse otherwise.
pub fn detect_modality(window: &Window) -> InputModality {
    let window: &JsValue = window.as_ref();
    if has_property(window, "ontouchstart") || has_property(window, "onmsgesturechange") {
        InputModality::Touch
    } else {
        InputModality::Mouse
    }
}

/// The wheel event family this browser supports.
fn wheel_event_name(document: &Document) -> &'static str {
    let document: &JsValue = document.as_ref();
    if has_property(document, "onwheel") {
        "wheel"
    } else if has_property(document, "onmousewheel") {
        "mousewheel"
    } else {
        "DOMMouseScroll"
    }
}

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

fn number_property(target: &JsValue, name: &str) -> f64 {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn pointer_sample(event: &Event, container: &HtmlElement, modality: InputModality) -> Option<PointerSample> {
    let (client_x, client_y) = match modality {
        InputModality::Touch => {
            let touch = event.unchecked_ref::<TouchEvent>().changed_touches().get(0)?;
            (touch.client_x(), touch.client_y())
        }
        InputModality::Mouse => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            (mouse.client_x(), mouse.client_y())
        }
    };
    Some(PointerSample::from_client(
        client_x as f64,
        client_y as f64,
        container.offset_left() as f64,
        container.offset_top() as f64,
    ))
}

fn wheel_delta(event: &Event) -> WheelDelta {
    let event: &JsValue = event.as_ref();
    WheelDelta {
        delta_y: number_property(event, "deltaY"),
        detail: number_property(event, "detail"),
        wheel_delta: number_property(event, "wheelDelta"),
    }
}

fn clear_timer(id: i32) {
    if let Some(window) = web_sys::window() {
        window.clear_timeout_with_handle(id);
    }
}

/// Replace the pending timer with one for `schedule`.
fn arm_timer(state: &SharedState, schedule: StepSchedule) {
    let Some(window) = web_sys::window() else {
        warn!("no window; step dropped");
        return;
    };
    let mut s = state.borrow_mut();
    if let Some(id) = s.timer.take() {
        window.clear_timeout_with_handle(id);
    }

    let weak = Rc::downgrade(state);
    let callback = Closure::once_into_js(move || {
        if let Some(state) = weak.upgrade() {
            on_timer(&state, schedule);
        }
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        schedule.delay_ms.min(i32::MAX as u32) as i32,
    ) {
        Ok(id) => s.timer = Some(id),
        Err(e) => warn!("failed to schedule step: {:?}", e),
    }
}

fn on_timer(state: &SharedState, schedule: StepSchedule) {
    let result = {
        let mut s = state.borrow_mut();
        s.timer = None;
        s.viewer.tick(schedule.token)
    };
    match result {
        Ok(next) => follow(state, next),
        Err(e) => {
            warn!("step failed: {}", e);
            settle(state);
        }
    }
}

/// Arm the next step if there is one, then settle.
fn follow(state: &SharedState, next: Option<StepSchedule>) {
    if let Some(schedule) = next {
        arm_timer(state, schedule);
    }
    settle(state);
}

/// Drop the timer of a sequence that is no longer running and deliver changes.
fn settle(state: &SharedState) {
    {
        let mut s = state.borrow_mut();
        if !s.viewer.is_playing() && !s.viewer.is_turning() {
            if let Some(id) = s.timer.take() {
                clear_timer(id);
            }
        }
    }
    flush(state);
}

/// Hand queued frame changes to the listener without holding a borrow, so the
/// listener may call back into the widget.
fn flush(state: &SharedState) {
    loop {
        let (pending, mut listener) = {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            // Without a listener, changes stay queued for the first one registered
            if s.flushing || s.listener.is_none() {
                return;
            }
            let pending: Vec<(usize, usize)> = s.changes.borrow_mut().drain(..).collect();
            if pending.is_empty() {
                return;
            }
            let Some(listener) = s.listener.take() else {
                return;
            };
            s.flushing = true;
            (pending, listener)
        };

        for (frame, total) in pending {
            listener(frame, total);
        }

        let mut s = state.borrow_mut();
        s.flushing = false;
        if s.listener.is_none() {
            s.listener = Some(listener);
        }
    }
}

/// Mount a widget on the element with id `element_id`.
///
/// Returns `Ok(None)` when the element already carries a widget.
pub fn mount(element_id: &str, config: ViewerConfig) -> Result<Option<SpinWidget>> {
    let window = web_sys::window().ok_or(SpinError::NoWindow)?;
    let document = window.document().ok_or(SpinError::NoWindow)?;
    let element = document
        .get_element_by_id(element_id)
        .ok_or_else(|| SpinError::ElementNotFound(element_id.to_string()))?;

    if element.has_attribute(MOUNTED_ATTR) {
        debug!("#{} already mounted", element_id);
        return Ok(None);
    }

    let container = element
        .dyn_into::<HtmlElement>()
        .map_err(|_| SpinError::Dom(format!("#{} is not an HTML element", element_id)))?;

    SpinWidget::attach(&window, &document, container, config).map(Some)
}

/// Create a widget from a JS option bag.
///
/// Recognised options mirror [`ViewerConfig`] in camelCase, plus `change`,
/// a function called with `(frame, total)` on every frame change.
#[wasm_bindgen(js_name = create)]
pub fn create(element_id: &str, options: JsValue) -> Result<Option<SpinWidget>> {
    #[cfg(feature = "console_error")]
    console_error_panic_hook::set_once();

    let config: ViewerConfig = if options.is_undefined() || options.is_null() {
        ViewerConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options.clone()).map_err(|e| SpinError::Config(e.to_string()))?
    };
    let change = Reflect::get(&options, &JsValue::from_str("change"))
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok());

    let Some(widget) = mount(element_id, config)? else {
        return Ok(None);
    };
    if let Some(change) = change {
        widget.on_change(move |frame, total| {
            let frame = JsValue::from(frame as u32);
            let total = JsValue::from(total as u32);
            if let Err(e) = change.call2(&JsValue::NULL, &frame, &total) {
                warn!("change callback threw: {:?}", e);
            }
        });
    }
    Ok(Some(widget))
}

/// A mounted spin viewer. Dropping it (or calling `free()` from JS) removes
/// its listeners, cancels its timer and clears the mount marker.
#[wasm_bindgen]
pub struct SpinWidget {
    id: u64,
    state: SharedState,
    container: HtmlElement,
    bindings: Vec<Binding>,
}

impl SpinWidget {
    fn attach(window: &Window, document: &Document, container: HtmlElement, config: ViewerConfig) -> Result<Self> {
        let scroll = config.scroll;
        let surface = DomSurface::new(container.clone())?;
        let mut viewer = SpinViewer::new(surface, config)?;
        let next = viewer.take_pending_schedule();
        container.set_attribute(MOUNTED_ATTR, "true")?;

        let changes: Rc<RefCell<Vec<(usize, usize)>>> = Rc::default();
        let sink = Rc::clone(&changes);
        viewer.on_change(move |frame, total| sink.borrow_mut().push((frame, total)));

        let state = Rc::new(RefCell::new(WidgetState {
            viewer,
            timer: None,
            changes,
            listener: None,
            flushing: false,
        }));
        let id = NEXT_WIDGET_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });

        let mut widget = Self {
            id,
            state,
            container,
            bindings: Vec::new(),
        };
        let modality = detect_modality(window);
        widget.bind(document, modality, scroll)?;
        debug!("spin widget {} mounted ({:?} input)", id, modality);

        follow(&widget.state, next);
        Ok(widget)
    }

    fn bind(&mut self, document: &Document, modality: InputModality, scroll: bool) -> Result<()> {
        let (press_event, move_event, release_event) = modality.event_names();
        let target: EventTarget = self.container.clone().into();

        let press = {
            let state = Rc::clone(&self.state);
            let container = self.container.clone();
            Closure::wrap(Box::new(move |event: Event| {
                event.prevent_default();
                let Some(sample) = pointer_sample(&event, &container, modality) else {
                    return;
                };
                state.borrow_mut().viewer.pointer_down(sample);
                settle(&state);
            }) as Box<dyn FnMut(Event)>)
        };
        self.bindings.push(Binding::new(&target, press_event, press)?);

        let drag = {
            let state = Rc::clone(&self.state);
            let container = self.container.clone();
            Closure::wrap(Box::new(move |event: Event| {
                if !state.borrow().viewer.is_dragging() {
                    return;
                }
                event.prevent_default();
                let Some(sample) = pointer_sample(&event, &container, modality) else {
                    return;
                };
                let result = state.borrow_mut().viewer.pointer_move(sample);
                if let Err(e) = result {
                    warn!("drag update failed: {}", e);
                }
                flush(&state);
            }) as Box<dyn FnMut(Event)>)
        };
        self.bindings.push(Binding::new(&target, move_event, drag)?);

        match modality {
            InputModality::Touch => {
                let state = Rc::clone(&self.state);
                let release = Closure::wrap(Box::new(move |event: Event| {
                    event.prevent_default();
                    state.borrow_mut().viewer.pointer_up();
                }) as Box<dyn FnMut(Event)>);
                self.bindings.push(Binding::new(&target, release_event, release)?);
            }
            InputModality::Mouse => {
                let weak = Rc::downgrade(&self.state);
                RELEASE_HUB.with(|hub| hub.borrow_mut().join(self.id, weak, document))?;

                if scroll {
                    let state = Rc::clone(&self.state);
                    let wheel = Closure::wrap(Box::new(move |event: Event| {
                        event.prevent_default();
                        let result = state.borrow_mut().viewer.wheel(wheel_delta(&event));
                        if let Err(e) = result {
                            warn!("wheel update failed: {}", e);
                        }
                        settle(&state);
                    }) as Box<dyn FnMut(Event)>);
                    self.bindings.push(Binding::new(&target, wheel_event_name(document), wheel)?);
                }
            }
        }
        Ok(())
    }

    /// Register a Rust frame change listener, replacing any previous one.
    ///
    /// Changes queued before any listener existed are delivered immediately.
    pub fn on_change<F>(&self, listener: F)
    where
        F: FnMut(usize, usize) + 'static,
    {
        self.state.borrow_mut().listener = Some(Box::new(listener));
        flush(&self.state);
    }

    /// Frame changes waiting for a listener.
    pub fn queued_changes(&self) -> usize {
        self.state.borrow().changes.borrow().len()
    }

    /// Apply the runtime-mutable options.
    pub fn update(&self, update: &ConfigUpdate) -> Result<()> {
        self.state.borrow_mut().viewer.set(update)
    }

    /// The container element.
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    pub fn is_dragging(&self) -> bool {
        self.state.borrow().viewer.is_dragging()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().viewer.is_playing()
    }
}

#[wasm_bindgen]
impl SpinWidget {
    /// Animate one frame at a time to `frame`.
    pub fn turn(&self, frame: i32) -> Result<()> {
        let next = self.state.borrow_mut().viewer.turn_to(frame.into())?;
        follow(&self.state, next);
        Ok(())
    }

    /// Jump to `frame` without animation.
    pub fn go(&self, frame: i32) -> Result<()> {
        let result = self.state.borrow_mut().viewer.go_to(frame.into());
        settle(&self.state);
        result.map(|_| ())
    }

    pub fn play(&self) -> Result<()> {
        let next = self.state.borrow_mut().viewer.play()?;
        follow(&self.state, next);
        Ok(())
    }

    pub fn stop(&self) {
        self.state.borrow_mut().viewer.stop();
        settle(&self.state);
    }

    pub fn show(&self) -> Result<()> {
        self.state.borrow_mut().viewer.show()
    }

    pub fn hide(&self) -> Result<()> {
        self.state.borrow_mut().viewer.hide()
    }

    /// Change `vertical`, `reverse`, `cycle`, `speed` or `playSpeed`.
    pub fn set(&self, options: JsValue) -> Result<()> {
        let update: ConfigUpdate =
            serde_wasm_bindgen::from_value(options).map_err(|e| SpinError::Config(e.to_string()))?;
        self.update(&update)
    }

    /// Index of the frame currently shown.
    #[wasm_bindgen(getter)]
    pub fn current(&self) -> u32 {
        self.state.borrow().viewer.current_frame() as u32
    }

    /// Number of frames.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        self.state.borrow().viewer.frame_count() as u32
    }
}

impl Drop for SpinWidget {
    fn drop(&mut self) {
        RELEASE_HUB.with(|hub| hub.borrow_mut().leave(self.id));
        self.bindings.clear();
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.viewer.stop();
            if let Some(id) = s.timer.take() {
                clear_timer(id);
            }
        }
        let _ = self.container.remove_attribute(MOUNTED_ATTR);
        debug!("spin widget {} released", self.id);
    }
}
