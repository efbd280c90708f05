#![forbid(unsafe_code)]

//! [`ScrollHost`] over the live DOM.
//!
//! Browser callbacks (resize, timeout, animation frame) hold a weak handle to
//! the engine and forward a [`HostEvent`]; the engine owns this host, so a
//! strong handle here would form a cycle.

use core::time::Duration;
use std::cell::RefCell;
use std::rc::Weak;

use scroll_blocker_core::{FrameId, HostEvent, LOG_TARGET, Node, ScrollBlocker, ScrollHost, TimerId};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CssStyleDeclaration, HtmlElement, Window};

pub(crate) type DomBlocker = ScrollBlocker<DomHost>;

/// A browser callback kept alive until it fires or is cancelled.
struct PendingCallback {
    handle: i32,
    _closure: Closure<dyn FnMut()>,
}

/// DOM-backed page surface.
pub struct DomHost {
    window: Window,
    root: HtmlElement,
    body: HtmlElement,
    engine: Weak<RefCell<DomBlocker>>,
    next_id: u32,
    resize_listener: Option<Closure<dyn FnMut()>>,
    timer: Option<(TimerId, PendingCallback)>,
    frame: Option<(FrameId, PendingCallback)>,
}

impl DomHost {
    /// Host for the global `window`.
    pub fn current() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        Self::from_window(window)
    }

    pub fn from_window(window: Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let root = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str("document root is not an HTML element"))?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        Ok(Self {
            window,
            root,
            body,
            engine: Weak::new(),
            next_id: 0,
            resize_listener: None,
            timer: None,
            frame: None,
        })
    }

    /// Route browser callbacks to `engine`. Until bound, callbacks are dropped.
    pub(crate) fn bind(&mut self, engine: Weak<RefCell<DomBlocker>>) {
        self.engine = engine;
    }

    fn next_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    fn callback(&self, event: HostEvent) -> Closure<dyn FnMut()> {
        let engine = self.engine.clone();
        Closure::new(move || dispatch(&engine, event))
    }

    fn declaration(&self, node: Node<'_, HtmlElement>) -> CssStyleDeclaration {
        match node {
            Node::Root => self.root.style(),
            Node::Body => self.body.style(),
            Node::Element(element) => element.style(),
        }
    }
}

fn dispatch(engine: &Weak<RefCell<DomBlocker>>, event: HostEvent) {
    let Some(engine) = engine.upgrade() else {
        trace!(target: LOG_TARGET, ?event, "engine dropped; ignoring host event");
        return;
    };
    let Ok(mut guard) = engine.try_borrow_mut() else {
        warn!(target: LOG_TARGET, ?event, "engine busy; dropping host event");
        return;
    };
    guard.handle_event(event);
}

impl ScrollHost for DomHost {
    type Element = HtmlElement;

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn root_client_width(&self) -> f64 {
        f64::from(self.root.client_width())
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to(&mut self, offset: f64) {
        let x = self.window.scroll_x().unwrap_or(0.0);
        self.window.scroll_to_with_x_and_y(x, offset);
    }

    fn add_root_class(&mut self, class: &str) {
        if let Err(err) = self.root.class_list().add_1(class) {
            warn!(target: LOG_TARGET, class, error = ?err, "failed to add lock class");
        }
    }

    fn remove_root_class(&mut self, class: &str) {
        if let Err(err) = self.root.class_list().remove_1(class) {
            warn!(target: LOG_TARGET, class, error = ?err, "failed to remove lock class");
        }
    }

    fn style(&self, node: Node<'_, HtmlElement>, property: &str) -> Option<String> {
        self.declaration(node)
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_style(&mut self, node: Node<'_, HtmlElement>, property: &str, value: &str) {
        if let Err(err) = self.declaration(node).set_property(property, value) {
            warn!(target: LOG_TARGET, property, value, error = ?err, "failed to set style");
        }
    }

    fn remove_style(&mut self, node: Node<'_, HtmlElement>, property: &str) {
        if let Err(err) = self.declaration(node).remove_property(property) {
            warn!(target: LOG_TARGET, property, error = ?err, "failed to remove style");
        }
    }

    fn listen_resize(&mut self) {
        if self.resize_listener.is_some() {
            return;
        }
        let closure = self.callback(HostEvent::Resize);
        match self
            .window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        {
            Ok(()) => self.resize_listener = Some(closure),
            Err(err) => warn!(target: LOG_TARGET, error = ?err, "failed to add resize listener"),
        }
    }

    fn unlisten_resize(&mut self) {
        if let Some(closure) = self.resize_listener.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }
    }

    fn start_timer(&mut self, delay: Duration) -> Option<TimerId> {
        let id = TimerId(self.next_id());
        let closure = self.callback(HostEvent::TimerFired(id));
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(handle) => {
                // Replacing drops a callback that already fired or was cancelled.
                self.timer = Some((id, PendingCallback {
                    handle,
                    _closure: closure,
                }));
                Some(id)
            }
            Err(err) => {
                warn!(target: LOG_TARGET, error = ?err, "setTimeout failed");
                None
            }
        }
    }

    fn cancel_timer(&mut self, id: TimerId) {
        if self.timer.as_ref().is_some_and(|(pending, _)| *pending == id) {
            if let Some((_, callback)) = self.timer.take() {
                self.window.clear_timeout_with_handle(callback.handle);
            }
        }
    }

    fn request_frame(&mut self) -> Option<FrameId> {
        let id = FrameId(self.next_id());
        let closure = self.callback(HostEvent::FrameReady(id));
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                self.frame = Some((id, PendingCallback {
                    handle,
                    _closure: closure,
                }));
                Some(id)
            }
            Err(err) => {
                warn!(target: LOG_TARGET, error = ?err, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.frame.as_ref().is_some_and(|(pending, _)| *pending == id) {
            if let Some((_, callback)) = self.frame.take() {
                let _ = self.window.cancel_animation_frame(callback.handle);
            }
        }
    }
}
