#![forbid(unsafe_code)]

//! The page surface the engine drives.
//!
//! A [`ScrollHost`] answers the few layout queries the engine needs and applies
//! the style/class mutations it decides on. Asynchronous work (the resize
//! debounce timer and the deferred style write) is requested from the host,
//! which later reports completion through [`HostEvent`]. The engine never
//! sleeps and never spawns anything itself.

use core::time::Duration;

/// Handle for a timer started through [`ScrollHost::start_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

/// Handle for an animation frame requested through [`ScrollHost::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u32);

/// Asynchronous notifications the host delivers back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The viewport was resized.
    Resize,
    /// A timer previously started by the engine elapsed.
    TimerFired(TimerId),
    /// An animation frame previously requested by the engine is about to paint.
    FrameReady(FrameId),
}

/// A node whose inline style the engine touches.
#[derive(Debug, PartialEq, Eq)]
pub enum Node<'a, E> {
    /// The document root (`<html>`).
    Root,
    /// The document body.
    Body,
    /// A caller-supplied misplaced element.
    Element(&'a E),
}

// Manual impls: a derive would demand `E: Copy`.
impl<E> Clone for Node<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Node<'_, E> {}

/// Page operations required by [`crate::ScrollBlocker`].
///
/// Implementations are expected to be cheap; every method is called on the UI
/// thread in direct response to an engine operation.
pub trait ScrollHost {
    /// Element handle used for misplaced-element targets.
    type Element: Clone + core::fmt::Debug;

    /// Current layout viewport width (including any visible scrollbar).
    fn viewport_width(&self) -> f64;

    /// Client width of the root element (the viewport minus the scrollbar).
    fn root_client_width(&self) -> f64;

    /// Current vertical scroll offset of the window.
    fn scroll_offset(&self) -> f64;

    /// Programmatically scroll the window to a vertical offset.
    fn scroll_to(&mut self, offset: f64);

    /// Add a class to the root element.
    fn add_root_class(&mut self, class: &str);

    /// Remove a class from the root element.
    fn remove_root_class(&mut self, class: &str);

    /// Read an inline style property, `None` when unset or empty.
    fn style(&self, node: Node<'_, Self::Element>, property: &str) -> Option<String>;

    /// Write an inline style property.
    fn set_style(&mut self, node: Node<'_, Self::Element>, property: &str, value: &str);

    /// Reset an inline style property to its unset state.
    fn remove_style(&mut self, node: Node<'_, Self::Element>, property: &str);

    /// Start delivering [`HostEvent::Resize`].
    fn listen_resize(&mut self);

    /// Stop delivering [`HostEvent::Resize`].
    fn unlisten_resize(&mut self);

    /// Arm a one-shot timer that reports [`HostEvent::TimerFired`] after `delay`.
    ///
    /// Returns `None` when the host cannot schedule timers.
    fn start_timer(&mut self, delay: Duration) -> Option<TimerId>;

    /// Cancel a timer; unknown or already-fired ids are ignored.
    fn cancel_timer(&mut self, id: TimerId);

    /// Request a [`HostEvent::FrameReady`] before the next paint.
    ///
    /// Returns `None` when the host has no frame scheduler.
    fn request_frame(&mut self) -> Option<FrameId>;

    /// Cancel a frame request; unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}
