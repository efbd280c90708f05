#![forbid(unsafe_code)]

//! The scroll lock engine.
//!
//! [`ScrollBlocker`] keeps an activation count. The first successful
//! [`enable`](ScrollBlocker::enable) locks the page; the [`disable`] that
//! brings the count back to zero unlocks it.
//!
//! # Lock sequence (count 0 → 1)
//!
//! 1. Measure the scrollbar as `viewport_width - root_client_width`.
//! 2. Save the scroll offset on the body as `top: -<offset>px`; with the lock
//!    class's `position: fixed` this freezes the visible content in place.
//! 3. Add the lock class to the root element.
//! 4. If the scrollbar had a width, write it to the root's `margin-right` and
//!    to every resolved misplaced element, either immediately or on the next
//!    animation frame ([`StyleWritePolicy`]).
//!
//! # Unlock sequence (count → 0)
//!
//! Remove the class, clear the compensation written at lock time, read the
//! body marker back, clear it and scroll to the negated offset. The resize
//! listener, a pending debounce timer and a pending frame are all dropped.
//!
//! # Breakpoints
//!
//! With a breakpoint set, locking is only permitted while the viewport is
//! narrower than it. A resize listener reconciles the lock after the viewport
//! settles: a viewport that grew past the breakpoint releases the lock for
//! every holder at once (the count drops to zero). A viewport still below it
//! leaves the count unchanged.
//!
//! [`disable`]: ScrollBlocker::disable

use serde::Serialize;
use tracing::{debug, trace};

use crate::breakpoint::{Breakpoint, lock_permitted};
use crate::config::{
    BODY_OFFSET_PROPERTY, BlockerConfig, ConfigError, ROOT_COMPENSATION_PROPERTY,
    StyleWritePolicy,
};
use crate::debounce::ResizeDebounce;
use crate::host::{FrameId, HostEvent, Node, ScrollHost};
use crate::misplaced::{self, MisplacedElement, ResolvedTarget};
use crate::{LOG_TARGET, parse_css_number, px};

/// Parameters of one [`ScrollBlocker::enable`] call.
#[derive(Debug)]
pub struct EnableOptions<E> {
    breakpoint: Option<String>,
    misplaced_elements: Vec<MisplacedElement<E>>,
}

impl<E> Default for EnableOptions<E> {
    fn default() -> Self {
        Self {
            breakpoint: None,
            misplaced_elements: Vec::new(),
        }
    }
}

impl<E> EnableOptions<E> {
    /// Options that change nothing: reuse the stored breakpoint, add no elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored breakpoint. An empty string clears it.
    #[must_use]
    pub fn breakpoint(mut self, breakpoint: impl Into<String>) -> Self {
        self.breakpoint = Some(breakpoint.into());
        self
    }

    /// Compensate an extra element for this activation.
    #[must_use]
    pub fn misplaced_element(mut self, element: MisplacedElement<E>) -> Self {
        self.misplaced_elements.push(element);
        self
    }

    #[must_use]
    pub fn misplaced_elements(
        mut self,
        elements: impl IntoIterator<Item = MisplacedElement<E>>,
    ) -> Self {
        self.misplaced_elements.extend(elements);
        self
    }
}

/// State of one lock, from the 0 → 1 transition until release.
#[derive(Debug)]
struct LockSession<E> {
    /// Scrollbar width as a CSS length; `None` when there was no scrollbar.
    compensation: Option<String>,
    targets: Vec<ResolvedTarget<E>>,
    /// Compensation is waiting for this frame.
    pending_frame: Option<FrameId>,
}

/// Diagnostic view of the engine, serialisable for host tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockerSnapshot {
    pub enabled: bool,
    pub activation_count: u32,
    pub breakpoint: Option<String>,
    pub listening_for_resize: bool,
    pub resize_pending: bool,
    pub compensation: Option<String>,
    pub compensated_targets: usize,
    pub frame_pending: bool,
}

impl BlockerSnapshot {
    /// Single-line JSON encoding.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Reference-counted page scroll lock.
pub struct ScrollBlocker<H: ScrollHost> {
    host: H,
    config: BlockerConfig<H::Element>,
    activation_count: u32,
    breakpoint: Option<Breakpoint>,
    active_misplaced: Vec<MisplacedElement<H::Element>>,
    resize: ResizeDebounce,
    listening: bool,
    session: Option<LockSession<H::Element>>,
}

impl<H: ScrollHost> ScrollBlocker<H> {
    /// Build an engine over `host`. Nothing on the page changes until `enable`.
    pub fn new(host: H, config: BlockerConfig<H::Element>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            host,
            resize: ResizeDebounce::new(config.debounce()),
            config,
            activation_count: 0,
            breakpoint: None,
            active_misplaced: Vec::new(),
            listening: false,
            session: None,
        })
    }

    /// Whether the page is currently locked.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.activation_count > 0
    }

    /// Number of outstanding activations.
    #[must_use]
    pub const fn activation_count(&self) -> u32 {
        self.activation_count
    }

    /// The breakpoint remembered from the last `enable` that supplied one.
    #[must_use]
    pub fn breakpoint(&self) -> Option<&Breakpoint> {
        self.breakpoint.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &BlockerConfig<H::Element> {
        &self.config
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutably access the host (e.g. to bind callbacks after construction).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Request a lock.
    ///
    /// A call refused by the breakpoint changes nothing: the count, the page
    /// and the resize listener are all left as they were.
    pub fn enable(&mut self, options: EnableOptions<H::Element>) {
        let EnableOptions {
            breakpoint,
            misplaced_elements,
        } = options;
        if let Some(raw) = breakpoint {
            self.breakpoint = Breakpoint::parse(&raw);
        }

        let viewport_width = self.host.viewport_width();
        if !lock_permitted(self.breakpoint.as_ref(), viewport_width) {
            trace!(
                target: LOG_TARGET,
                viewport_width,
                breakpoint = ?self.breakpoint.as_ref().map(Breakpoint::as_str),
                "enable refused: viewport is not below breakpoint"
            );
            return;
        }

        self.active_misplaced =
            misplaced::merge(self.config.misplaced_elements(), misplaced_elements);
        if self.activation_count == 0 {
            self.lock(viewport_width);
        }
        if self.breakpoint.is_some() && !self.listening {
            self.host.listen_resize();
            self.listening = true;
        }
        self.activation_count = self.activation_count.saturating_add(1);
        trace!(
            target: LOG_TARGET,
            activation_count = self.activation_count,
            "enable"
        );
    }

    /// Release one activation, or all of them with `force`.
    ///
    /// Without a matching `enable` this does nothing.
    pub fn disable(&mut self, force: bool) {
        if self.activation_count == 0 {
            trace!(target: LOG_TARGET, force, "disable ignored: not enabled");
            return;
        }
        self.activation_count = if force { 0 } else { self.activation_count - 1 };
        if self.activation_count > 0 {
            trace!(
                target: LOG_TARGET,
                activation_count = self.activation_count,
                "disable: lock still held"
            );
            return;
        }
        self.unlock(force);
    }

    /// Deliver an asynchronous notification from the host.
    ///
    /// Timer and frame ids that the engine is not waiting for are ignored, so
    /// reconciliation only ever runs from the engine's own debounce timer.
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Resize => {
                if self.listening {
                    self.resize.arm(&mut self.host);
                } else {
                    trace!(target: LOG_TARGET, "resize ignored: not listening");
                }
            }
            HostEvent::TimerFired(id) => {
                if self.resize.settle(id) {
                    self.reconcile();
                }
            }
            HostEvent::FrameReady(id) => self.flush_frame(id),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> BlockerSnapshot {
        let session = self.session.as_ref();
        BlockerSnapshot {
            enabled: self.is_enabled(),
            activation_count: self.activation_count,
            breakpoint: self.breakpoint.as_ref().map(|bp| bp.as_str().to_owned()),
            listening_for_resize: self.listening,
            resize_pending: self.resize.is_pending(),
            compensation: session.and_then(|s| s.compensation.clone()),
            compensated_targets: session.map_or(0, |s| s.targets.len()),
            frame_pending: session.is_some_and(|s| s.pending_frame.is_some()),
        }
    }

    fn lock(&mut self, viewport_width: f64) {
        let scrollbar_width = viewport_width - self.host.root_client_width();
        let scroll_offset = self.host.scroll_offset();
        self.host
            .set_style(Node::Body, BODY_OFFSET_PROPERTY, &px(-scroll_offset + 0.0));

        let mut session = LockSession {
            compensation: None,
            targets: Vec::new(),
            pending_frame: None,
        };
        if scrollbar_width > 0.0 {
            session.compensation = Some(px(scrollbar_width));
            session.targets = misplaced::resolve(&self.active_misplaced);
        }

        self.host.add_root_class(self.config.class_name());

        if let Some(width) = session.compensation.as_deref() {
            let deferred = match self.config.style_write_policy() {
                StyleWritePolicy::Immediate => None,
                StyleWritePolicy::NextFrame => self.host.request_frame(),
            };
            match deferred {
                Some(frame) => session.pending_frame = Some(frame),
                None => write_compensation(&mut self.host, width, &session.targets),
            }
        }

        debug!(
            target: LOG_TARGET,
            viewport_width,
            scrollbar_width,
            scroll_offset,
            compensated_targets = session.targets.len(),
            "scroll locked"
        );
        self.session = Some(session);
    }

    fn unlock(&mut self, force: bool) {
        self.host.remove_root_class(self.config.class_name());

        if let Some(session) = self.session.take() {
            match session.pending_frame {
                // Compensation was never written.
                Some(frame) => self.host.cancel_frame(frame),
                None if session.compensation.is_some() => {
                    clear_compensation(&mut self.host, &session.targets);
                }
                None => {}
            }
        }

        let marker = self.host.style(Node::Body, BODY_OFFSET_PROPERTY);
        // `+ 0.0` folds a negated zero into plain zero.
        let restore = -marker.as_deref().and_then(parse_css_number).unwrap_or(0.0) + 0.0;
        self.host.remove_style(Node::Body, BODY_OFFSET_PROPERTY);
        self.host.scroll_to(restore);

        if self.listening {
            self.host.unlisten_resize();
            self.listening = false;
        }
        self.resize.cancel(&mut self.host);
        self.active_misplaced.clear();

        debug!(target: LOG_TARGET, force, scroll_offset = restore, "scroll unlocked");
    }

    fn flush_frame(&mut self, id: FrameId) {
        let Some(session) = self.session.as_mut() else {
            trace!(target: LOG_TARGET, frame = id.0, "frame ignored: not locked");
            return;
        };
        if session.pending_frame != Some(id) {
            trace!(target: LOG_TARGET, frame = id.0, "frame ignored: stale");
            return;
        }
        session.pending_frame = None;
        if let Some(width) = session.compensation.as_deref() {
            write_compensation(&mut self.host, width, &session.targets);
        }
    }

    fn reconcile(&mut self) {
        if !self.is_enabled() {
            return;
        }
        let viewport_width = self.host.viewport_width();
        if lock_permitted(self.breakpoint.as_ref(), viewport_width) {
            trace!(
                target: LOG_TARGET,
                viewport_width,
                "resize settled below breakpoint; lock kept"
            );
        } else {
            debug!(
                target: LOG_TARGET,
                viewport_width,
                breakpoint = ?self.breakpoint.as_ref().map(Breakpoint::as_str),
                "resize settled above breakpoint; releasing lock"
            );
            self.disable(true);
        }
    }
}

impl<H: ScrollHost + core::fmt::Debug> core::fmt::Debug for ScrollBlocker<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollBlocker")
            .field("host", &self.host)
            .field("activation_count", &self.activation_count)
            .field("breakpoint", &self.breakpoint)
            .field("listening", &self.listening)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn write_compensation<H: ScrollHost>(
    host: &mut H,
    width: &str,
    targets: &[ResolvedTarget<H::Element>],
) {
    host.set_style(Node::Root, ROOT_COMPENSATION_PROPERTY, width);
    for target in targets {
        host.set_style(Node::Element(&target.element), &target.property, width);
    }
}

fn clear_compensation<H: ScrollHost>(host: &mut H, targets: &[ResolvedTarget<H::Element>]) {
    host.remove_style(Node::Root, ROOT_COMPENSATION_PROPERTY);
    for target in targets {
        host.remove_style(Node::Element(&target.element), &target.property);
    }
}
