#![forbid(unsafe_code)]

//! In-memory [`ScrollHost`] for tests, benches and native embedding demos.
//!
//! [`RecordingHost`] models the parts of a page the engine touches (widths,
//! scroll offset, root classes, inline styles) and logs every mutation in
//! order. Time is driven explicitly with [`RecordingHost::advance`], which
//! returns the timer events that became due.

use core::time::Duration;
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{FrameId, HostEvent, Node, ScrollHost, TimerId};

/// Stand-in element handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeElement(pub u32);

/// Which node a recorded style belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKey {
    Root,
    Body,
    Element(u32),
}

impl StyleKey {
    fn of(node: Node<'_, FakeElement>) -> Self {
        match node {
            Node::Root => Self::Root,
            Node::Body => Self::Body,
            Node::Element(el) => Self::Element(el.0),
        }
    }
}

/// One observable change made through the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddClass(String),
    RemoveClass(String),
    SetStyle {
        key: StyleKey,
        property: String,
        value: String,
    },
    RemoveStyle {
        key: StyleKey,
        property: String,
    },
    ScrollTo(f64),
    ListenResize,
    UnlistenResize,
}

/// Deterministic page model.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    viewport_width: f64,
    client_width: f64,
    scroll_offset: f64,
    classes: BTreeSet<String>,
    styles: BTreeMap<(StyleKey, String), String>,
    listening: bool,
    now: Duration,
    next_id: u32,
    timers: Vec<(TimerId, Duration)>,
    frames: Vec<FrameId>,
    mutations: Vec<Mutation>,
}

impl RecordingHost {
    /// A page whose viewport is `viewport_width` wide and whose root element
    /// is `client_width` wide (the difference is the scrollbar).
    #[must_use]
    pub fn new(viewport_width: f64, client_width: f64) -> Self {
        Self {
            viewport_width,
            client_width,
            ..Self::default()
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn set_root_client_width(&mut self, width: f64) {
        self.client_width = width;
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    #[must_use]
    pub fn has_root_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    #[must_use]
    pub fn style_of(&self, key: StyleKey, property: &str) -> Option<&str> {
        self.styles
            .get(&(key, property.to_owned()))
            .map(String::as_str)
    }

    /// Remove a style behind the engine's back (not logged).
    pub fn clear_style(&mut self, key: StyleKey, property: &str) {
        self.styles.remove(&(key, property.to_owned()));
    }

    /// Every inline style currently set, in key order.
    #[must_use]
    pub fn styles(&self) -> Vec<(StyleKey, String, String)> {
        self.styles
            .iter()
            .map(|((key, prop), value)| (*key, prop.clone(), value.clone()))
            .collect()
    }

    #[must_use]
    pub fn root_classes(&self) -> Vec<String> {
        self.classes.iter().cloned().collect()
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn clear_mutations(&mut self) {
        self.mutations.clear();
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Outstanding timers, earliest deadline first.
    #[must_use]
    pub fn pending_timers(&self) -> Vec<TimerId> {
        let mut timers = self.timers.clone();
        timers.sort_by_key(|&(id, deadline)| (deadline, id));
        timers.into_iter().map(|(id, _)| id).collect()
    }

    #[must_use]
    pub fn pending_frames(&self) -> &[FrameId] {
        &self.frames
    }

    /// Advance the clock and return the timer events that are now due.
    pub fn advance(&mut self, dt: Duration) -> Vec<HostEvent> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        let mut due: Vec<(TimerId, Duration)> = self
            .timers
            .iter()
            .copied()
            .filter(|&(_, deadline)| deadline <= now)
            .collect();
        self.timers.retain(|&(_, deadline)| deadline > now);
        due.sort_by_key(|&(id, deadline)| (deadline, id));
        due.into_iter()
            .map(|(id, _)| HostEvent::TimerFired(id))
            .collect()
    }

    /// Run the frame scheduler: return every requested frame as an event.
    pub fn take_frames(&mut self) -> Vec<HostEvent> {
        self.frames.drain(..).map(HostEvent::FrameReady).collect()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }
}

impl ScrollHost for RecordingHost {
    type Element = FakeElement;

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn root_client_width(&self) -> f64 {
        self.client_width
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = offset;
        self.mutations.push(Mutation::ScrollTo(offset));
    }

    fn add_root_class(&mut self, class: &str) {
        self.classes.insert(class.to_owned());
        self.mutations.push(Mutation::AddClass(class.to_owned()));
    }

    fn remove_root_class(&mut self, class: &str) {
        self.classes.remove(class);
        self.mutations.push(Mutation::RemoveClass(class.to_owned()));
    }

    fn style(&self, node: Node<'_, FakeElement>, property: &str) -> Option<String> {
        self.style_of(StyleKey::of(node), property)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn set_style(&mut self, node: Node<'_, FakeElement>, property: &str, value: &str) {
        let key = StyleKey::of(node);
        self.styles
            .insert((key, property.to_owned()), value.to_owned());
        self.mutations.push(Mutation::SetStyle {
            key,
            property: property.to_owned(),
            value: value.to_owned(),
        });
    }

    fn remove_style(&mut self, node: Node<'_, FakeElement>, property: &str) {
        let key = StyleKey::of(node);
        self.styles.remove(&(key, property.to_owned()));
        self.mutations.push(Mutation::RemoveStyle {
            key,
            property: property.to_owned(),
        });
    }

    fn listen_resize(&mut self) {
        self.listening = true;
        self.mutations.push(Mutation::ListenResize);
    }

    fn unlisten_resize(&mut self) {
        self.listening = false;
        self.mutations.push(Mutation::UnlistenResize);
    }

    fn start_timer(&mut self, delay: Duration) -> Option<TimerId> {
        let id = TimerId(self.next_id());
        self.timers.push((id, self.now.saturating_add(delay)));
        Some(id)
    }

    fn cancel_timer(&mut self, id: TimerId) {
        self.timers.retain(|&(pending, _)| pending != id);
    }

    fn request_frame(&mut self) -> Option<FrameId> {
        let id = FrameId(self.next_id());
        self.frames.push(id);
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.retain(|&pending| pending != id);
    }
}
