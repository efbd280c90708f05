#![forbid(unsafe_code)]

//! Structured logging emitted by lock transitions.
//!
//! Lock and unlock are `DEBUG` events under the `scroll_blocker` target and
//! carry the measurements that drove them; refusals and stale callbacks stay
//! at `TRACE`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use scroll_blocker_core::testing::RecordingHost;
use scroll_blocker_core::{
    BlockerConfig, EnableOptions, LOG_TARGET, ScrollBlocker, StyleWritePolicy,
};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: Arc::clone(&events),
        });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn blocker(host: RecordingHost) -> ScrollBlocker<RecordingHost> {
    let config = BlockerConfig::new().with_style_write_policy(StyleWritePolicy::Immediate);
    ScrollBlocker::new(host, config).unwrap()
}

#[test]
fn lock_and_unlock_are_debug_events_with_measurements() {
    let events = with_captured_events(|| {
        let mut host = RecordingHost::new(1024.0, 1000.0);
        host.set_scroll_offset(250.0);
        let mut b = blocker(host);
        b.enable(EnableOptions::new());
        b.disable(false);
    });

    let debug: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::DEBUG)
        .collect();
    assert_eq!(debug.len(), 2, "{events:#?}");
    assert!(debug.iter().all(|e| e.target == LOG_TARGET));

    let locked = debug[0];
    assert_eq!(locked.message(), "scroll locked");
    assert_eq!(locked.fields.get("scrollbar_width").map(String::as_str), Some("24"));
    assert_eq!(locked.fields.get("scroll_offset").map(String::as_str), Some("250"));

    let unlocked = debug[1];
    assert_eq!(unlocked.message(), "scroll unlocked");
    assert_eq!(unlocked.fields.get("force").map(String::as_str), Some("false"));
}

#[test]
fn refusals_and_noops_stay_at_trace() {
    let events = with_captured_events(|| {
        let mut b = blocker(RecordingHost::new(1024.0, 1000.0));
        b.disable(false);
        b.enable(EnableOptions::new().breakpoint("800px"));
    });

    assert!(!events.is_empty());
    assert!(
        events.iter().all(|e| e.level == tracing::Level::TRACE),
        "{events:#?}"
    );
}

#[test]
fn unparsable_breakpoint_warns() {
    let events = with_captured_events(|| {
        let mut b = blocker(RecordingHost::new(1024.0, 1000.0));
        b.enable(EnableOptions::new().breakpoint("tablet"));
        assert!(!b.is_enabled());
    });

    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warning for unparsable breakpoint");
    assert_eq!(warning.fields.get("breakpoint").map(String::as_str), Some("tablet"));
}
