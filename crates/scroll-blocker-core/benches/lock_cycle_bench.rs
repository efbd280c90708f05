#![forbid(unsafe_code)]

use core::time::Duration;
use criterion::{Criterion, criterion_group, criterion_main};
use scroll_blocker_core::testing::{FakeElement, RecordingHost};
use scroll_blocker_core::{
    BlockerConfig, EnableOptions, HostEvent, MisplacedElement, ScrollBlocker, StyleWritePolicy,
};
use std::hint::black_box;

fn engine(policy: StyleWritePolicy) -> ScrollBlocker<RecordingHost> {
    let config = BlockerConfig::new()
        .with_style_write_policy(policy)
        .with_misplaced_element(MisplacedElement::elements(
            (0..16).map(FakeElement).collect(),
            "padding-right",
        ));
    ScrollBlocker::new(RecordingHost::new(1280.0, 1265.0), config)
        .expect("bench config should be valid")
}

fn bench_lock_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_blocker/lock_cycle");

    group.bench_function("enable_disable_immediate_16_targets", |b| {
        let mut blocker = engine(StyleWritePolicy::Immediate);
        b.iter(|| {
            blocker.enable(EnableOptions::new());
            black_box(blocker.is_enabled());
            blocker.disable(false);
            blocker.host_mut().clear_mutations();
        });
    });

    group.bench_function("nested_8_deep_next_frame", |b| {
        let mut blocker = engine(StyleWritePolicy::NextFrame);
        b.iter(|| {
            for _ in 0..8 {
                blocker.enable(EnableOptions::new());
            }
            for event in blocker.host_mut().take_frames() {
                blocker.handle_event(event);
            }
            for _ in 0..8 {
                blocker.disable(false);
            }
            black_box(blocker.activation_count());
            blocker.host_mut().clear_mutations();
        });
    });

    group.finish();
}

fn bench_resize_storm(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_blocker/resize_storm");

    group.bench_function("64_resizes_one_reconcile", |b| {
        let mut blocker = engine(StyleWritePolicy::Immediate);
        blocker.enable(EnableOptions::new().breakpoint("2000px"));
        b.iter(|| {
            for _ in 0..64 {
                blocker.handle_event(HostEvent::Resize);
            }
            for event in blocker.host_mut().advance(Duration::from_millis(100)) {
                blocker.handle_event(event);
            }
            black_box(blocker.is_enabled());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lock_cycle, bench_resize_storm);
criterion_main!(benches);
