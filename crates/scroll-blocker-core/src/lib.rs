#![forbid(unsafe_code)]

//! `scroll-blocker-core` stops a page from scrolling while overlays are open,
//! without the content jump that usually comes with it.
//!
//! Design goals:
//! - **Reference counted**: independent UI features may each request a lock;
//!   the page is released only when the last one lets go.
//! - **Visually stable**: the width of the disappearing scrollbar is written
//!   back as spacing on the root element and on any configured
//!   "misplaced" elements, and the scroll offset is restored on release.
//! - **Host-driven**: every read and write of the page goes through the
//!   [`ScrollHost`] trait. Timers and animation frames are requested from the
//!   host and reported back as [`HostEvent`]s, so the engine never blocks and
//!   is fully deterministic under test.
//!
//! The browser binding lives in `scroll-blocker-web`; this crate has no
//! dependency on `wasm-bindgen`.

pub mod breakpoint;
pub mod config;
mod debounce;
pub mod engine;
pub mod host;
pub mod misplaced;
pub mod testing;

pub use breakpoint::Breakpoint;
pub use config::{BlockerConfig, BlockerOptions, ConfigError, StyleWritePolicy};
pub use engine::{BlockerSnapshot, EnableOptions, ScrollBlocker};
pub use host::{FrameId, HostEvent, Node, ScrollHost, TimerId};
pub use misplaced::{MisplacedElement, Producer, Target};

/// `tracing` target used by every event this crate emits.
pub const LOG_TARGET: &str = "scroll_blocker";

/// Format a CSS pixel length.
///
/// Integral values print without a fraction (`24.0` becomes `"24px"`).
#[must_use]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Parse the numeric prefix of a CSS length such as `"800px"` or `" -12.5em"`.
///
/// Leading whitespace and a sign are accepted, the unit suffix is ignored.
/// Returns `None` when no digits are present.
#[must_use]
pub fn parse_css_number(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok()
}
