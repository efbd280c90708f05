#![forbid(unsafe_code)]

//! Viewport-width breakpoints.
//!
//! A breakpoint limits locking to narrow viewports: the lock is permitted only
//! while the breakpoint width is strictly greater than the viewport width.
//! Values are CSS lengths (`"800px"`); only the numeric prefix is compared.

use core::fmt;

use tracing::warn;

use crate::{LOG_TARGET, parse_css_number};

/// A breakpoint as supplied by the caller, with its parsed width.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    raw: String,
    width: Option<f64>,
}

impl Breakpoint {
    /// Parse a breakpoint. Blank input means "no breakpoint" and yields `None`.
    ///
    /// Input without a numeric prefix is kept (so it still counts as set) but
    /// never permits a lock.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let width = parse_css_number(trimmed).filter(|w| w.is_finite());
        if width.is_none() {
            warn!(
                target: LOG_TARGET,
                breakpoint = %trimmed,
                "breakpoint has no numeric width; locking will be refused"
            );
        }
        Some(Self {
            raw: trimmed.to_owned(),
            width,
        })
    }

    /// Breakpoint from a pixel width.
    #[must_use]
    pub fn from_px(width: f64) -> Self {
        Self {
            raw: crate::px(width),
            width: Some(width).filter(|w| w.is_finite()),
        }
    }

    /// The breakpoint exactly as supplied (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed numeric width, if any.
    #[must_use]
    pub const fn width(&self) -> Option<f64> {
        self.width
    }

    /// Whether a viewport of `viewport_width` is narrow enough to lock.
    #[must_use]
    pub fn permits(&self, viewport_width: f64) -> bool {
        self.width.is_some_and(|w| w > viewport_width)
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Lock predicate: no breakpoint always permits, otherwise defer to it.
#[must_use]
pub fn lock_permitted(breakpoint: Option<&Breakpoint>, viewport_width: f64) -> bool {
    breakpoint.is_none_or(|bp| bp.permits(viewport_width))
}
