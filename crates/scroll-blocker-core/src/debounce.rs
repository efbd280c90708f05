#![forbid(unsafe_code)]

//! Single-slot resize debounce.
//!
//! Every resize cancels the outstanding timer before arming a new one, so a
//! burst of resize events collapses into one reconciliation and at most one
//! timer is ever pending.

use core::time::Duration;

use tracing::{trace, warn};

use crate::LOG_TARGET;
use crate::host::{ScrollHost, TimerId};

#[derive(Debug, Clone)]
pub(crate) struct ResizeDebounce {
    interval: Duration,
    pending: Option<TimerId>,
}

impl ResizeDebounce {
    pub(crate) const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    /// Restart the quiet period.
    pub(crate) fn arm<H: ScrollHost>(&mut self, host: &mut H) {
        self.cancel(host);
        self.pending = host.start_timer(self.interval);
        match self.pending {
            Some(id) => trace!(target: LOG_TARGET, timer = id.0, "resize debounce armed"),
            None => warn!(target: LOG_TARGET, "host refused resize debounce timer"),
        }
    }

    /// Drop the outstanding timer, if any.
    pub(crate) fn cancel<H: ScrollHost>(&mut self, host: &mut H) {
        if let Some(id) = self.pending.take() {
            host.cancel_timer(id);
            trace!(target: LOG_TARGET, timer = id.0, "resize debounce cancelled");
        }
    }

    /// Consume a fired timer. Returns `false` for ids that are not pending.
    pub(crate) fn settle(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            trace!(target: LOG_TARGET, timer = id.0, "ignoring stale timer");
            false
        }
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    use pretty_assertions::assert_eq;

    #[test]
    fn rearm_cancels_previous_timer() {
        let mut host = RecordingHost::new(1024.0, 1024.0);
        let mut debounce = ResizeDebounce::new(Duration::from_millis(100));

        debounce.arm(&mut host);
        debounce.arm(&mut host);
        debounce.arm(&mut host);

        assert_eq!(host.pending_timers().len(), 1);
        assert!(debounce.is_pending());
    }

    #[test]
    fn settle_accepts_only_the_pending_timer() {
        let mut host = RecordingHost::new(1024.0, 1024.0);
        let mut debounce = ResizeDebounce::new(Duration::from_millis(100));

        debounce.arm(&mut host);
        let first = host.pending_timers()[0];
        debounce.arm(&mut host);
        let second = host.pending_timers()[0];

        assert!(!debounce.settle(first));
        assert!(debounce.settle(second));
        assert!(!debounce.settle(second));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn cancel_without_pending_timer_is_noop() {
        let mut host = RecordingHost::new(1024.0, 1024.0);
        let mut debounce = ResizeDebounce::new(Duration::from_millis(100));
        debounce.cancel(&mut host);
        assert!(host.mutations().is_empty());
    }
}
