//! Unsaved-change tracking.

use std::time::Instant;

use super::FlushPolicy;

/// Counts commits that have not reached storage yet.
///
/// Callers pass the current instant explicitly so the timing logic stays
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    pending: usize,
    last_change: Option<Instant>,
    first_unsaved: Option<Instant>,
    flushing: bool,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.pending > 0
    }

    #[inline]
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Number of changes recorded since the last successful flush.
    pub fn pending_changes(&self) -> usize {
        self.pending
    }

    pub fn mark_changed(&mut self, now: Instant) {
        self.pending += 1;
        self.last_change = Some(now);
        self.first_unsaved.get_or_insert(now);
    }

    pub fn start_flush(&mut self) {
        self.flushing = true;
    }

    pub fn flush_complete(&mut self) {
        self.pending = 0;
        self.flushing = false;
        self.last_change = None;
        self.first_unsaved = None;
    }

    /// The changes stay pending and are retried by the next flush.
    pub fn flush_failed(&mut self) {
        self.flushing = false;
    }

    pub fn should_flush(&self, policy: &FlushPolicy, now: Instant) -> bool {
        if !self.is_dirty() || self.flushing {
            return false;
        }
        match (self.last_change, self.first_unsaved) {
            (Some(last), Some(first)) => policy.should_flush(
                millis_between(last, now),
                millis_between(first, now),
            ),
            _ => false,
        }
    }
}

fn millis_between(earlier: Instant, later: Instant) -> u64 {
    u64::try_from(later.saturating_duration_since(earlier).as_millis()).unwrap_or(u64::MAX)
}
