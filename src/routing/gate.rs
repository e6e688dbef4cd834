//! Sliding-window admission gate for deep-research escalation.
//!
//! Research-tier models are expensive; the gate caps how many escalated
//! chains may be built per window. A refused escalation is silent — the
//! caller just gets the un-escalated fallback list.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

const WINDOW_SECS: u64 = 3600;

/// A sliding-window counter.
struct SlidingWindow {
    window_secs: u64,
    max_count: u64,
    events: VecDeque<DateTime<Utc>>,
}

impl SlidingWindow {
    fn new(window_secs: u64, max_count: u64) -> Self {
        Self {
            window_secs,
            max_count,
            events: VecDeque::new(),
        }
    }

    /// Discard events older than the window boundary.
    fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::seconds(self.window_secs as i64);
        while self.events.front().is_some_and(|t| *t <= cutoff) {
            self.events.pop_front();
        }
    }

    fn is_limited(&mut self, now: DateTime<Utc>) -> bool {
        self.evict(now);
        self.events.len() as u64 >= self.max_count
    }

    fn record(&mut self, at: DateTime<Utc>) {
        self.evict(at);
        self.events.push_back(at);
    }
}

/// Caps deep-research escalations per hour.
pub struct EscalationGate {
    window: Mutex<SlidingWindow>,
}

impl EscalationGate {
    pub fn new(max_per_hour: u64) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(WINDOW_SECS, max_per_hour)),
        }
    }

    /// Returns `true` and records the escalation if the window admits it.
    pub async fn admit(&self) -> bool {
        let now = Utc::now();
        let mut window = self.window.lock().await;
        if window.is_limited(now) {
            debug!("deep-research escalation refused: window exhausted");
            return false;
        }
        window.record(now);
        true
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_the_cap_then_refuses() {
        let gate = EscalationGate::new(3);
        assert!(gate.admit().await);
        assert!(gate.admit().await);
        assert!(gate.admit().await);
        assert!(!gate.admit().await);
        assert!(!gate.admit().await);
    }

    #[tokio::test]
    async fn zero_cap_never_admits() {
        let gate = EscalationGate::new(0);
        assert!(!gate.admit().await);
    }

    #[test]
    fn window_evicts_old_events() {
        let mut window = SlidingWindow::new(60, 2);
        let start = Utc::now();
        window.record(start - Duration::seconds(120));
        window.record(start - Duration::seconds(90));
        // Both events are past the boundary — nothing counted.
        assert!(!window.is_limited(start));
        assert!(window.events.is_empty());
    }
}
