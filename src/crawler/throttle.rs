//! Global request pacing
//!
//! Every outgoing request, from every worker and every retry, reserves a
//! slot here first. Slots are handed out at least `delay` apart, so the
//! politeness delay holds across concurrent fetches.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Shared slot reservation for outgoing requests
#[derive(Debug, Default)]
pub struct Throttle {
    /// Start time of the most recently reserved slot
    last_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next request slot and sleeps until it starts
    ///
    /// The slot is `max(now, previous_slot) + delay`. The first request of a
    /// session also pays the delay.
    ///
    /// # Returns
    ///
    /// The time spent waiting
    pub async fn acquire(&self, delay: Duration) -> Duration {
        let now = Instant::now();
        let slot = {
            let mut last = self.last_slot.lock().await;
            let base = match *last {
                Some(previous) if previous > now => previous,
                _ => now,
            };
            let slot = base + delay;
            *last = Some(slot);
            slot
        };

        tokio::time::sleep_until(slot).await;
        slot.saturating_duration_since(now)
    }
}
