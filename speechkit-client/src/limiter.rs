//! Request pacing for the synthesis API.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Paces outbound requests to a fixed maximum rate.
///
/// Grants are spaced at least `1 / requests_per_second` apart, measured from
/// grant time rather than request completion. The internal mutex is the
/// single arbitration point, so one shared instance serializes pacing
/// decisions across however many workers call `acquire()`.
pub struct RateLimiter {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Self {
        let rps = if requests_per_second > 0.0 {
            requests_per_second
        } else {
            1.0
        };

        Self {
            min_interval: Duration::from_secs_f64(1.0 / rps),
            last_grant: Mutex::new(None),
        }
    }

    /// Wait until the next pacing slot is available, then record the grant.
    pub async fn acquire(&self) {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            let next_slot = previous + self.min_interval;
            if next_slot > Instant::now() {
                tokio::time::sleep_until(next_slot).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
