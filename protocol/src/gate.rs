//! Fixed-window throttle for administrative commands.

use std::time::{Duration, Instant};

/// Default minimum spacing between two accepted commands.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Accepts at most one command per `min_interval`, measured from the last
/// accepted command. Rejected attempts leave the window untouched and idle
/// time does not accumulate credit.
#[derive(Debug, Clone)]
pub struct CommandGate {
    min_interval: Duration,
    last_accepted_at: Option<Instant>,
}

impl CommandGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted_at: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns true and restarts the window if a command may be sent at `now`.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        let open = match self.last_accepted_at {
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        };

        if open {
            self.last_accepted_at = Some(now);
        }
        open
    }
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
