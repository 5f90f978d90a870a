use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Earned play time being spent. Owns its own one-second schedule: armed by
/// [`Countdown::start`], disarmed on reaching zero or on [`Countdown::cancel`].
#[derive(Debug, Clone)]
pub struct Countdown {
    total_secs: u64,
    seconds_remaining: u64,
    next_tick: Option<Instant>,
}

impl Countdown {
    pub fn start(minutes: u32, now: Instant) -> Self {
        let secs = u64::from(minutes) * 60;
        Self {
            total_secs: secs,
            seconds_remaining: secs,
            next_tick: (secs > 0).then(|| now + TICK_PERIOD),
        }
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.total_secs == 0 {
            return 1.0;
        }
        let remaining = self.seconds_remaining as f64 / self.total_secs as f64;
        (1.0 - remaining).clamp(0.0, 1.0)
    }

    pub fn tick(&mut self) {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.next_tick = None;
        }
    }

    /// Fire every tick that has come due by `now`. Returns `true` only on the
    /// call that brings the countdown to zero.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut expired = false;
        while let Some(due) = self.next_tick {
            if due > now {
                break;
            }
            self.tick();
            if let Some(next) = self.next_tick.as_mut() {
                *next = due + TICK_PERIOD;
            } else {
                expired = true;
            }
        }
        expired
    }

    pub fn cancel(&mut self) {
        self.next_tick = None;
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
