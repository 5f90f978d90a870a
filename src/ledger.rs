use chrono::{DateTime, Local};

/// Minutes earned today, bounded by the parent's daily limit.
///
/// The limit itself lives in [`crate::settings::Settings`] and is passed in,
/// so a parent changing it takes effect on the next credit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardLedger {
    earned_today: u32,
    last_earned: Option<DateTime<Local>>,
}

impl RewardLedger {
    pub fn earned_today(&self) -> u32 {
        self.earned_today
    }

    #[cfg(test)]
    pub fn last_earned(&self) -> Option<DateTime<Local>> {
        self.last_earned
    }

    pub fn is_capped(&self, cap: u32) -> bool {
        self.earned_today >= cap
    }

    pub fn headroom(&self, cap: u32) -> u32 {
        cap.saturating_sub(self.earned_today)
    }

    /// Credit `amount` minutes without passing `cap`. Returns the minutes
    /// actually credited.
    pub fn add_earned_minutes(&mut self, amount: u32, cap: u32, now: DateTime<Local>) -> u32 {
        let before = self.earned_today;
        self.earned_today = cap.min(self.earned_today.saturating_add(amount));
        self.last_earned = Some(now);
        self.earned_today.saturating_sub(before)
    }

    /// Start a new day's allowance if the last credit happened on another
    /// local calendar date. Only checked at startup.
    pub fn reset_if_new_day(&mut self, now: DateTime<Local>) -> bool {
        match self.last_earned {
            Some(last) if last.date_naive() != now.date_naive() => {
                self.earned_today = 0;
                true
            }
            _ => false,
        }
    }

    pub fn clamp_to(&mut self, cap: u32) {
        self.earned_today = self.earned_today.min(cap);
    }
}
