use std::ops::RangeInclusive;

use crate::config::Config;

// ============================================================================
// Bounds & Defaults
// ============================================================================

const PASSING_BOUNDS: RangeInclusive<u32> = 50..=100;
const QUESTIONS_BOUNDS: RangeInclusive<u32> = 5..=30;
const REWARD_BOUNDS: RangeInclusive<u32> = 1..=60;
const DAILY_MAX_BOUNDS: RangeInclusive<u32> = 10..=240;

pub const DEFAULT_PASSING: u32 = 80;
pub const DEFAULT_QUESTIONS: u32 = 10;
pub const DEFAULT_REWARD: u32 = 10;
pub const DEFAULT_DAILY_MAX: u32 = 60;

// ============================================================================
// Settings
// ============================================================================

/// Parent-owned quiz and reward parameters. Every field is kept inside its
/// bounds; values only enter through [`Settings::set`] or [`Settings::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    passing_percentage: u32,
    questions_per_session: u32,
    reward_minutes: u32,
    daily_max_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            passing_percentage: DEFAULT_PASSING,
            questions_per_session: DEFAULT_QUESTIONS,
            reward_minutes: DEFAULT_REWARD,
            daily_max_minutes: DEFAULT_DAILY_MAX,
        }
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        let mut settings = Self::default();
        settings.set(SettingsField::PassingPercentage, config.passing_percentage);
        settings.set(SettingsField::QuestionsPerSession, config.questions_per_session);
        settings.set(SettingsField::RewardMinutes, config.reward_minutes);
        settings.set(SettingsField::DailyMaxMinutes, config.daily_max_minutes);
        settings
    }

    pub fn passing_percentage(&self) -> u32 {
        self.passing_percentage
    }

    pub fn questions_per_session(&self) -> u32 {
        self.questions_per_session
    }

    pub fn reward_minutes(&self) -> u32 {
        self.reward_minutes
    }

    pub fn daily_max_minutes(&self) -> u32 {
        self.daily_max_minutes
    }

    pub fn get(&self, field: SettingsField) -> u32 {
        match field {
            SettingsField::PassingPercentage => self.passing_percentage,
            SettingsField::QuestionsPerSession => self.questions_per_session,
            SettingsField::RewardMinutes => self.reward_minutes,
            SettingsField::DailyMaxMinutes => self.daily_max_minutes,
        }
    }

    pub fn set(&mut self, field: SettingsField, value: impl Into<i64>) {
        let value = clamp(field, value.into());
        match field {
            SettingsField::PassingPercentage => self.passing_percentage = value,
            SettingsField::QuestionsPerSession => self.questions_per_session = value,
            SettingsField::RewardMinutes => self.reward_minutes = value,
            SettingsField::DailyMaxMinutes => self.daily_max_minutes = value,
        }
    }

    pub fn step(&mut self, field: SettingsField, delta: i64) {
        let current = i64::from(self.get(field));
        self.set(field, current + delta);
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SettingsField {
    PassingPercentage,
    QuestionsPerSession,
    RewardMinutes,
    DailyMaxMinutes,
}

impl SettingsField {
    pub fn label(self) -> &'static str {
        match self {
            Self::PassingPercentage => "🎯 Passing Score",
            Self::QuestionsPerSession => "❓ Questions Per Quiz",
            Self::RewardMinutes => "🎮 Reward Per Pass",
            Self::DailyMaxMinutes => "📅 Daily Limit",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::PassingPercentage => "%",
            Self::QuestionsPerSession => " questions",
            Self::RewardMinutes | Self::DailyMaxMinutes => " min",
        }
    }

    pub fn bounds(self) -> RangeInclusive<u32> {
        match self {
            Self::PassingPercentage => PASSING_BOUNDS,
            Self::QuestionsPerSession => QUESTIONS_BOUNDS,
            Self::RewardMinutes => REWARD_BOUNDS,
            Self::DailyMaxMinutes => DAILY_MAX_BOUNDS,
        }
    }

    /// Fields shown on the parent screen. The daily limit only exists when a
    /// ledger is kept.
    pub fn visible(with_daily_cap: bool) -> &'static [SettingsField] {
        if with_daily_cap {
            &[
                Self::PassingPercentage,
                Self::QuestionsPerSession,
                Self::RewardMinutes,
                Self::DailyMaxMinutes,
            ]
        } else {
            &[Self::PassingPercentage, Self::QuestionsPerSession, Self::RewardMinutes]
        }
    }

    pub fn next(self, with_daily_cap: bool) -> Self {
        let fields = Self::visible(with_daily_cap);
        let idx = fields.iter().position(|&f| f == self).unwrap_or(0);
        fields[(idx + 1) % fields.len()]
    }

    pub fn prev(self, with_daily_cap: bool) -> Self {
        let fields = Self::visible(with_daily_cap);
        let idx = fields.iter().position(|&f| f == self).unwrap_or(0);
        if idx == 0 { fields[fields.len() - 1] } else { fields[idx - 1] }
    }
}

// ============================================================================
// Input Normalisation
// ============================================================================

pub fn clamp(field: SettingsField, value: i64) -> u32 {
    let bounds = field.bounds();
    let (lo, hi) = (i64::from(*bounds.start()), i64::from(*bounds.end()));
    // Both ends fit in u32 by construction.
    value.clamp(lo, hi) as u32
}

/// Normalise free text typed into a settings field: round to the nearest
/// integer and clamp. Text that is not a number lands on the lower bound.
pub fn parse_and_clamp(field: SettingsField, text: &str) -> u32 {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let rounded = v.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64;
            clamp(field, rounded)
        }
        Ok(v) if v == f64::INFINITY => *field.bounds().end(),
        _ => *field.bounds().start(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_bounds() {
        let s = Settings::default();
        for &field in SettingsField::visible(true) {
            assert!(field.bounds().contains(&s.get(field)));
        }
    }

    #[test]
    fn out_of_range_values_clamp_to_nearest_bound() {
        let mut s = Settings::default();
        s.set(SettingsField::PassingPercentage, 10);
        assert_eq!(s.passing_percentage(), 50);
        s.set(SettingsField::PassingPercentage, 150);
        assert_eq!(s.passing_percentage(), 100);
        s.set(SettingsField::QuestionsPerSession, -3);
        assert_eq!(s.questions_per_session(), 5);
        s.set(SettingsField::DailyMaxMinutes, 1_000);
        assert_eq!(s.daily_max_minutes(), 240);
    }

    #[test]
    fn clamping_in_range_values_is_idempotent() {
        for &field in SettingsField::visible(true) {
            for v in field.bounds() {
                let once = clamp(field, i64::from(v));
                assert_eq!(once, v);
                assert_eq!(clamp(field, i64::from(once)), once);
            }
        }
    }

    #[test]
    fn typed_text_is_rounded_then_clamped() {
        assert_eq!(parse_and_clamp(SettingsField::RewardMinutes, " 12.5 "), 13);
        assert_eq!(parse_and_clamp(SettingsField::RewardMinutes, "12.4"), 12);
        assert_eq!(parse_and_clamp(SettingsField::RewardMinutes, "90"), 60);
        assert_eq!(parse_and_clamp(SettingsField::QuestionsPerSession, "0"), 5);
        assert_eq!(parse_and_clamp(SettingsField::DailyMaxMinutes, "1e9"), 240);
    }

    #[test]
    fn non_numeric_text_lands_on_lower_bound() {
        assert_eq!(parse_and_clamp(SettingsField::PassingPercentage, "lots"), 50);
        assert_eq!(parse_and_clamp(SettingsField::RewardMinutes, ""), 1);
        assert_eq!(parse_and_clamp(SettingsField::RewardMinutes, "NaN"), 1);
    }

    #[test]
    fn step_stops_at_bounds() {
        let mut s = Settings::default();
        s.set(SettingsField::PassingPercentage, 100);
        s.step(SettingsField::PassingPercentage, 1);
        assert_eq!(s.passing_percentage(), 100);
        s.step(SettingsField::PassingPercentage, -1);
        assert_eq!(s.passing_percentage(), 99);
    }

    #[test]
    fn field_cycling_skips_daily_limit_without_ledger() {
        let f = SettingsField::RewardMinutes;
        assert_eq!(f.next(true), SettingsField::DailyMaxMinutes);
        assert_eq!(f.next(false), SettingsField::PassingPercentage);
        assert_eq!(SettingsField::PassingPercentage.prev(false), SettingsField::RewardMinutes);
        assert_eq!(SettingsField::PassingPercentage.prev(true), SettingsField::DailyMaxMinutes);
    }

    #[test]
    fn config_values_are_clamped_on_load() {
        let config = Config {
            passing_percentage: 20,
            questions_per_session: 99,
            ..Config::default()
        };
        let s = Settings::from_config(&config);
        assert_eq!(s.passing_percentage(), 50);
        assert_eq!(s.questions_per_session(), 30);
    }
}
