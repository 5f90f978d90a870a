use rand::{SeedableRng, rngs::StdRng};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::countdown::Countdown;
use crate::ledger::RewardLedger;
use crate::quiz::{Progress, Session, score_percent};
use crate::settings::{Settings, SettingsField, parse_and_clamp};

// ============================================================================
// Screens & Actions
// ============================================================================

/// Which screen is active. Quiz progress only exists inside `Quiz` and the
/// running countdown only inside `Unlocked`, so leaving a screen drops its state.
#[derive(Debug)]
pub enum Screen {
    Home,
    ParentSettings(SettingsEditor),
    Quiz(Session),
    Unlocked(Countdown),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::ParentSettings(_) => "parent-settings",
            Self::Quiz(_) => "quiz",
            Self::Unlocked(_) => "unlocked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenSettings,
    Back,
    StartChallenge,
    ExitQuiz,
    Type(char),
    Erase,
    Submit,
    EndSession,
    EarnMore,
    Settings(SettingsAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    NextField,
    PrevField,
    Increase,
    Decrease,
    BeginEdit,
    Type(char),
    Erase,
    Commit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsEditor {
    pub field: SettingsField,
    pub editing: bool,
    pub input: String,
}

impl Default for SettingsEditor {
    fn default() -> Self {
        Self {
            field: SettingsField::PassingPercentage,
            editing: false,
            input: String::new(),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed { score: u32, credited: u32, play_minutes: u32 },
    CapReached { score: u32, cap: u32 },
    Failed { score: u32, required: u32 },
}

impl Verdict {
    pub fn score(self) -> u32 {
        match self {
            Self::Passed { score, .. } | Self::CapReached { score, .. } | Self::Failed { score, .. } => score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub tone: Tone,
    pub text: String,
}

impl Feedback {
    fn from_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Passed { score, credited, play_minutes } if credited < play_minutes => Self {
                tone: Tone::Success,
                text: format!(
                    "Great job! You scored {score}%. {credited} minutes were left under today's limit; enjoy {play_minutes} minutes of play."
                ),
            },
            Verdict::Passed { score, credited, .. } => Self {
                tone: Tone::Success,
                text: format!("Great job! You scored {score}% and earned {credited} minutes."),
            },
            Verdict::CapReached { score, cap } => Self {
                tone: Tone::Info,
                text: format!(
                    "You scored {score}%, but today's {cap}-minute limit is already used up. Come back tomorrow!"
                ),
            },
            Verdict::Failed { score, required } => Self {
                tone: Tone::Failure,
                text: format!("You scored {score}%. You need {required}% to pass. Try a new set!"),
            },
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    settings: Settings,
    ledger: Option<RewardLedger>,
    screen: Screen,
    feedback: Option<Feedback>,
    last_verdict: Option<Verdict>,
    rng: StdRng,
    pub show_help: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// The ledger starts empty on every launch, so the startup day check
    /// below only matters once earnings outlive a single run.
    pub fn with_rng(config: &Config, rng: StdRng) -> Self {
        let mut ledger = config.daily_cap_enabled.then(RewardLedger::default);
        if let Some(ledger) = ledger.as_mut() {
            if ledger.reset_if_new_day(chrono::Local::now()) {
                info!("new day, daily earnings reset");
            }
        }
        Self {
            settings: Settings::from_config(config),
            ledger,
            screen: Screen::Home,
            feedback: None,
            last_verdict: None,
            rng,
            show_help: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> Option<&RewardLedger> {
        self.ledger.as_ref()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    pub fn has_daily_cap(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn is_capped(&self) -> bool {
        let cap = self.settings.daily_max_minutes();
        self.ledger.as_ref().is_some_and(|l| l.is_capped(cap))
    }

    pub fn can_earn_more(&self) -> bool {
        matches!(self.screen, Screen::Unlocked(_)) && !self.is_capped()
    }

    /// Apply one user action. Returns `false`, leaving everything untouched,
    /// when the action has no meaning on the current screen.
    pub fn dispatch(&mut self, action: Action, now: Instant) -> bool {
        let screen = std::mem::replace(&mut self.screen, Screen::Home);
        let from = screen.name();
        let (next, handled) = self.transition(screen, action, now);
        if handled && next.name() != from {
            debug!(from, to = next.name(), ?action, "screen change");
        }
        self.screen = next;
        handled
    }

    fn transition(&mut self, screen: Screen, action: Action, now: Instant) -> (Screen, bool) {
        match (screen, action) {
            (Screen::Home, Action::OpenSettings) => {
                self.feedback = None;
                (Screen::ParentSettings(SettingsEditor::default()), true)
            }
            (Screen::ParentSettings(_), Action::Back) => {
                self.feedback = None;
                (Screen::Home, true)
            }
            (Screen::ParentSettings(editor), Action::Settings(edit)) => {
                (Screen::ParentSettings(self.edit_settings(editor, edit)), true)
            }
            (Screen::Home | Screen::ParentSettings(_), Action::StartChallenge) => {
                (self.begin_session(), true)
            }
            (Screen::Quiz(_), Action::ExitQuiz) => {
                info!("quiz abandoned");
                self.feedback = None;
                (Screen::Home, true)
            }
            (Screen::Quiz(mut session), Action::Type(c)) => {
                session.push_char(c);
                (Screen::Quiz(session), true)
            }
            (Screen::Quiz(mut session), Action::Erase) => {
                session.erase();
                (Screen::Quiz(session), true)
            }
            (Screen::Quiz(mut session), Action::Submit) => match session.submit() {
                None => (Screen::Quiz(session), false),
                Some(Progress::Next) => (Screen::Quiz(session), true),
                Some(Progress::Complete { correct, total }) => (self.settle(correct, total, now), true),
            },
            (Screen::Unlocked(mut countdown), Action::EndSession) => {
                countdown.cancel();
                self.feedback = None;
                (Screen::Home, true)
            }
            (Screen::Unlocked(mut countdown), Action::EarnMore) => {
                if self.is_capped() {
                    return (Screen::Unlocked(countdown), false);
                }
                countdown.cancel();
                (self.begin_session(), true)
            }
            (screen, _) => (screen, false),
        }
    }

    fn begin_session(&mut self) -> Screen {
        let count = self.settings.questions_per_session();
        info!(count, "starting quiz session");
        self.feedback = None;
        Screen::Quiz(Session::new(count, &mut self.rng))
    }

    fn settle(&mut self, correct: u32, total: u32, now: Instant) -> Screen {
        let score = score_percent(correct, total);
        let required = self.settings.passing_percentage();
        let reward = self.settings.reward_minutes();
        let cap = self.settings.daily_max_minutes();

        let (verdict, next) = if score < required {
            // The failed batch is thrown away, never replayed.
            let next = self.begin_session();
            (Verdict::Failed { score, required }, next)
        } else {
            match self.ledger.as_mut() {
                Some(ledger) if ledger.is_capped(cap) => (Verdict::CapReached { score, cap }, Screen::Home),
                Some(ledger) => {
                    let credited = ledger.add_earned_minutes(reward, cap, chrono::Local::now());
                    info!(credited, earned_today = ledger.earned_today(), cap, "minutes credited");
                    let verdict = Verdict::Passed { score, credited, play_minutes: reward };
                    (verdict, Screen::Unlocked(Countdown::start(reward, now)))
                }
                None => {
                    let verdict = Verdict::Passed { score, credited: reward, play_minutes: reward };
                    (verdict, Screen::Unlocked(Countdown::start(reward, now)))
                }
            }
        };

        info!(correct, total, ?verdict, "quiz finished");
        self.last_verdict = Some(verdict);
        self.feedback = Some(Feedback::from_verdict(verdict));
        next
    }

    fn edit_settings(&mut self, mut editor: SettingsEditor, action: SettingsAction) -> SettingsEditor {
        let with_cap = self.has_daily_cap();
        if editor.editing {
            match action {
                SettingsAction::Type(c) => editor.input.push(c),
                SettingsAction::Erase => {
                    editor.input.pop();
                }
                SettingsAction::Commit => {
                    let value = parse_and_clamp(editor.field, &editor.input);
                    self.apply_setting(editor.field, i64::from(value));
                    editor.editing = false;
                    editor.input.clear();
                }
                SettingsAction::Cancel => {
                    editor.editing = false;
                    editor.input.clear();
                }
                _ => {}
            }
            return editor;
        }

        match action {
            SettingsAction::NextField => editor.field = editor.field.next(with_cap),
            SettingsAction::PrevField => editor.field = editor.field.prev(with_cap),
            SettingsAction::Increase => self.step_setting(editor.field, 1),
            SettingsAction::Decrease => self.step_setting(editor.field, -1),
            SettingsAction::BeginEdit => {
                editor.input = self.settings.get(editor.field).to_string();
                editor.editing = true;
            }
            _ => {}
        }
        editor
    }

    fn step_setting(&mut self, field: SettingsField, delta: i64) {
        self.settings.step(field, delta);
        self.enforce_cap(field);
    }

    fn apply_setting(&mut self, field: SettingsField, value: i64) {
        self.settings.set(field, value);
        self.enforce_cap(field);
    }

    fn enforce_cap(&mut self, field: SettingsField) {
        if field == SettingsField::DailyMaxMinutes {
            let cap = self.settings.daily_max_minutes();
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.clamp_to(cap);
            }
        }
        debug!(?field, value = self.settings.get(field), "setting changed");
    }

    /// Advance the countdown. Returns `true` when play time just ran out.
    pub fn update(&mut self, now: Instant) -> bool {
        match &mut self.screen {
            Screen::Unlocked(countdown) => {
                let expired = countdown.poll(now);
                if expired {
                    info!("play time is up");
                }
                expired
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn app_with(config: Config) -> App {
        App::with_rng(&config, StdRng::seed_from_u64(42))
    }

    fn app() -> App {
        app_with(Config::default())
    }

    fn session(app: &App) -> &Session {
        match app.screen() {
            Screen::Quiz(session) => session,
            other => panic!("expected quiz, on {}", other.name()),
        }
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            assert!(app.dispatch(Action::Type(c), now));
        }
    }

    /// Answer the whole batch, getting the first `right` questions correct.
    fn play(app: &mut App, right: usize, now: Instant) {
        let total = session(app).total() as usize;
        for i in 0..total {
            let answer = session(app).current().unwrap().answer;
            let text = if i < right { answer.to_string() } else { "wrong".to_string() };
            type_text(app, &text, now);
            assert!(app.dispatch(Action::Submit, now));
        }
    }

    #[test]
    fn starts_on_home() {
        let app = app();
        assert!(matches!(app.screen(), Screen::Home));
        assert!(app.feedback().is_none());
    }

    #[test]
    fn each_launch_starts_with_an_empty_ledger() {
        let app = app();
        assert_eq!(app.ledger(), Some(&RewardLedger::default()));
        assert!(!app.is_capped());
    }

    #[test]
    fn quiz_only_actions_are_rejected_on_home() {
        let mut app = app();
        let now = Instant::now();
        assert!(!app.dispatch(Action::Submit, now));
        assert!(!app.dispatch(Action::Type('4'), now));
        assert!(!app.dispatch(Action::EarnMore, now));
        assert!(!app.dispatch(Action::EndSession, now));
        assert!(matches!(app.screen(), Screen::Home));
    }

    #[test]
    fn home_settings_and_back() {
        let mut app = app();
        let now = Instant::now();
        assert!(app.dispatch(Action::OpenSettings, now));
        assert!(matches!(app.screen(), Screen::ParentSettings(_)));
        assert!(app.dispatch(Action::Back, now));
        assert!(matches!(app.screen(), Screen::Home));
    }

    #[test]
    fn challenge_can_start_from_settings() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::OpenSettings, now);
        app.dispatch(Action::Settings(SettingsAction::NextField), now);
        app.dispatch(Action::Settings(SettingsAction::Increase), now);
        assert!(app.dispatch(Action::StartChallenge, now));
        assert_eq!(session(&app).total(), 11);
    }

    #[test]
    fn session_uses_configured_length() {
        let mut app = app_with(Config { questions_per_session: 7, ..Config::default() });
        app.dispatch(Action::StartChallenge, Instant::now());
        let s = session(&app);
        assert_eq!(s.questions().len(), 7);
        assert_eq!(s.index(), 0);
        assert_eq!(s.correct(), 0);
    }

    #[test]
    fn blank_answer_is_not_submitted() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        assert!(!app.dispatch(Action::Submit, now));
        assert_eq!(session(&app).index(), 0);
    }

    #[test]
    fn exit_abandons_quiz_without_credit() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        type_text(&mut app, "12", now);
        app.dispatch(Action::Submit, now);
        assert!(app.dispatch(Action::ExitQuiz, now));
        assert!(matches!(app.screen(), Screen::Home));
        assert_eq!(app.ledger().unwrap().earned_today(), 0);
    }

    #[test]
    fn exact_threshold_passes_and_unlocks() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 8, now);

        assert_eq!(app.last_verdict(), Some(Verdict::Passed { score: 80, credited: 10, play_minutes: 10 }));
        match app.screen() {
            Screen::Unlocked(c) => assert_eq!(c.seconds_remaining(), 600),
            other => panic!("expected unlocked, on {}", other.name()),
        }
        assert_eq!(app.ledger().unwrap().earned_today(), 10);
        let feedback = app.feedback().unwrap();
        assert_eq!(feedback.tone, Tone::Success);
        assert!(feedback.text.contains("80%"));
        assert!(feedback.text.contains("10 minutes"));
    }

    #[test]
    fn failing_regenerates_a_fresh_session() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        let first = session(&app).questions().to_vec();
        play(&mut app, 7, now);

        assert_eq!(app.last_verdict(), Some(Verdict::Failed { score: 70, required: 80 }));
        let s = session(&app);
        assert_eq!(s.questions().len(), 10);
        assert_eq!(s.index(), 0);
        assert_eq!(s.correct(), 0);
        assert!(s.input().is_empty());
        assert_ne!(s.questions(), first.as_slice());

        let feedback = app.feedback().unwrap();
        assert_eq!(feedback.tone, Tone::Failure);
        assert!(feedback.text.contains("70%") && feedback.text.contains("80%"));
        assert_eq!(app.ledger().unwrap().earned_today(), 0);
    }

    #[test]
    fn credit_clamps_to_daily_limit() {
        let mut app = app_with(Config {
            reward_minutes: 20,
            daily_max_minutes: 60,
            ..Config::default()
        });
        let now = Instant::now();
        for _ in 0..3 {
            app.dispatch(Action::StartChallenge, now);
            play(&mut app, 10, now);
            app.dispatch(Action::EndSession, now);
        }
        assert_eq!(app.ledger().unwrap().earned_today(), 60);
        assert!(app.is_capped());
    }

    #[test]
    fn partial_credit_reports_minutes_actually_earned() {
        let mut app = app_with(Config {
            reward_minutes: 20,
            daily_max_minutes: 50,
            ..Config::default()
        });
        let now = Instant::now();
        for _ in 0..2 {
            app.dispatch(Action::StartChallenge, now);
            play(&mut app, 10, now);
            app.dispatch(Action::EndSession, now);
        }
        assert_eq!(app.ledger().unwrap().earned_today(), 40);

        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert_eq!(
            app.last_verdict(),
            Some(Verdict::Passed { score: 100, credited: 10, play_minutes: 20 })
        );
        assert_eq!(app.ledger().unwrap().earned_today(), 50);
        match app.screen() {
            Screen::Unlocked(c) => assert_eq!(c.seconds_remaining(), 1_200),
            other => panic!("expected unlocked, on {}", other.name()),
        }
        let text = &app.feedback().unwrap().text;
        assert!(text.contains("10 minutes"), "{text}");
        assert!(text.contains("20 minutes"), "{text}");
        assert!(!text.contains("earned 20"), "{text}");
    }

    #[test]
    fn full_credit_message_names_the_reward() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert_eq!(
            app.last_verdict(),
            Some(Verdict::Passed { score: 100, credited: 10, play_minutes: 10 })
        );
        assert!(app.feedback().unwrap().text.contains("earned 10 minutes"));
    }

    #[test]
    fn passing_while_capped_is_its_own_outcome() {
        let mut app = app_with(Config {
            reward_minutes: 60,
            daily_max_minutes: 60,
            ..Config::default()
        });
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        app.dispatch(Action::EndSession, now);

        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert_eq!(app.last_verdict(), Some(Verdict::CapReached { score: 100, cap: 60 }));
        assert!(matches!(app.screen(), Screen::Home));
        assert_eq!(app.ledger().unwrap().earned_today(), 60);
        assert_eq!(app.feedback().unwrap().tone, Tone::Info);
    }

    #[test]
    fn earn_more_is_refused_at_the_cap() {
        let mut app = app_with(Config {
            reward_minutes: 60,
            daily_max_minutes: 60,
            ..Config::default()
        });
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert!(!app.can_earn_more());
        assert!(!app.dispatch(Action::EarnMore, now));
        assert!(matches!(app.screen(), Screen::Unlocked(_)));
    }

    #[test]
    fn earn_more_starts_a_new_quiz() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert!(app.can_earn_more());
        assert!(app.dispatch(Action::EarnMore, now));
        assert_eq!(session(&app).index(), 0);
        assert!(app.feedback().is_none());
    }

    #[test]
    fn without_ledger_passing_always_unlocks() {
        let mut app = app_with(Config {
            daily_cap_enabled: false,
            reward_minutes: 60,
            daily_max_minutes: 10,
            ..Config::default()
        });
        let now = Instant::now();
        for _ in 0..3 {
            app.dispatch(Action::StartChallenge, now);
            play(&mut app, 10, now);
            assert!(matches!(app.screen(), Screen::Unlocked(_)));
            assert!(app.can_earn_more());
            app.dispatch(Action::EndSession, now);
        }
        assert!(app.ledger().is_none());
    }

    #[test]
    fn countdown_runs_only_while_unlocked() {
        let mut app = app();
        let t0 = Instant::now();
        assert!(!app.update(t0 + Duration::from_secs(5)));

        app.dispatch(Action::StartChallenge, t0);
        play(&mut app, 10, t0);
        assert!(!app.update(t0 + Duration::from_secs(599)));
        assert!(app.update(t0 + Duration::from_secs(600)));
        match app.screen() {
            Screen::Unlocked(c) => {
                assert_eq!(c.seconds_remaining(), 0);
                assert!(!c.is_running());
            }
            other => panic!("expected unlocked, on {}", other.name()),
        }
        assert!(!app.update(t0 + Duration::from_secs(700)));
    }

    #[test]
    fn ending_session_returns_home() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        assert!(app.dispatch(Action::EndSession, now));
        assert!(matches!(app.screen(), Screen::Home));
        assert!(!app.update(now + Duration::from_secs(10)));
    }

    #[test]
    fn typed_setting_is_clamped_on_commit() {
        let mut app = app();
        let now = Instant::now();
        app.dispatch(Action::OpenSettings, now);
        app.dispatch(Action::Settings(SettingsAction::BeginEdit), now);
        for _ in 0..3 {
            app.dispatch(Action::Settings(SettingsAction::Erase), now);
        }
        for c in "35".chars() {
            app.dispatch(Action::Settings(SettingsAction::Type(c)), now);
        }
        app.dispatch(Action::Settings(SettingsAction::Commit), now);
        assert_eq!(app.settings().passing_percentage(), 50);

        app.dispatch(Action::Settings(SettingsAction::BeginEdit), now);
        app.dispatch(Action::Settings(SettingsAction::Type('x')), now);
        app.dispatch(Action::Settings(SettingsAction::Cancel), now);
        assert_eq!(app.settings().passing_percentage(), 50);
    }

    #[test]
    fn lowering_daily_limit_clamps_earned_minutes() {
        let mut app = app_with(Config { reward_minutes: 40, daily_max_minutes: 60, ..Config::default() });
        let now = Instant::now();
        app.dispatch(Action::StartChallenge, now);
        play(&mut app, 10, now);
        app.dispatch(Action::EndSession, now);
        assert_eq!(app.ledger().unwrap().earned_today(), 40);

        app.dispatch(Action::OpenSettings, now);
        app.dispatch(Action::Settings(SettingsAction::PrevField), now);
        if let Screen::ParentSettings(editor) = app.screen() {
            assert_eq!(editor.field, SettingsField::DailyMaxMinutes);
        }
        for _ in 0..30 {
            app.dispatch(Action::Settings(SettingsAction::Decrease), now);
        }
        assert_eq!(app.settings().daily_max_minutes(), 30);
        assert_eq!(app.ledger().unwrap().earned_today(), 30);
        assert!(app.is_capped());
    }
}
