use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Screen, SettingsEditor, Tone};
use crate::countdown::{Countdown, format_clock};
use crate::quiz::Session;
use crate::settings::SettingsField;

// ============================================================================
// Themes
// ============================================================================

pub const THEMES: &[&str] = &["default", "nord", "dracula", "gruvbox", "solarized"];

#[derive(Clone, Copy)]
pub struct Theme {
    pub quiz_color: Color,
    pub unlocked_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
}

/// The entry of [`THEMES`] matching `name`, if any.
pub fn known_theme(name: &str) -> Option<&'static str> {
    THEMES.iter().copied().find(|&t| t == name)
}

pub fn get_theme(name: &str) -> Theme {
    match name {
        "nord" => Theme {
            quiz_color: Color::Rgb(136, 192, 208),
            unlocked_color: Color::Rgb(163, 190, 140),
            border_color: Color::Rgb(94, 129, 172),
            accent_color: Color::Rgb(235, 203, 139),
        },
        "dracula" => Theme {
            quiz_color: Color::Rgb(189, 147, 249),
            unlocked_color: Color::Rgb(80, 250, 123),
            border_color: Color::Rgb(98, 114, 164),
            accent_color: Color::Rgb(255, 121, 198),
        },
        "gruvbox" => Theme {
            quiz_color: Color::Rgb(254, 128, 25),
            unlocked_color: Color::Rgb(184, 187, 38),
            border_color: Color::Rgb(213, 196, 161),
            accent_color: Color::Rgb(250, 189, 47),
        },
        "solarized" => Theme {
            quiz_color: Color::Rgb(38, 139, 210),
            unlocked_color: Color::Rgb(133, 153, 0),
            border_color: Color::Rgb(88, 110, 117),
            accent_color: Color::Rgb(181, 137, 0),
        },
        _ => Theme {
            quiz_color: Color::Rgb(100, 181, 246),
            unlocked_color: Color::Rgb(0, 230, 118),
            border_color: Color::Rgb(0, 200, 255),
            accent_color: Color::Rgb(255, 171, 64),
        },
    }
}

// ============================================================================
// Screens
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    render_header(f, chunks[0], app, theme);

    match app.screen() {
        Screen::Home => render_home(f, chunks[1], app, theme),
        Screen::ParentSettings(editor) => render_settings(f, chunks[1], app, editor, theme),
        Screen::Quiz(session) => render_quiz(f, chunks[1], app, session, theme),
        Screen::Unlocked(countdown) => render_unlocked(f, chunks[1], app, countdown, theme),
    }

    render_controls(f, chunks[2], app, theme);

    if app.show_help {
        render_help(f, theme);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let today = match app.ledger() {
        Some(ledger) => format!(
            " Today: {} / {} min ",
            ledger.earned_today(),
            app.settings().daily_max_minutes()
        ),
        None => String::new(),
    };
    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_color))
        .title(Span::styled(
            " 🧮 SCREEN TIME QUIZ ",
            Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD),
        ))
        .title(
            block::Title::from(Span::styled(today, Style::default().fg(Color::Gray)))
                .alignment(Alignment::Right),
        );
    f.render_widget(header, area);
}

fn feedback_line(app: &App) -> Line<'_> {
    match app.feedback() {
        Some(feedback) => {
            let color = match feedback.tone {
                Tone::Success => Color::Green,
                Tone::Failure => Color::Red,
                Tone::Info => Color::Yellow,
            };
            Line::from(Span::styled(
                feedback.text.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(""),
    }
}

fn render_home(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let s = app.settings();
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Earn play time by acing the times tables!",
            Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Answer {} questions and score at least {}% to unlock {} minutes.",
            s.questions_per_session(),
            s.passing_percentage(),
            s.reward_minutes()
        )),
        Line::from(""),
    ];

    if let Some(ledger) = app.ledger() {
        lines.push(stat_line("Earned today", format!("{} min", ledger.earned_today())));
        lines.push(stat_line("Left today", format!("{} min", ledger.headroom(s.daily_max_minutes()))));
        lines.push(Line::from(""));
    }

    if let Some(verdict) = app.last_verdict() {
        lines.push(stat_line("Last quiz", format!("{}%", verdict.score())));
        lines.push(Line::from(""));
    }

    lines.push(feedback_line(app));

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_settings(f: &mut Frame, area: Rect, app: &App, editor: &SettingsEditor, theme: &Theme) {
    let area = centered_rect(70, 90, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⚙️  PARENT SETTINGS",
            Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑↓/jk: Navigate  •  ←→/hl: Adjust  •  Enter: Type a value",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    for &field in SettingsField::visible(app.has_daily_cap()) {
        let selected = editor.field == field;
        let bounds = field.bounds();
        let value = format!("{}{}", app.settings().get(field), field.unit());
        let range = format!("  ({}–{})", bounds.start(), bounds.end());

        lines.push(Line::from(""));

        if selected && editor.editing {
            lines.push(Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(field.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(editor.input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
        } else {
            let (prefix, label_style, value_style) = if selected {
                (
                    "  > ",
                    Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )
            } else {
                ("    ", Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
            };
            lines.push(Line::from(vec![Span::styled(prefix, label_style), Span::styled(field.label(), label_style)]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(value, value_style),
                Span::styled(range, Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Settings ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border_color)),
        ),
        area,
    );
}

fn render_quiz(f: &mut Frame, area: Rect, app: &App, session: &Session, theme: &Theme) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let (position, total) = session.progress();
    let live = session
        .live_percent()
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "--%".into());
    let status = format!(
        "Question {position} of {total}  •  Score {live}  •  Need {}%",
        app.settings().passing_percentage()
    );
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        sections[1],
    );

    let prompt = session.current().map(|q| q.prompt()).unwrap_or_default();
    f.render_widget(
        Paragraph::new(prompt)
            .style(Style::default().fg(theme.quiz_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    let input_area = centered_rect(30, 100, sections[5]);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(session.input(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("█", Style::default().fg(theme.quiz_color)),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(" Your answer ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border_color)),
        ),
        input_area,
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(theme.quiz_color).bg(Color::Black))
            .label(format!("{position}/{total}"))
            .ratio((f64::from(position) / f64::from(total.max(1))).clamp(0.0, 1.0)),
        sections[7],
    );

    f.render_widget(
        Paragraph::new(feedback_line(app)).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        sections[9],
    );
}

fn render_unlocked(f: &mut Frame, area: Rect, app: &App, countdown: &Countdown, theme: &Theme) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let running = countdown.is_running();
    let title = if running { "🎮 PLAY TIME UNLOCKED" } else { "⏰ TIME'S UP" };
    f.render_widget(
        Paragraph::new(title)
            .style(Style::default().fg(theme.unlocked_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    f.render_widget(
        Paragraph::new(format_clock(countdown.seconds_remaining()))
            .style(Style::default().fg(theme.unlocked_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3],
    );

    f.render_widget(Paragraph::new(feedback_line(app)).alignment(Alignment::Center), sections[5]);

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(theme.unlocked_color).bg(Color::Black))
            .percent((countdown.progress_ratio() * 100.0) as u16),
        sections[7],
    );

    if app.is_capped() {
        f.render_widget(
            Paragraph::new("Daily limit reached. No more minutes can be earned today.")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center),
            sections[9],
        );
    }
}

fn render_controls(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let mut spans = Vec::new();
    let mut push = |key: &'static str, desc: &'static str, enabled: bool| {
        if !spans.is_empty() {
            spans.push(Span::raw("  •  "));
        }
        if enabled {
            spans.push(span_key(key, theme));
            spans.push(Span::raw(format!(" {desc}")));
        } else {
            let off = Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            spans.push(Span::styled(format!("{key} {desc}"), off));
        }
    };

    match app.screen() {
        Screen::Home => {
            push("Enter", "Start challenge", true);
            push("P", "Parent settings", true);
            push("?", "Help", true);
            push("Q", "Quit", true);
        }
        Screen::ParentSettings(editor) if editor.editing => {
            push("Enter", "Save", true);
            push("Esc", "Cancel", true);
        }
        Screen::ParentSettings(_) => {
            push("S", "Start challenge", true);
            push("Esc", "Back", true);
        }
        Screen::Quiz(session) => {
            push("Enter", "Submit", session.can_submit());
            push("Esc", "Exit", true);
        }
        Screen::Unlocked(_) => {
            push("E", "Earn more", app.can_earn_more());
            push("X", "End session", true);
        }
    }

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn span_key<'a>(text: &'a str, theme: &Theme) -> Span<'a> {
    Span::styled(text, Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⌨️  KEYBOARD SHORTCUTS",
            Style::default().fg(theme.accent_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Home:"),
        help_line("Enter / S", "Start a challenge"),
        help_line("P", "Open parent settings"),
        help_line("Q / Esc", "Quit"),
        Line::from(""),
        Line::from("  Parent Settings:"),
        help_line("↑↓ / JK", "Choose a setting"),
        help_line("←→ / HL", "Adjust by one"),
        help_line("Enter / E", "Type a value"),
        help_line("S", "Start a challenge"),
        help_line("Esc / B", "Back home"),
        Line::from(""),
        Line::from("  Quiz:"),
        help_line("0-9", "Type your answer"),
        help_line("Enter", "Submit answer"),
        help_line("Esc", "Give up and go home"),
        Line::from(""),
        Line::from("  Play Time:"),
        help_line("E / Enter", "Earn more minutes"),
        help_line("X / Esc", "End session"),
        Line::from(""),
        help_line("Ctrl+C", "Force quit"),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(help_text).alignment(Alignment::Left).block(
            Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border_color)),
        ),
        area,
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{}: ", label)),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ])
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
