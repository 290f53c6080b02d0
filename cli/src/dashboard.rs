use std::{io, time::Duration};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, BorderType, Paragraph, Gauge, Padding},
};
use habitual_core::{CompletionRatio, DayKey, HabitTracker, MonthCalendar, StreakSummary};

const MONTHS_SHOWN: usize = 12;

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    done: Color,
    partial: Color,
    missed: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    done: Color::Green,
    partial: Color::Yellow,
    missed: Color::Red,
};

pub struct DashboardApp {
    pub months: Vec<MonthCalendar>,
    pub current_month_index: usize,
    pub summary: Option<StreakSummary>,
}

impl DashboardApp {
    pub fn new(months: Vec<MonthCalendar>, summary: Option<StreakSummary>) -> Self {
        let current_month_index = months.len().saturating_sub(1);
        Self {
            months,
            current_month_index,
            summary,
        }
    }

    pub fn next_month(&mut self) {
        if self.current_month_index + 1 < self.months.len() {
            self.current_month_index += 1;
        }
    }

    pub fn previous_month(&mut self) {
        if self.current_month_index > 0 {
            self.current_month_index -= 1;
        }
    }

    pub fn current_data(&self) -> Option<&MonthCalendar> {
        self.months.get(self.current_month_index)
    }
}

/// (year, month) pairs for the last `count` months, oldest first.
fn recent_months(today: DayKey, count: usize) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(count);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..count {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

pub fn run(tracker: &HabitTracker) -> Result<()> {
    // Data setup
    let months = recent_months(tracker.today(), MONTHS_SHOWN)
        .into_iter()
        .map(|(year, month)| tracker.month(year, month))
        .collect();
    let mut app = DashboardApp::new(months, tracker.summary().ok());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('h') => app.previous_month(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_month(),
                        _ => {}
                    }
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(frame: &mut Frame, app: &DashboardApp) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Chart + sidebar
            Constraint::Length(1), // Footer
        ])
        .split(size);

    if let Some(calendar) = app.current_data() {
        // --- Header ---
        let title = format!(" {} {} ", calendar.name(), calendar.year);
        let header_block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(THEME.muted));

        let header_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(20),
                Constraint::Min(1),
                Constraint::Length(30),
            ])
            .split(main_layout[0]);

        let app_title = Paragraph::new(Span::styled("HABITUAL", Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)))
            .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
        frame.render_widget(app_title, header_layout[0]);

        let last = app.months.len().saturating_sub(1);
        let nav_text = Line::from(vec![
            Span::styled(" < ", Style::default().fg(if app.current_month_index > 0 { THEME.text } else { THEME.muted })),
            Span::styled(title, Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
            Span::styled(" > ", Style::default().fg(if app.current_month_index < last { THEME.text } else { THEME.muted })),
        ]);
        let nav = Paragraph::new(nav_text).alignment(Alignment::Right).block(Block::default().padding(Padding::new(0, 0, 1, 0)));
        frame.render_widget(nav, header_layout[2]);

        frame.render_widget(header_block, main_layout[0]);

        // --- Main content ---
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(75),
                Constraint::Length(1),
                Constraint::Percentage(25),
            ])
            .split(main_layout[1]);

        draw_chart(frame, calendar, content_chunks[0]);
        draw_info_panel(frame, calendar, app.summary, content_chunks[2]);

        // --- Footer ---
        let help = Line::from(vec![
            Span::styled("NAV: ", Style::default().fg(THEME.muted)),
            Span::styled("←/→ ", Style::default().fg(THEME.text)),
            Span::raw("  "),
            Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
            Span::styled("q", Style::default().fg(THEME.text)),
        ]);
        let footer = Paragraph::new(help).alignment(Alignment::Center).style(Style::default().fg(THEME.muted));
        frame.render_widget(footer, main_layout[2]);
    } else {
        frame.render_widget(
            Paragraph::new("No data available").alignment(Alignment::Center),
            main_layout[1],
        );
    }
}

fn ratio_color(ratio: f64) -> Color {
    if ratio >= 1.0 {
        THEME.done
    } else if ratio > 0.0 {
        THEME.partial
    } else {
        THEME.missed
    }
}

fn draw_chart(frame: &mut Frame, calendar: &MonthCalendar, area: Rect) {
    let bar_items: Vec<Bar> = calendar
        .days
        .iter()
        .map(|day| {
            let (value, color) = match day.ratio {
                CompletionRatio::Ratio(r) => ((r * 100.0).round() as u64, ratio_color(r)),
                CompletionRatio::NoData => (0, THEME.muted),
            };
            Bar::default()
                .label(day.day.to_string())
                .value(value)
                .style(Style::default().fg(color))
                .text_value(String::new())
        })
        .collect();

    let chart_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(" Completion (% of habits per day) ");

    let chart = BarChart::default()
        .block(chart_block)
        .bar_width(2)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bar_items))
        .max(100);

    frame.render_widget(chart, area);
}

fn draw_info_panel(frame: &mut Frame, calendar: &MonthCalendar, summary: Option<StreakSummary>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Streaks
            Constraint::Min(1),     // Month gauge
        ])
        .split(area);

    // 1. Streak card
    let value = |v: Option<u32>| v.map(|v| format!("{}d", v)).unwrap_or_else(|| "?".to_string());
    let info_text = vec![
        Line::from(vec![Span::styled("Streaks", Style::default().add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Current:  ", Style::default().fg(THEME.muted)),
            Span::styled(value(summary.map(|s| s.current)), Style::default().fg(THEME.done).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Longest:  ", Style::default().fg(THEME.muted)),
            Span::styled(value(summary.map(|s| s.longest)), Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("All days: ", Style::default().fg(THEME.muted)),
            Span::styled(value(summary.map(|s| s.completed_days)), Style::default().fg(THEME.text)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Month:    ", Style::default().fg(THEME.muted)),
            Span::styled(format!("{}d done", calendar.completed_days()), Style::default().fg(THEME.text)),
        ]),
    ];

    let info_block = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)).title(" Summary "));
    frame.render_widget(info_block, chunks[0]);

    // 2. Month average
    let ratio = calendar.average().unwrap_or(0.0);
    let label = match calendar.average() {
        Some(avg) => format!("{:.0}% avg", avg * 100.0),
        None => "no data".to_string(),
    };
    let gauge = Gauge::default()
        .block(Block::default().title(" Month Average ").borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(THEME.muted)))
        .gauge_style(Style::default().fg(ratio_color(ratio)))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_months_wrap_year() {
        let today = DayKey::from_ymd(2024, 2, 15).unwrap();
        assert_eq!(
            recent_months(today, 4),
            vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
    }

    #[test]
    fn test_navigation_is_clamped() {
        let month = |m| MonthCalendar { year: 2024, month: m, days: vec![] };
        let mut app = DashboardApp::new(vec![month(1), month(2)], None);
        assert_eq!(app.current_month_index, 1);
        app.next_month();
        assert_eq!(app.current_month_index, 1);
        app.previous_month();
        app.previous_month();
        assert_eq!(app.current_month_index, 0);
        assert_eq!(app.current_data().map(|c| c.month), Some(1));
    }
}
