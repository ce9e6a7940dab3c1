use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::config::AppConfig;
use crate::prayer_times::PrayerSchedule;
use crate::tui::dashboard::{dashboard, Row, Tone};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::utils::time::Clock;

const TICK_MS: u64 = 1000;

/// Raw mode plus alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Live countdown, redrawn every second until the user quits.
pub fn run(schedule: &PrayerSchedule, config: &AppConfig, clock: Clock) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;
    let mut events = EventHandler::new(TICK_MS);

    let mut rows = dashboard(schedule, config, clock.now());
    loop {
        terminal.draw(|frame| render(frame, &rows))?;
        match events.next()? {
            Event::Key(key) if key.kind == KeyEventKind::Press && is_quit(&key) => break,
            Event::Key(_) => {}
            Event::Tick => {
                let now = clock.now();
                log::debug!("Tick at {}", now);
                rows = dashboard(schedule, config, now);
            }
        }
    }

    events.cancel();
    Ok(())
}

fn render(frame: &mut Frame, rows: &[Row]) {
    let mut lines: Vec<Line> = rows
        .iter()
        .map(|row| Line::from(Span::styled(row.text.as_str(), theme::tone(row.tone))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  q للخروج", theme::dim())));

    let block = Block::default()
        .title(Span::styled(" minasati ", theme::tone(Tone::Title)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border());

    frame.render_widget(Paragraph::new(lines).block(block), frame.area());
}
