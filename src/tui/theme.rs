use ratatui::style::{Color, Modifier, Style};

use crate::tui::dashboard::Tone;

pub const BORDER: Color = Color::Rgb(55, 48, 36);
pub const TEXT: Color = Color::Rgb(230, 218, 196);
pub const TEXT_DIM: Color = Color::Rgb(130, 118, 96);
pub const GOLD: Color = Color::Rgb(196, 160, 68);
pub const GREEN: Color = Color::Rgb(92, 148, 92);
pub const AMBER: Color = Color::Rgb(210, 138, 60);

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn tone(tone: Tone) -> Style {
    let fg = match tone {
        Tone::Title => GOLD,
        Tone::Plain => TEXT,
        Tone::Dim => TEXT_DIM,
        Tone::Current => GREEN,
        Tone::Next | Tone::Accent => AMBER,
    };
    let style = Style::default().fg(fg);
    match tone {
        Tone::Title | Tone::Current | Tone::Next => style.add_modifier(Modifier::BOLD),
        _ => style,
    }
}
