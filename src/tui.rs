use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::fmt::money;
use crate::session::PanelState;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
pub const ERROR_STYLE: Style = Style::new().fg(Color::Red);
pub const STATUS_STYLE: Style = Style::new().fg(Color::Yellow);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Format an amount as a colored Span (green for inflows, red for outflows).
/// Shows absolute value; color conveys the sign.
pub fn money_span(amount: f64) -> Span<'static> {
    let style = if amount < 0.0 {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount.abs()), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// Heatmap cell color: dark for no spending, up to saturated red at the maximum.
pub fn heat_color(intensity: f64) -> Color {
    let t = intensity.clamp(0.0, 1.0);
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    Color::Rgb(lerp(30.0, 220.0), lerp(30.0, 50.0), lerp(40.0, 50.0))
}

/// Text for one advisory panel. Completions are shown exactly as returned.
pub fn panel_text<'a>(state: &'a PanelState, placeholder: &'a str) -> Text<'a> {
    match state {
        PanelState::NotRequested => Text::from(Span::styled(placeholder, FOOTER_STYLE)),
        PanelState::Ready(text) => Text::raw(text.as_str()),
        PanelState::Failed(reason) => Text::from(vec![
            Line::from(Span::styled(format!("Could not get advice: {reason}"), ERROR_STYLE)),
            Line::from(Span::styled("Press r to try again.", FOOTER_STYLE)),
        ]),
    }
}
