use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::bucket::IndicatorState;
use crate::grid::{CellKind, DayCell, MonthView, WEEKDAY_INITIALS};
use crate::jalali::to_latin_digits;
use crate::widget::CalendarMount;

const INDICATOR_MARK: &str = "•";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextStyle {
    pub color: bool,
    pub latin_digits: bool,
}

/// Draws month views as a text grid on any writer.
pub struct TerminalMount<W: Write> {
    id: String,
    writer: W,
    style: TextStyle,
}

impl<W: Write> TerminalMount<W> {
    pub fn new(id: impl Into<String>, writer: W, style: TextStyle) -> Self {
        Self {
            id: id.into(),
            writer,
            style,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CalendarMount for TerminalMount<W> {
    fn id(&self) -> &str {
        &self.id
    }

    fn draw(&mut self, view: &MonthView) {
        let text = render_month_text(view, self.style);
        let result = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(error) = result {
            tracing::error!(mount = %self.id, error = %error, "failed to draw calendar");
        }
    }
}

pub fn render_month_text(view: &MonthView, style: TextStyle) -> String {
    let digits = |text: &str| {
        if style.latin_digits {
            to_latin_digits(text)
        } else {
            text.to_string()
        }
    };

    let cells: Vec<(String, &DayCell)> = view
        .cells
        .iter()
        .map(|cell| (cell_text(cell, &digits(&cell.label)), cell))
        .collect();

    let width = cells
        .iter()
        .map(|(text, _)| UnicodeWidthStr::width(text.as_str()))
        .chain(WEEKDAY_INITIALS.iter().map(|day| UnicodeWidthStr::width(*day)))
        .max()
        .unwrap_or(2)
        .max(2);

    let mut out = String::new();
    out.push_str(&digits(&view.title));
    out.push('\n');

    let header = WEEKDAY_INITIALS
        .iter()
        .map(|day| pad(day, width))
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(header.trim_end());
    out.push('\n');

    for week in cells.chunks(7) {
        let line = week
            .iter()
            .map(|(text, cell)| paint(&pad(text, width), cell_color(cell), style.color))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn cell_text(cell: &DayCell, label: &str) -> String {
    let mark = if cell.indicator.is_some() {
        INDICATOR_MARK
    } else {
        ""
    };
    if cell.today {
        format!("[{label}]{mark}")
    } else {
        format!("{label}{mark}")
    }
}

fn cell_color(cell: &DayCell) -> Option<&'static str> {
    match cell.indicator.as_ref().map(|indicator| indicator.state) {
        Some(IndicatorState::Overdue) => Some("31"),
        Some(IndicatorState::Active) => Some("33"),
        Some(IndicatorState::Done) => Some("32"),
        None if cell.kind == CellKind::Other || cell.past => Some("2"),
        None => None,
    }
}

fn pad(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    format!("{}{}", " ".repeat(width.saturating_sub(visible)), text)
}

fn paint(text: &str, code: Option<&str>, color: bool) -> String {
    match code {
        Some(code) if color => format!("\x1b[{code}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}
