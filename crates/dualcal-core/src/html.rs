use std::fmt::Write as _;
use std::io::Write;

use crate::grid::{MonthView, WEEKDAY_INITIALS};
use crate::widget::CalendarMount;

/// Writes month views as an HTML fragment using the `dualcal-*` classes.
pub struct HtmlMount<W: Write> {
    id: String,
    writer: W,
}

impl<W: Write> HtmlMount<W> {
    pub fn new(id: impl Into<String>, writer: W) -> Self {
        Self {
            id: id.into(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CalendarMount for HtmlMount<W> {
    fn id(&self) -> &str {
        &self.id
    }

    fn draw(&mut self, view: &MonthView) {
        let html = render_month_html(&self.id, view);
        if let Err(error) = self.writer.write_all(html.as_bytes()) {
            tracing::error!(mount = %self.id, error = %error, "failed to write calendar html");
        }
    }
}

pub fn render_month_html(id: &str, view: &MonthView) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "<div class=\"dualcal\" data-calendar=\"{}\">", escape(id));
    let _ = writeln!(out, "  <div class=\"dualcal-title\">{}</div>", escape(&view.title));

    out.push_str("  <div class=\"dualcal-weekdays\">");
    for day in WEEKDAY_INITIALS {
        let _ = write!(out, "<span>{day}</span>");
    }
    out.push_str("</div>\n");

    out.push_str("  <div class=\"dualcal-grid\">\n");
    for cell in &view.cells {
        let _ = write!(
            out,
            "    <div class=\"{}\" data-key=\"{}\"><span class=\"dualcal-num\">{}</span>",
            cell.classes().join(" "),
            cell.key(),
            cell.label
        );
        if let Some(label) = cell.today_label() {
            let _ = write!(out, "<span class=\"dualcal-today\">{label}</span>");
        }
        if let Some(indicator) = &cell.indicator {
            let _ = write!(
                out,
                "<div class=\"{}\" title=\"{}\"></div>",
                indicator.class(),
                escape(&indicator.label)
            );
        }
        out.push_str("</div>\n");
    }
    out.push_str("  </div>\n</div>\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
