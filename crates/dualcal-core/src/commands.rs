use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use tracing::{debug, info, instrument};

use crate::bucket::{BucketedTask, build_task_map, summarize_tasks};
use crate::cli::{Command, Direction};
use crate::clock::Clock;
use crate::config::Config;
use crate::format::{
    format_jalali_date_time, format_jalali_label, jalali_date_to_iso, parse_iso_date, parse_jalali_date,
    relative_due_text,
};
use crate::html::HtmlMount;
use crate::jalali::{GregorianDate, JalaliDate};
use crate::registry::{CalendarRegistry, StaticMounts};
use crate::render::{TerminalMount, TextStyle};
use crate::task::{TaskDueRecord, load_tasks};
use crate::widget::{CalendarMount, CalendarWidget, DayActions, DayDetail};

const MOUNT_ID: &str = "main";

#[instrument(skip(cfg, clock, command, out))]
pub fn dispatch<W: Write>(cfg: &Config, clock: Rc<dyn Clock>, command: Command, out: &mut W) -> anyhow::Result<()> {
    debug!(?command, "dispatching command");

    match command {
        Command::Convert { date, to } => cmd_convert(&date, to, out),
        Command::Format { iso } => {
            writeln!(out, "{}", format_jalali_date_time(&iso))?;
            Ok(())
        }
        Command::Due { iso } => {
            let due = relative_due_text(&iso, clock.today());
            writeln!(out, "{}\t{}", due.status.as_str(), due.text)?;
            Ok(())
        }
        Command::Buckets { tasks } => {
            let tasks = resolve_tasks(cfg, tasks.as_deref())?;
            let map = build_task_map(&tasks);
            let json = serde_json::to_string_pretty(&map).context("failed to serialize bucket map")?;
            writeln!(out, "{json}")?;
            Ok(())
        }
        Command::Month { tasks, shift, html } => {
            let tasks = resolve_tasks(cfg, tasks.as_deref())?;
            cmd_month(cfg, clock, &tasks, shift, html, out)
        }
        Command::Day { date, tasks } => {
            let tasks = resolve_tasks(cfg, tasks.as_deref())?;
            cmd_day(cfg, clock, &tasks, &date, out)
        }
        Command::Today => {
            let today = clock.today();
            let jalali = JalaliDate::from(today);
            writeln!(
                out,
                "{}\t{}\t{}",
                GregorianDate::from(today).to_iso(),
                jalali.key(),
                format_jalali_label(jalali)
            )?;
            Ok(())
        }
    }
}

fn cmd_convert<W: Write>(date: &str, to: Direction, out: &mut W) -> anyhow::Result<()> {
    let converted = match to {
        Direction::Jalali => parse_iso_date(date)
            .map(|greg| greg.to_jalali().key())
            .ok_or_else(|| anyhow!("invalid Gregorian date: {date}"))?,
        Direction::Gregorian => parse_jalali_date(date)
            .and_then(|jalali| jalali.to_gregorian_checked())
            .map(|greg| greg.to_iso())
            .ok_or_else(|| anyhow!("invalid Jalali date: {date}"))?,
    };
    writeln!(out, "{converted}")?;
    Ok(())
}

fn cmd_month<W: Write>(
    cfg: &Config,
    clock: Rc<dyn Clock>,
    tasks: &[TaskDueRecord],
    shift: i32,
    html: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let screen = Screen::default();
    let mount: Box<dyn CalendarMount> = if html {
        Box::new(HtmlMount::new(MOUNT_ID, screen.clone()))
    } else {
        Box::new(TerminalMount::new(MOUNT_ID, screen.clone(), text_style(cfg)))
    };
    let mut registry = CalendarRegistry::new(
        Box::new(StaticMounts::new(vec![mount])),
        clock,
        Rc::new(PrintActions::default()),
    );

    registry.ensure_calendars(build_task_map(tasks));
    let widget = registry
        .widget_mut(MOUNT_ID)
        .ok_or_else(|| anyhow!("calendar was not mounted"))?;
    for _ in 0..shift.unsigned_abs() {
        if shift < 0 {
            widget.prev();
        } else {
            widget.next();
        }
    }
    let (year, month) = widget.current();
    info!(year, month, "rendering month");

    redraw(widget, &screen);
    out.write_all(&screen.take())?;

    if !html {
        let counts = summarize_tasks(tasks);
        writeln!(out, "overdue: {}  active: {}", counts.overdue, counts.active)?;
    }
    Ok(())
}

fn cmd_day<W: Write>(
    cfg: &Config,
    clock: Rc<dyn Clock>,
    tasks: &[TaskDueRecord],
    raw: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let date = parse_jalali_date(raw).ok_or_else(|| anyhow!("invalid Jalali date: {raw}"))?;
    let screen = Screen::default();
    let actions = Rc::new(PrintActions::default());
    let mut widget = CalendarWidget::new(
        Box::new(TerminalMount::new(MOUNT_ID, screen.clone(), text_style(cfg))),
        Rc::new(build_task_map(tasks)),
        clock,
        actions.clone(),
    );

    widget.show_month(date.year, date.month);
    redraw(&mut widget, &screen);
    out.write_all(&screen.take())?;

    match widget.click(date) {
        Some(click) => debug!(?click, day = %date, "day clicked"),
        None => writeln!(out, "{} is in the past and has no tasks", format_jalali_label(date))?,
    }
    out.write_all(actions.output.borrow().as_bytes())?;
    Ok(())
}

/// Keeps only the last frame of a widget on screen.
fn redraw(widget: &mut CalendarWidget, screen: &Screen) {
    screen.clear();
    widget.render();
}

fn text_style(cfg: &Config) -> TextStyle {
    TextStyle {
        color: cfg.color && io::stdout().is_terminal(),
        latin_digits: cfg.latin_digits,
    }
}

#[instrument(skip(cfg))]
fn resolve_tasks(cfg: &Config, explicit: Option<&Path>) -> anyhow::Result<Vec<TaskDueRecord>> {
    match explicit.or(cfg.tasks_file.as_deref()) {
        Some(path) => load_tasks(path),
        None => {
            debug!("no tasks file configured; using an empty task list");
            Ok(Vec::new())
        }
    }
}

/// In-memory output target shared between a mount and the command.
#[derive(Debug, Clone, Default)]
struct Screen(Rc<RefCell<Vec<u8>>>);

impl Screen {
    fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Write for Screen {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Day-click handlers for the terminal: print the day or the new-task prefill.
#[derive(Debug, Default)]
struct PrintActions {
    output: RefCell<String>,
}

impl DayActions for PrintActions {
    fn open_day(&self, date: JalaliDate, tasks: &[BucketedTask]) {
        let detail = DayDetail::new(date, tasks);
        let mut output = self.output.borrow_mut();
        output.push_str(&detail.heading);
        output.push('\n');
        for row in &detail.rows {
            let id = row.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
            output.push_str(&format!("{id}\t{}\t{}\t{}\n", row.title, row.due, row.status));
        }
    }

    fn create_task(&self, date: JalaliDate) {
        self.output.borrow_mut().push_str(&format!(
            "new task on {}\ndue_date={}\n",
            format_jalali_label(date),
            jalali_date_to_iso(date)
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> Rc<dyn Clock> {
        Rc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        ))
    }

    fn plain() -> Config {
        Config {
            color: false,
            ..Config::default()
        }
    }

    fn run(cfg: &Config, command: Command) -> anyhow::Result<String> {
        let mut out = Vec::new();
        dispatch(cfg, clock(), command, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn convert_both_directions() {
        let out = run(
            &plain(),
            Command::Convert {
                date: "2024-03-20".to_string(),
                to: Direction::Jalali,
            },
        )
        .expect("convert");
        assert_eq!(out, "1403-01-01\n");

        let out = run(
            &plain(),
            Command::Convert {
                date: "۱۴۰۳-۰۱-۰۱".to_string(),
                to: Direction::Gregorian,
            },
        )
        .expect("convert");
        assert_eq!(out, "2024-03-20\n");

        assert!(
            run(
                &plain(),
                Command::Convert {
                    date: "2024-02-30".to_string(),
                    to: Direction::Jalali,
                },
            )
            .is_err()
        );
    }

    #[test]
    fn due_and_today_use_the_clock() {
        let out = run(
            &plain(),
            Command::Due {
                iso: "2026-10-16".to_string(),
            },
        )
        .expect("due");
        assert_eq!(out, "overdue\t۲ روز پیش\n");

        let out = run(&plain(), Command::Today).expect("today");
        assert_eq!(out, "2026-10-18\t1405-07-26\t۲۶ مهر ۱۴۰۵\n");
    }

    #[test]
    fn month_prints_only_the_final_frame() {
        let out = run(
            &plain(),
            Command::Month {
                tasks: None,
                shift: -1,
                html: false,
            },
        )
        .expect("month");

        assert!(out.starts_with("شهریور ۱۴۰۵\n"));
        assert_eq!(out.matches("۱۴۰۵\n").count(), 1);
        assert!(out.ends_with("overdue: 0  active: 0\n"));
    }

    #[test]
    fn day_opens_tasks_from_a_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"id": 7, "title": "ship", "due_date": "2026-10-20", "status": "pending"}]"#,
        )
        .expect("write tasks");

        let out = run(
            &plain(),
            Command::Day {
                date: "1405-07-28".to_string(),
                tasks: Some(path),
            },
        )
        .expect("day");

        assert!(out.contains("تاریخ: ۲۸ مهر ۱۴۰۵\n"));
        assert!(out.contains("7\tship\tتاریخ سررسید: ۲۸ مهر ۱۴۰۵\tفعال\n"));
    }

    #[test]
    fn day_on_an_empty_future_day_prefills_a_task() {
        let out = run(
            &plain(),
            Command::Day {
                date: "1405-07-29".to_string(),
                tasks: None,
            },
        )
        .expect("day");
        assert!(out.ends_with("due_date=2026-10-21\n"));

        let out = run(
            &plain(),
            Command::Day {
                date: "1405-07-01".to_string(),
                tasks: None,
            },
        )
        .expect("day");
        assert!(out.ends_with("is in the past and has no tasks\n"));
    }

    #[test]
    fn missing_tasks_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = run(
            &plain(),
            Command::Buckets {
                tasks: Some(dir.path().join("absent.json")),
            },
        )
        .expect_err("missing file");
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
