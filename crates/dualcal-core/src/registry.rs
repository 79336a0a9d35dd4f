use std::rc::Rc;

use crate::bucket::DayBucketMap;
use crate::clock::Clock;
use crate::widget::{CalendarMount, CalendarWidget, DayActions};

/// Finds the places calendars should be drawn.
pub trait MountDiscovery {
    fn discover(&mut self) -> Vec<Box<dyn CalendarMount>>;
}

/// Fixed set of mounts handed over on the first discovery.
pub struct StaticMounts {
    mounts: Vec<Box<dyn CalendarMount>>,
}

impl StaticMounts {
    pub fn new(mounts: Vec<Box<dyn CalendarMount>>) -> Self {
        Self { mounts }
    }
}

impl MountDiscovery for StaticMounts {
    fn discover(&mut self) -> Vec<Box<dyn CalendarMount>> {
        std::mem::take(&mut self.mounts)
    }
}

/// Owns every calendar on a page and keeps them fed from one bucket map.
pub struct CalendarRegistry {
    discovery: Box<dyn MountDiscovery>,
    clock: Rc<dyn Clock>,
    actions: Rc<dyn DayActions>,
    widgets: Vec<CalendarWidget>,
    discovered: bool,
}

impl CalendarRegistry {
    pub fn new(
        discovery: Box<dyn MountDiscovery>,
        clock: Rc<dyn Clock>,
        actions: Rc<dyn DayActions>,
    ) -> Self {
        Self {
            discovery,
            clock,
            actions,
            widgets: Vec::new(),
            discovered: false,
        }
    }

    /// Creates the widgets on the first call; afterwards pushes `tasks` into
    /// the existing ones. Widgets keep their navigation across calls.
    pub fn ensure_calendars(&mut self, tasks: DayBucketMap) -> &mut [CalendarWidget] {
        let tasks = Rc::new(tasks);

        if !self.discovered {
            self.discovered = true;
            let mounts = self.discovery.discover();
            tracing::debug!(mounts = mounts.len(), "mounting calendars");
            self.widgets = mounts
                .into_iter()
                .map(|mount| {
                    CalendarWidget::new(
                        mount,
                        Rc::clone(&tasks),
                        Rc::clone(&self.clock),
                        Rc::clone(&self.actions),
                    )
                })
                .collect();
            return &mut self.widgets;
        }

        tracing::debug!(widgets = self.widgets.len(), days = tasks.len(), "pushing task map");
        for widget in &mut self.widgets {
            widget.set_tasks(Rc::clone(&tasks));
        }
        &mut self.widgets
    }

    pub fn update(&mut self, tasks: DayBucketMap) -> &mut [CalendarWidget] {
        self.ensure_calendars(tasks)
    }

    pub fn widgets(&self) -> &[CalendarWidget] {
        &self.widgets
    }

    pub fn widget_mut(&mut self, id: &str) -> Option<&mut CalendarWidget> {
        self.widgets.iter_mut().find(|widget| widget.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::NaiveDate;

    use super::*;
    use crate::bucket::build_task_map;
    use crate::clock::FixedClock;
    use crate::grid::MonthView;
    use crate::jalali::JalaliDate;
    use crate::task::TaskDueRecord;
    use crate::widget::testing::{RecordingActions, RecordingMount};

    struct CountingDiscovery {
        calls: Rc<Cell<usize>>,
        views: Vec<Rc<RefCell<Vec<MonthView>>>>,
    }

    impl MountDiscovery for CountingDiscovery {
        fn discover(&mut self) -> Vec<Box<dyn CalendarMount>> {
            self.calls.set(self.calls.get() + 1);
            ["left", "right"]
                .iter()
                .map(|id| {
                    let (mount, views) = RecordingMount::new(id);
                    self.views.push(views);
                    Box::new(mount) as Box<dyn CalendarMount>
                })
                .collect()
        }
    }

    fn registry() -> (CalendarRegistry, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let discovery = CountingDiscovery {
            calls: Rc::clone(&calls),
            views: Vec::new(),
        };
        let clock = Rc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        ));
        let registry = CalendarRegistry::new(
            Box::new(discovery),
            clock,
            Rc::new(RecordingActions::default()),
        );
        (registry, calls)
    }

    #[test]
    fn first_call_mounts_one_widget_per_mount() {
        let (mut registry, calls) = registry();
        let widgets = registry.ensure_calendars(DayBucketMap::new());
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].id(), "left");
        assert_eq!(widgets[1].id(), "right");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn later_calls_update_without_recreating() {
        let (mut registry, calls) = registry();
        registry.ensure_calendars(DayBucketMap::new());
        registry.widget_mut("left").expect("left widget").prev();

        let map = build_task_map(&[TaskDueRecord::new("x", "2026-10-20", "pending")]);
        let widgets = registry.update(map);

        assert_eq!(calls.get(), 1);
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].current(), (1405, 6));
        assert_eq!(widgets[1].current(), (1405, 7));

        let right = widgets[1].view().expect("rendered");
        let cell = right.cell(&JalaliDate::new(1405, 7, 28)).expect("cell");
        assert!(cell.indicator.is_some());
    }

    #[test]
    fn empty_discovery_yields_no_widgets_and_is_not_retried() {
        let clock = Rc::new(FixedClock(
            NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"),
        ));
        let mut registry = CalendarRegistry::new(
            Box::new(StaticMounts::new(Vec::new())),
            clock,
            Rc::new(RecordingActions::default()),
        );
        assert!(registry.ensure_calendars(DayBucketMap::new()).is_empty());
        assert!(registry.ensure_calendars(DayBucketMap::new()).is_empty());
        assert!(registry.widgets().is_empty());
    }
}
