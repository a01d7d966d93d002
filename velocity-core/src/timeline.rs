//! Timeline Bucketer: weekly Gantt layout for open tasks and freed capacity.
//!
//! All coordinates are in grid units: x in weeks from the window start, y in
//! rows. Pixel geometry is left to whoever renders the layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::minutes_to_hours;
use crate::task::Task;
use crate::time::{add_days, days_between};
use crate::token::CapacityEvent;

pub const DEFAULT_MIN_WEEKS: u32 = 5;

/// Visual state of a bar, derived from slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlackState {
    /// slack <= 0 weeks
    Critical,
    /// 0 < slack <= 1 week
    NearCritical,
    OnTrack,
}

impl SlackState {
    pub fn classify(slack_days: f64) -> Self {
        let slack_weeks = slack_days / 7.0;
        if slack_weeks <= 0.0 {
            SlackState::Critical
        } else if slack_weeks <= 1.0 {
            SlackState::NearCritical
        } else {
            SlackState::OnTrack
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlackState::Critical => "Critical",
            SlackState::NearCritical => "Near",
            SlackState::OnTrack => "On-track",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttRow {
    pub task_id: String,
    pub name: String,
    pub project: String,
    pub row_index: usize,
    pub start_week: u32,
    pub span_weeks: u32,
    pub state: SlackState,
    pub allocated_hours: f64,
    pub capability: bool,
}

impl GanttRow {
    pub fn end_week(&self) -> u32 {
        self.start_week + self.span_weeks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

/// Predecessor -> successor connector, drawn as an elbow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    /// Right edge of the predecessor bar, vertically centred.
    pub exit: GridPoint,
    /// Left edge of the successor bar, vertically centred.
    pub entry: GridPoint,
    pub mid_x: f64,
}

impl DependencyEdge {
    /// Elbow path in grid units (horizontal, vertical, horizontal).
    pub fn path(&self) -> String {
        format!(
            "M {} {} H {} V {} H {}",
            self.exit.x, self.exit.y, self.mid_x, self.entry.y, self.entry.x
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttLayout {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub total_weeks: u32,
    pub rows: Vec<GanttRow>,
    /// Freed hours per week, indexed by week number.
    pub weekly_capacity: Vec<f64>,
    pub edges: Vec<DependencyEdge>,
}

/// Lay out open tasks and capacity events on a shared weekly grid.
///
/// `today` anchors the window when there are no open tasks.
pub fn layout(
    tasks: &[Task],
    capacity: &[CapacityEvent],
    today: NaiveDate,
    min_weeks: u32,
) -> GanttLayout {
    let open: Vec<&Task> = tasks.iter().filter(|t| t.is_open()).collect();

    let min_start = open.iter().map(|t| t.start).min().unwrap_or(today);
    let max_due = open.iter().map(|t| t.due).max().unwrap_or(today);
    let window_start = add_days(min_start, -1);
    let window_end = add_days(max_due, 1);

    let span_days = days_between(window_start, window_end);
    let total_weeks = min_weeks.max(ceil_weeks(span_days));

    let rows: Vec<GanttRow> = open
        .iter()
        .enumerate()
        .map(|(idx, t)| GanttRow {
            task_id: t.id.clone(),
            name: t.name.clone(),
            project: t.project.clone(),
            row_index: idx,
            start_week: (days_between(window_start, t.start) / 7) as u32,
            span_weeks: ceil_weeks(days_between(t.start, t.due)).max(1),
            state: SlackState::classify(t.slack_days),
            allocated_hours: minutes_to_hours(t.allocated_minutes),
            capability: t.capability,
        })
        .collect();

    let mut weekly_capacity = vec![0.0; total_weeks as usize];
    for ev in capacity {
        let week = (ev.day_offset / 7) as usize;
        let Some(slot) = weekly_capacity.get_mut(week) else {
            continue;
        };
        *slot += ev.hours;
    }
    for h in &mut weekly_capacity {
        *h = (*h * 10.0).round() / 10.0;
    }

    let edges = dependency_edges(&rows, &open);

    GanttLayout {
        window_start,
        window_end,
        total_weeks,
        rows,
        weekly_capacity,
        edges,
    }
}

fn ceil_weeks(days: i64) -> u32 {
    ((days.max(0) + 6) / 7) as u32
}

fn dependency_edges(rows: &[GanttRow], open: &[&Task]) -> Vec<DependencyEdge> {
    let by_id: HashMap<&str, &GanttRow> = rows.iter().map(|r| (r.task_id.as_str(), r)).collect();

    let mut edges = Vec::new();
    for (row, task) in rows.iter().zip(open) {
        for pred_id in &task.depends_on {
            // closed or unknown predecessors have no bar to anchor to
            let Some(pred) = by_id.get(pred_id.as_str()) else {
                continue;
            };
            let exit = GridPoint {
                x: pred.end_week() as f64,
                y: pred.row_index as f64 + 0.5,
            };
            let entry = GridPoint {
                x: row.start_week as f64,
                y: row.row_index as f64 + 0.5,
            };
            edges.push(DependencyEdge {
                from: pred.task_id.clone(),
                to: row.task_id.clone(),
                exit,
                entry,
                mid_x: exit.x + (entry.x - exit.x) * 0.5,
            });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ev(day_offset: u32, hours: f64) -> CapacityEvent {
        CapacityEvent {
            day_offset,
            label: format!("ev-{day_offset}"),
            hours,
            project: None,
        }
    }

    #[test]
    fn slack_classification_boundaries() {
        assert_eq!(SlackState::classify(-2.0), SlackState::Critical);
        assert_eq!(SlackState::classify(0.0), SlackState::Critical);
        assert_eq!(SlackState::classify(0.5), SlackState::NearCritical);
        assert_eq!(SlackState::classify(7.0), SlackState::NearCritical);
        assert_eq!(SlackState::classify(7.01), SlackState::OnTrack);
    }

    #[test]
    fn window_pads_one_day_each_side() {
        let tasks = vec![
            Task::new("a", "A", d(2026, 3, 2), d(2026, 3, 9)),
            Task::new("b", "B", d(2026, 3, 5), d(2026, 3, 20)),
        ];
        let g = layout(&tasks, &[], d(2026, 3, 1), DEFAULT_MIN_WEEKS);
        assert_eq!(g.window_start, d(2026, 3, 1));
        assert_eq!(g.window_end, d(2026, 3, 21));
        assert_eq!(g.total_weeks, DEFAULT_MIN_WEEKS);
        assert_eq!(g.weekly_capacity.len(), DEFAULT_MIN_WEEKS as usize);
    }

    #[test]
    fn long_span_exceeds_minimum_weeks() {
        let tasks = vec![Task::new("a", "A", d(2026, 1, 1), d(2026, 3, 1))];
        let g = layout(&tasks, &[], d(2026, 1, 1), DEFAULT_MIN_WEEKS);
        // 59 days + 2 padding = 61 days -> 9 weeks
        assert_eq!(g.total_weeks, 9);
        assert_eq!(g.rows[0].span_weeks, 9);
    }

    #[test]
    fn rows_place_start_week_and_span() {
        let tasks = vec![
            Task::new("a", "A", d(2026, 3, 2), d(2026, 3, 4)),
            Task::new("b", "B", d(2026, 3, 10), d(2026, 3, 24)),
        ];
        let g = layout(&tasks, &[], d(2026, 3, 1), DEFAULT_MIN_WEEKS);
        let a = &g.rows[0];
        assert_eq!((a.start_week, a.span_weeks), (0, 1));
        let b = &g.rows[1];
        // window starts 2026-03-01, b starts 9 days later -> week 1; 14 days -> 2 weeks
        assert_eq!((b.start_week, b.span_weeks), (1, 2));
        assert_eq!(b.row_index, 1);
    }

    #[test]
    fn closed_tasks_are_not_laid_out() {
        let mut closed = Task::new("c", "C", d(2026, 1, 1), d(2026, 6, 1));
        closed.status = TaskStatus::Closed;
        let tasks = vec![closed, Task::new("a", "A", d(2026, 3, 2), d(2026, 3, 9))];
        let g = layout(&tasks, &[], d(2026, 3, 1), DEFAULT_MIN_WEEKS);
        assert_eq!(g.rows.len(), 1);
        assert_eq!(g.window_start, d(2026, 3, 1));
    }

    #[test]
    fn empty_plan_falls_back_to_minimum_window() {
        let today = d(2026, 3, 10);
        let g = layout(&[], &[ev(3, 2.0)], today, DEFAULT_MIN_WEEKS);
        assert!(g.rows.is_empty());
        assert_eq!(g.window_start, d(2026, 3, 9));
        assert_eq!(g.window_end, d(2026, 3, 11));
        assert_eq!(g.total_weeks, DEFAULT_MIN_WEEKS);
        assert_eq!(g.weekly_capacity[0], 2.0);
    }

    #[test]
    fn capacity_buckets_by_week_and_drops_outside_window() {
        let events = vec![ev(0, 1.5), ev(6, 2.0), ev(7, 4.0), ev(34, 1.0), ev(35, 9.0)];
        let g = layout(&[], &events, d(2026, 3, 10), 5);
        assert_eq!(g.weekly_capacity, vec![3.5, 4.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn dependency_edges_run_predecessor_to_successor() {
        let tasks = vec![
            Task::new("a", "A", d(2026, 3, 2), d(2026, 3, 9)),
            Task::new("b", "B", d(2026, 3, 16), d(2026, 3, 23)).depends_on(["a"]),
        ];
        let g = layout(&tasks, &[], d(2026, 3, 1), DEFAULT_MIN_WEEKS);
        assert_eq!(g.edges.len(), 1);
        let e = &g.edges[0];
        assert_eq!((e.from.as_str(), e.to.as_str()), ("a", "b"));
        assert_eq!(e.exit, GridPoint { x: 1.0, y: 0.5 });
        assert_eq!(e.entry, GridPoint { x: 2.0, y: 1.5 });
        assert_eq!(e.mid_x, 1.5);
        assert_eq!(e.path(), "M 1 0.5 H 1.5 V 1.5 H 2");
    }

    #[test]
    fn edges_to_closed_predecessors_are_skipped() {
        let mut a = Task::new("a", "A", d(2026, 3, 2), d(2026, 3, 9));
        a.status = TaskStatus::Closed;
        let tasks = vec![a, Task::new("b", "B", d(2026, 3, 16), d(2026, 3, 23)).depends_on(["a"])];
        let g = layout(&tasks, &[], d(2026, 3, 1), DEFAULT_MIN_WEEKS);
        assert!(g.edges.is_empty());
    }
}
