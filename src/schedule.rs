use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// Upper bound on simulated calendar days (five years).
pub const SIMULATION_CEILING_DAYS: u32 = 365 * 5;

/// Days added to the start date when neither a theoretical end nor a deadline exists.
pub const DEFAULT_SPAN_DAYS: i64 = 30;

/// Inclusive pause interval. Only effective when both bounds are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl PauseWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// An inverted window (end before start) never contains any day.
    pub fn contains(&self, day: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= day && day <= end,
            _ => false,
        }
    }
}

pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_working_day(day: NaiveDate, pause: &PauseWindow) -> bool {
    !is_weekend(day) && !pause.contains(day)
}

/// Walk forward from `start` one calendar day at a time, consuming one unit of
/// `duration_days` per working day (the start date included), and return the day on
/// which the remaining duration reaches zero.
///
/// Returns `None` when there is no start date or the duration is not positive. If the
/// walk hits [`SIMULATION_CEILING_DAYS`] first, the date reached so far is returned.
pub fn projected_completion_date(
    start: Option<NaiveDate>,
    duration_days: Option<i32>,
    pause: PauseWindow,
) -> Option<NaiveDate> {
    let start = start?;
    let duration = duration_days.filter(|d| *d > 0)?;

    let mut current = start;
    let mut remaining = duration;
    let mut simulated = 0u32;

    while remaining > 0 && simulated < SIMULATION_CEILING_DAYS {
        if is_working_day(current, &pause) {
            remaining -= 1;
        }

        if remaining > 0 {
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        simulated += 1;
    }

    if remaining > 0 {
        tracing::debug!(
            %start,
            duration,
            reached = %current,
            "schedule simulation hit the day ceiling"
        );
    }

    Some(current)
}

/// Start and end dates shown on the Gantt chart and the project pages.
///
/// End falls back from the theoretical end to the deadline to `start + 30 days`; an end
/// that is not strictly after start is pushed to `max(today, start + 1 day)`.
pub fn display_span(
    start: NaiveDate,
    theoretical_end: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = theoretical_end.or(deadline).unwrap_or_else(|| {
        start
            .checked_add_signed(Duration::days(DEFAULT_SPAN_DAYS))
            .unwrap_or(NaiveDate::MAX)
    });

    if end > start {
        return (start, end);
    }

    match start.succ_opt() {
        Some(next_day) => (start, today.max(next_day)),
        // Nothing follows the last representable day; step the start back instead.
        None => (start.pred_opt().unwrap_or(start), start),
    }
}

pub fn format_date(date: Option<NaiveDate>, missing: &str) -> String {
    date.map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| missing.to_string())
}

/// One bar of the Gantt chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GanttTask {
    pub id: String,
    pub name: String,
    pub start: String,
    pub end: String,
    pub progress: i32,
    pub custom_class: String,
}

/// CSS class used to color a Gantt bar for the given status.
pub fn bar_class(status: &str) -> &'static str {
    match status {
        "In progress" => "bar-progress",
        "Review" => "bar-review",
        "Done" => "bar-done",
        "Overdue" => "bar-overdue",
        _ => "bar-todo",
    }
}
