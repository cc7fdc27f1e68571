//! Pure aggregation engine for productivity reporting.
//!
//! Everything here operates on plain samples already fetched from the
//! database, so bucketing and summary math stay unit-testable without a
//! pool. The db crate gathers the inputs; handlers serialize the
//! outputs.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default report window when the request does not name one.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Upper bound accepted for a report window.
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Trailing window used for coaching context.
pub const COACHING_WINDOW_DAYS: u32 = 7;

/// Completion percentage with a `max(1, total)` guard, unrounded.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    completed as f64 / total.max(1) as f64 * 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Account-wide task counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTotals {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
}

/// One completed focus session, reduced to what the reports need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSample {
    /// Calendar day the session was created on.
    pub date: NaiveDate,
    /// Recorded minutes, zero when the session never logged any.
    pub minutes: i64,
    pub focus_score: Option<f64>,
}

/// Raw activity fetched for one account's report window.
#[derive(Debug, Clone, Default)]
pub struct ActivityWindow {
    /// Final bucket day; buckets run backwards from here.
    pub end: NaiveDate,
    pub days: u32,
    /// One entry per task completion, by completion day.
    pub task_completions: Vec<NaiveDate>,
    /// One entry per note, by creation day.
    pub note_creations: Vec<NaiveDate>,
    pub sessions: Vec<SessionSample>,
}

/// Per-day aggregate over one calendar day of the window.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub completed_tasks: i64,
    pub created_notes: i64,
    pub focus_sessions: i64,
    pub total_focus_time: i64,
    /// Mean focus score of the day's sessions, one decimal; 0 when the
    /// day had no sessions.
    pub avg_focus_score: f64,
}

/// Bucket an activity window into one aggregate per calendar day.
///
/// Always yields exactly `window.days` buckets in chronological order,
/// the last one being `window.end`. Days without activity report zeros
/// rather than being omitted.
pub fn daily_buckets(window: &ActivityWindow) -> Vec<DailyBucket> {
    let mut completions: HashMap<NaiveDate, i64> = HashMap::new();
    for date in &window.task_completions {
        *completions.entry(*date).or_insert(0) += 1;
    }

    let mut creations: HashMap<NaiveDate, i64> = HashMap::new();
    for date in &window.note_creations {
        *creations.entry(*date).or_insert(0) += 1;
    }

    // count, minutes, score sum per day
    let mut sessions: HashMap<NaiveDate, (i64, i64, f64)> = HashMap::new();
    for sample in &window.sessions {
        let entry = sessions.entry(sample.date).or_insert((0, 0, 0.0));
        entry.0 += 1;
        entry.1 += sample.minutes;
        entry.2 += sample.focus_score.unwrap_or(0.0);
    }

    (0..window.days)
        .map(|i| {
            let date = window.end - Duration::days((window.days - 1 - i) as i64);
            let (count, minutes, score_sum) =
                sessions.get(&date).copied().unwrap_or((0, 0, 0.0));
            DailyBucket {
                date,
                completed_tasks: completions.get(&date).copied().unwrap_or(0),
                created_notes: creations.get(&date).copied().unwrap_or(0),
                focus_sessions: count,
                total_focus_time: minutes,
                avg_focus_score: round1(score_sum / count.max(1) as f64),
            }
        })
        .collect()
}

/// Window-level summary served next to the daily buckets.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WindowSummary {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
    pub total_notes: i64,
    /// Mean completed tasks per day over the window.
    pub avg_productivity_score: f64,
}

/// Collapse buckets and account totals into the report summary.
pub fn summarize(totals: &TaskTotals, total_notes: i64, buckets: &[DailyBucket]) -> WindowSummary {
    let window_completed: i64 = buckets.iter().map(|b| b.completed_tasks).sum();

    WindowSummary {
        total_tasks: totals.total,
        completed_tasks: totals.completed,
        completion_rate: completion_rate(totals.completed, totals.total),
        total_notes,
        avg_productivity_score: window_completed as f64 / (buckets.len() as i64).max(1) as f64,
    }
}

/// One bar of a category histogram.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}

/// Task-category and note-type histograms.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CategoryHistograms {
    pub tasks: Vec<CategoryCount>,
    pub notes: Vec<CategoryCount>,
}

/// Full productivity report body.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnalyticsReport {
    pub daily_stats: Vec<DailyBucket>,
    pub summary: WindowSummary,
    pub categories: CategoryHistograms,
}

/// Trailing-week counters shared by the dashboard and coaching context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WeekStats {
    pub tasks_total: i64,
    pub tasks_completed: i64,
    /// Rounded to one decimal.
    pub completion_rate: f64,
    pub notes_created: i64,
    pub focus_minutes: i64,
}

/// Assemble week counters, deriving the completion rate.
pub fn week_stats(
    tasks_total: i64,
    tasks_completed: i64,
    notes_created: i64,
    focus_minutes: i64,
) -> WeekStats {
    WeekStats {
        tasks_total,
        tasks_completed,
        completion_rate: round1(completion_rate(tasks_completed, tasks_total)),
        notes_created,
        focus_minutes,
    }
}

/// Total minutes and mean focus score over a set of sessions.
///
/// The mean divides by the session count whether or not each session
/// carries a score, matching the reporting buckets.
pub fn session_rollup(sessions: &[SessionSample]) -> (i64, f64) {
    let minutes: i64 = sessions.iter().map(|s| s.minutes).sum();
    let score_sum: f64 = sessions.iter().filter_map(|s| s.focus_score).sum();
    (minutes, score_sum / (sessions.len() as i64).max(1) as f64)
}

/// Everything the coaching generator needs to know about an account's
/// trailing week.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachingWindow {
    pub username: String,
    pub plan: String,
    pub work_start_time: String,
    pub work_end_time: String,
    pub stats: WeekStats,
    pub session_count: i64,
    /// Mean focus score over the window's sessions, unrounded.
    pub avg_focus_score: f64,
}
