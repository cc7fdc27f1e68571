//! Daily productivity insight generation.
//!
//! Builds a coaching prompt from an account's trailing-week statistics,
//! asks the generation service for a structured report, and substitutes
//! a canned payload when the service is unreachable or replies with
//! something unparseable. Callers persist the result either way.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use focal_core::{CoachingWindow, CreateInsightRequest, Result, ServiceOutcome};

use crate::client::GenerationClient;

/// Insight type recorded for daily summaries.
pub const DAILY_SUMMARY_TYPE: &str = "daily_summary";

/// Confidence recorded on every daily summary, authentic or fallback.
const DAILY_CONFIDENCE: f64 = 0.85;

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;

/// Structured report produced (or substituted) for a daily summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPayload {
    pub daily_summary: String,
    pub focus_score: f64,
    pub productivity_trend: String,
    pub suggestions: Vec<String>,
    pub achievements: Vec<String>,
    pub next_actions: Vec<String>,
    pub motivation_message: String,
}

/// Build the coaching prompt for one account's trailing week.
pub fn coaching_prompt(window: &CoachingWindow) -> String {
    format!(
        r#"You are a professional productivity coach. Analyze the following user data and respond with insights.

User profile:
- Name: {username}
- Plan: {plan}
- Working hours: {work_start} - {work_end}

Last 7 days:
- Total tasks: {tasks_total}
- Completed tasks: {tasks_completed}
- Completion rate: {completion_rate:.1}%
- Notes written: {notes_created}
- Focus sessions: {session_count}
- Total focus time: {focus_minutes} minutes
- Average focus score: {avg_focus_score:.1}/10

Respond with JSON in exactly this shape:
{{
    "daily_summary": "friendly 2-3 sentence summary of recent productivity",
    "focus_score": <number from 1 to 10>,
    "productivity_trend": "rising/falling/steady",
    "suggestions": [
        "concrete improvement 1",
        "concrete improvement 2",
        "concrete improvement 3"
    ],
    "achievements": [
        "this week's win 1",
        "this week's win 2"
    ],
    "next_actions": [
        "recommended next step 1",
        "recommended next step 2"
    ],
    "motivation_message": "a short encouragement"
}}"#,
        username = window.username,
        plan = window.plan,
        work_start = window.work_start_time,
        work_end = window.work_end_time,
        tasks_total = window.stats.tasks_total,
        tasks_completed = window.stats.tasks_completed,
        completion_rate = window.stats.completion_rate,
        notes_created = window.stats.notes_created,
        session_count = window.session_count,
        focus_minutes = window.stats.focus_minutes,
        avg_focus_score = window.avg_focus_score,
    )
}

/// The canned report used when generation fails.
pub fn fallback_payload(username: &str) -> InsightPayload {
    InsightPayload {
        daily_summary: format!(
            "Nice work today, {}! Your steady effort keeps adding up to real progress.",
            username
        ),
        focus_score: 7.5,
        productivity_trend: "steady".to_string(),
        suggestions: vec![
            "Rank today's tasks and start with the most important one".to_string(),
            "Try the pomodoro rhythm: 25 minutes of focus, then a 5 minute break".to_string(),
            "Set three key goals for the day".to_string(),
        ],
        achievements: vec![
            "Kept ideas organized with regular notes".to_string(),
            "Built a consistent task management habit".to_string(),
        ],
        next_actions: vec![
            "Pick the single most important unfinished task".to_string(),
            "Sketch tomorrow's three main goals ahead of time".to_string(),
        ],
        motivation_message: "Small steps count as real progress. Keep going!".to_string(),
    }
}

/// Generate the daily report for one account's coaching window.
///
/// An unconfigured client skips straight to [`fallback_payload`].
/// Transport and parse failures both degrade to it as well; the raw
/// error is retained on the outcome for logging.
pub async fn daily_insight(
    client: &GenerationClient,
    window: &CoachingWindow,
) -> ServiceOutcome<InsightPayload> {
    if !client.is_configured() {
        debug!("Insight generation skipped: no generation service configured");
        return ServiceOutcome::Skipped(fallback_payload(&window.username));
    }

    let prompt = coaching_prompt(window);

    match client.complete("", &prompt, MAX_TOKENS, TEMPERATURE).await {
        Ok(reply) => match serde_json::from_str::<InsightPayload>(&reply) {
            Ok(payload) => ServiceOutcome::Served(payload),
            Err(e) => {
                warn!("Discarding malformed coaching reply: {}", e);
                ServiceOutcome::recovered(fallback_payload(&window.username), e.to_string())
            }
        },
        Err(e) => {
            warn!("Coaching generation failed: {}", e);
            ServiceOutcome::recovered(fallback_payload(&window.username), e.to_string())
        }
    }
}

/// Build the insight record persisted for a coaching payload.
///
/// Metadata echoes the four statistics the payload was generated from,
/// whether or not the payload is the fallback.
pub fn insight_record(
    window: &CoachingWindow,
    payload: &InsightPayload,
) -> Result<CreateInsightRequest> {
    Ok(CreateInsightRequest {
        insight_type: DAILY_SUMMARY_TYPE.to_string(),
        title: Some(format!(
            "Daily productivity report for {}",
            window.username
        )),
        content: serde_json::to_string(payload)?,
        metadata: serde_json::json!({
            "completion_rate": window.stats.completion_rate,
            "focus_time": window.stats.focus_minutes,
            "tasks_count": window.stats.tasks_total,
            "notes_count": window.stats.notes_created,
        }),
        confidence_score: Some(DAILY_CONFIDENCE),
        is_actionable: false,
        expires_at: None,
    })
}
