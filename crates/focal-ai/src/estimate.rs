//! Task duration estimation.

use regex::Regex;
use tracing::warn;

use focal_core::{truncate_chars, ServiceOutcome};

use crate::client::GenerationClient;

/// Hours assumed when the service cannot produce an estimate.
pub const DEFAULT_ESTIMATE_HOURS: f64 = 2.0;

/// Longest description slice embedded in the prompt.
const MAX_DESCRIPTION_CHARS: usize = 500;

const MAX_TOKENS: u32 = 10;
const TEMPERATURE: f32 = 0.3;

/// Build the estimation prompt for a task.
pub fn estimate_prompt(title: &str, description: &str) -> String {
    format!(
        r#"Estimate how many hours the following task will take:

Title: {}
Description: {}

Considering complexity and typical durations, reply with the number of hours only (decimals allowed).
Example: 2.5"#,
        title,
        truncate_chars(description, MAX_DESCRIPTION_CHARS)
    )
}

/// Pull the first numeric token out of a service reply.
pub fn parse_estimate_reply(reply: &str) -> Option<f64> {
    if let Ok(re) = Regex::new(r"\d+\.?\d*") {
        if let Some(m) = re.find(reply) {
            return m.as_str().parse().ok();
        }
    }
    None
}

/// Estimate the hours a task will take.
///
/// An unconfigured client is skipped; any failure recovers to
/// [`DEFAULT_ESTIMATE_HOURS`].
pub async fn estimate_task_hours(
    client: &GenerationClient,
    title: &str,
    description: &str,
) -> ServiceOutcome<f64> {
    if !client.is_configured() {
        return ServiceOutcome::Skipped(DEFAULT_ESTIMATE_HOURS);
    }

    let prompt = estimate_prompt(title, description);

    match client.complete("", &prompt, MAX_TOKENS, TEMPERATURE).await {
        Ok(reply) => match parse_estimate_reply(&reply) {
            Some(hours) => ServiceOutcome::Served(hours),
            None => {
                warn!("No numeric estimate in reply: {:?}", reply);
                ServiceOutcome::recovered(
                    DEFAULT_ESTIMATE_HOURS,
                    format!("no numeric token in reply: {:?}", reply),
                )
            }
        },
        Err(e) => {
            warn!("Task estimation failed: {}", e);
            ServiceOutcome::recovered(DEFAULT_ESTIMATE_HOURS, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_estimate_reply("2.5"), Some(2.5));
        assert_eq!(parse_estimate_reply("4"), Some(4.0));
    }

    #[test]
    fn test_parse_number_inside_prose() {
        assert_eq!(
            parse_estimate_reply("I would estimate about 3.5 hours for this."),
            Some(3.5)
        );
    }

    #[test]
    fn test_parse_takes_first_number() {
        assert_eq!(parse_estimate_reply("between 1.5 and 3 hours"), Some(1.5));
    }

    #[test]
    fn test_parse_no_number() {
        assert_eq!(parse_estimate_reply("hard to say"), None);
        assert_eq!(parse_estimate_reply(""), None);
    }

    #[test]
    fn test_prompt_truncates_description() {
        let description = "d".repeat(800);
        let prompt = estimate_prompt("Write report", &description);
        assert!(prompt.contains("Write report"));
        assert!(prompt.contains(&"d".repeat(500)));
        assert!(!prompt.contains(&"d".repeat(501)));
    }
}
