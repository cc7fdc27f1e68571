//! Note sentiment scoring.
//!
//! Scores are advisory: a failed call degrades to the neutral pair and
//! the note write proceeds unchanged.

use serde::Deserialize;
use tracing::warn;

use focal_core::{truncate_chars, Sentiment, SentimentLabel, ServiceOutcome};

use crate::client::GenerationClient;

/// Inputs shorter than this (after trim) are not worth a service call.
const MIN_TEXT_CHARS: usize = 10;

/// Longest text slice embedded in the prompt.
const MAX_TEXT_CHARS: usize = 1000;

const MAX_TOKENS: u32 = 50;
const TEMPERATURE: f32 = 0.3;

/// Reply shape requested from the service. Missing fields take the
/// neutral defaults rather than failing the parse.
#[derive(Debug, Deserialize)]
struct SentimentReply {
    #[serde(default)]
    score: f64,
    #[serde(default = "neutral_label")]
    label: String,
}

fn neutral_label() -> String {
    "neutral".to_string()
}

/// Build the sentiment prompt for a piece of text.
pub fn sentiment_prompt(text: &str) -> String {
    format!(
        r#"Analyze the sentiment of the following text:

"{}"

Return a sentiment score (-1.0 to 1.0) and a label (positive/negative/neutral) as JSON:
{{"score": 0.0, "label": "neutral"}}"#,
        truncate_chars(text, MAX_TEXT_CHARS)
    )
}

/// Parse a service reply into a clamped sentiment pair.
///
/// A label outside the known set degrades to neutral; the score is kept.
pub fn parse_sentiment_reply(reply: &str) -> Result<Sentiment, serde_json::Error> {
    let parsed: SentimentReply = serde_json::from_str(reply)?;
    Ok(Sentiment {
        score: parsed.score.clamp(-1.0, 1.0),
        label: parsed.label.parse::<SentimentLabel>().unwrap_or_default(),
    })
}

/// Score the sentiment of `text`.
///
/// Short inputs and an unconfigured client are skipped without a call;
/// failed calls recover to the neutral pair.
pub async fn analyze_sentiment(client: &GenerationClient, text: &str) -> ServiceOutcome<Sentiment> {
    if !client.is_configured() || text.trim().chars().count() < MIN_TEXT_CHARS {
        return ServiceOutcome::Skipped(Sentiment::default());
    }

    let prompt = sentiment_prompt(text);

    match client.complete("", &prompt, MAX_TOKENS, TEMPERATURE).await {
        Ok(reply) => match parse_sentiment_reply(&reply) {
            Ok(sentiment) => ServiceOutcome::Served(sentiment),
            Err(e) => {
                warn!("Discarding malformed sentiment reply: {}", e);
                ServiceOutcome::recovered(Sentiment::default(), e.to_string())
            }
        },
        Err(e) => {
            warn!("Sentiment scoring failed: {}", e);
            ServiceOutcome::recovered(Sentiment::default(), e.to_string())
        }
    }
}
