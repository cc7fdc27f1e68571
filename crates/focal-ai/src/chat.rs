//! Conversational coaching replies.

use tracing::warn;

use focal_core::ServiceOutcome;

use crate::client::GenerationClient;

/// Canned reply when the service is unreachable. The chat endpoint
/// still answers 200 with this text.
pub const APOLOGY: &str =
    "Sorry, the assistant is temporarily unavailable. Please try again in a moment.";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// Build the chat prompt: the user's question plus their most recently
/// touched task titles for context.
pub fn chat_prompt(username: &str, recent_tasks: &[String], message: &str) -> String {
    format!(
        r#"You are {username}'s personal productivity assistant.
The user's recent tasks: {recent_tasks:?}

User question: {message}

Answer in a friendly, helpful tone."#
    )
}

/// Answer a chat message.
///
/// An unconfigured client is skipped; failures recover to [`APOLOGY`]
/// so the conversation never errors out.
pub async fn coach_chat(
    client: &GenerationClient,
    username: &str,
    recent_tasks: &[String],
    message: &str,
) -> ServiceOutcome<String> {
    if !client.is_configured() {
        return ServiceOutcome::Skipped(APOLOGY.to_string());
    }

    let prompt = chat_prompt(username, recent_tasks, message);

    match client.complete("", &prompt, MAX_TOKENS, TEMPERATURE).await {
        Ok(reply) => ServiceOutcome::Served(reply),
        Err(e) => {
            warn!("Chat generation failed: {}", e);
            ServiceOutcome::recovered(APOLOGY.to_string(), e.to_string())
        }
    }
}
