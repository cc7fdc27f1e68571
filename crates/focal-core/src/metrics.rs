//! Derived text metrics for note bodies.

use serde::{Deserialize, Serialize};

/// Reading speed used for the reading-time estimate, in words per minute.
const WORDS_PER_MINUTE: usize = 200;

/// Metrics derived from a note body.
///
/// Recomputed on every write that changes the body, so stored values
/// never drift from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BodyMetrics {
    /// Unicode scalar count, not byte length.
    pub character_count: i32,
    pub word_count: i32,
    /// Estimated minutes to read, never below 1.
    pub reading_time: i32,
}

impl BodyMetrics {
    /// Derive metrics from a body.
    pub fn of(body: &str) -> Self {
        let character_count = body.chars().count();
        let word_count = body.split_whitespace().count();
        let reading_time = (word_count / WORDS_PER_MINUTE).max(1);

        Self {
            character_count: character_count as i32,
            word_count: word_count as i32,
            reading_time: reading_time as i32,
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
///
/// The external adapters use this to cap prompt and block sizes; limits
/// count characters, matching [`BodyMetrics`].
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        let metrics = BodyMetrics::of("");
        assert_eq!(metrics.character_count, 0);
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.reading_time, 1);
    }

    #[test]
    fn test_whitespace_only_body() {
        let metrics = BodyMetrics::of("   \n\t  ");
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.reading_time, 1);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let metrics = BodyMetrics::of("héllo");
        assert_eq!(metrics.character_count, 5);
        assert_eq!(metrics.word_count, 1);
    }

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        let metrics = BodyMetrics::of("one two\nthree\t four");
        assert_eq!(metrics.word_count, 4);
    }

    #[test]
    fn test_reading_time_floors_at_one_minute() {
        assert_eq!(BodyMetrics::of("short note").reading_time, 1);
    }

    #[test]
    fn test_reading_time_scales_with_words() {
        let body = "word ".repeat(450);
        let metrics = BodyMetrics::of(&body);
        assert_eq!(metrics.word_count, 450);
        assert_eq!(metrics.reading_time, 2);
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_truncate_chars_cuts_at_limit() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_counts_code_points() {
        // Four characters, more than four bytes.
        assert_eq!(truncate_chars("日本語だよ", 3), "日本語");
    }
}
