//! Field checks applied before any request leaves the browser or the proxy.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_MESSAGE_LENGTH: usize = 2000;
pub const MIN_QUIZ_QUESTIONS: u8 = 1;
pub const MAX_QUIZ_QUESTIONS: u8 = 20;
pub const DEFAULT_QUIZ_QUESTIONS: u8 = 5;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$").expect("valid regex")
});

static PAGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(-[0-9]+)?)(,[0-9]+(-[0-9]+)?)*$").expect("valid regex"));

/// A rejected form field, with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_message(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("message", "Please enter a message."));
    }
    let length = text.chars().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::new(
            "message",
            format!("Message is too long ({length} characters, maximum {MAX_MESSAGE_LENGTH})."),
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("text", "Please enter some text to summarize."));
    }
    Ok(())
}

pub fn validate_pdf(content_type: Option<&str>, size: usize) -> Result<(), ValidationError> {
    let is_pdf = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false);
    if !is_pdf || size == 0 {
        return Err(ValidationError::new("file", "Please upload a valid PDF file."));
    }
    Ok(())
}

pub fn validate_youtube_url(url: &str) -> Result<(), ValidationError> {
    if !YOUTUBE_URL.is_match(url.trim()) {
        return Err(ValidationError::new("video_url", "Please enter a valid YouTube URL."));
    }
    Ok(())
}

/// An empty range means every page.
pub fn validate_page_range(range: &str) -> Result<(), ValidationError> {
    let range = range.trim();
    if range.is_empty() || PAGE_RANGE.is_match(range) {
        return Ok(());
    }
    Err(ValidationError::new(
        "page_range",
        "Page range must look like 1-5,10,15-20.",
    ))
}

pub fn validate_focus_topics(topics: &str) -> Result<(), ValidationError> {
    if topics.trim().is_empty() || topics.split(',').all(|t| !t.trim().is_empty()) {
        return Ok(());
    }
    Err(ValidationError::new(
        "focus_topics",
        "Focus topics must be a comma-separated list without empty entries.",
    ))
}

pub fn validate_quiz_question_count(raw: &str) -> Result<u8, ValidationError> {
    let out_of_range = || {
        ValidationError::new(
            "num_quiz_questions",
            format!(
                "Number of quiz questions must be a whole number between {MIN_QUIZ_QUESTIONS} and {MAX_QUIZ_QUESTIONS}."
            ),
        )
    };
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(out_of_range());
    }
    let count: u8 = raw.parse().map_err(|_| out_of_range())?;
    if (MIN_QUIZ_QUESTIONS..=MAX_QUIZ_QUESTIONS).contains(&count) {
        Ok(count)
    } else {
        Err(out_of_range())
    }
}

pub fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(ValidationError::new(
            field,
            format!("Invalid value '{other}' for {field}; expected true or false."),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_range_accepts_lists_and_spans() {
        assert!(validate_page_range("1-5,10,15-20").is_ok());
        assert!(validate_page_range("7").is_ok());
        assert!(validate_page_range("").is_ok());
        assert!(validate_page_range("   ").is_ok());
    }

    #[test]
    fn page_range_rejects_gaps_and_garbage() {
        for bad in ["1-5,,10", "1-", "-3", "a-b", "1 - 5", "1,2,", "\u{0661}-\u{0665}", "\u{FF11}"] {
            let err = validate_page_range(bad).unwrap_err();
            assert_eq!(err.field, "page_range", "{bad}");
        }
    }

    #[test]
    fn youtube_urls() {
        for ok in [
            "https://www.youtube.com/watch?v=abc",
            "http://youtu.be/abc",
            "youtube.com/watch?v=x",
            "https://youtube.com/shorts/x",
        ] {
            assert!(validate_youtube_url(ok).is_ok(), "{ok}");
        }
        for bad in ["", "https://vimeo.com/1", "https://youtube.com/", "youtube"] {
            assert!(validate_youtube_url(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn message_must_be_present_and_bounded() {
        assert!(validate_message("hi").is_ok());
        assert_eq!(
            validate_message("  \n").unwrap_err().message,
            "Please enter a message."
        );
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(validate_message(&long).is_err());
        assert!(validate_message(&"é".repeat(MAX_MESSAGE_LENGTH)).is_ok());
    }

    #[test]
    fn text_must_not_be_blank() {
        assert!(validate_text("content").is_ok());
        assert_eq!(validate_text(" ").unwrap_err().field, "text");
    }

    #[test]
    fn pdf_requires_pdf_content_type_and_bytes() {
        assert!(validate_pdf(Some("application/pdf"), 10).is_ok());
        assert!(validate_pdf(Some("Application/PDF; charset=binary"), 10).is_ok());
        assert!(validate_pdf(Some("text/plain"), 10).is_err());
        assert!(validate_pdf(None, 10).is_err());
        assert!(validate_pdf(Some("application/pdf"), 0).is_err());
    }

    #[test]
    fn focus_topics_reject_empty_items() {
        assert!(validate_focus_topics("").is_ok());
        assert!(validate_focus_topics("rust, async").is_ok());
        assert!(validate_focus_topics("rust,,async").is_err());
        assert!(validate_focus_topics("rust, ").is_err());
    }

    #[test]
    fn quiz_question_count_bounds() {
        assert_eq!(validate_quiz_question_count("1"), Ok(1));
        assert_eq!(validate_quiz_question_count(" 20 "), Ok(20));
        for bad in ["0", "21", "-1", "+5", "2.5", "many", "", "\u{0665}"] {
            assert!(validate_quiz_question_count(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag("include_timestamps", "on"), Ok(true));
        assert_eq!(parse_flag("include_timestamps", "FALSE"), Ok(false));
        assert!(parse_flag("include_timestamps", "maybe").is_err());
    }
}
