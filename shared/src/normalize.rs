//! Classification and canonicalisation of upstream payloads.
//!
//! The upstream service has shipped several response formats over time. The
//! functions here accept all of them and produce one of the canonical shapes
//! in [`crate::models`]. Field presence uses "truthy" semantics: `null`,
//! `false`, `""` and `0` count as missing; arrays and objects count as
//! present even when empty.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::formatting::now_timestamp;
use crate::models::{
    ChatMessage, ChatReply, Quiz, QuizQuestion, Role, Section, SourceInfo, SourceType, Summary,
    SummarizeResult,
};

/// Placeholder used when upstream omits `session_id` on a chat result.
pub const DEFAULT_SESSION_ID: &str = "default-session";

pub const UNRECOGNIZED_FORMAT: &str = "Unrecognized response format from API";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Response payload is not a JSON object")]
    NotAnObject,

    #[error("Unrecognized response format from API")]
    Unrecognized { payload: Value },

    #[error("Malformed field '{field}': {reason}")]
    Malformed { field: String, reason: String },
}

impl NormalizeError {
    fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NormalizeError::Malformed {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Which endpoint produced the payload. Summarize routes carry the source
/// type substituted when the payload does not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Chat,
    Summarize(SourceType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Normalized {
    Chat(ChatReply),
    Summary(Summary),
    Quiz(Quiz),
}

pub fn normalize(payload: &Value, route: Route) -> Result<Normalized, NormalizeError> {
    match route {
        Route::Chat => normalize_chat(payload).map(Normalized::Chat),
        Route::Summarize(default_source) => {
            normalize_summarize(payload, default_source).map(|result| match result {
                SummarizeResult::Summary(s) => Normalized::Summary(s),
                SummarizeResult::Quiz(q) => Normalized::Quiz(q),
            })
        }
    }
}

// ── Chat ─────────────────────────────────────────────────────────────────────

pub fn normalize_chat(payload: &Value) -> Result<ChatReply, NormalizeError> {
    let obj = payload.as_object().ok_or(NormalizeError::NotAnObject)?;

    let message = match truthy(obj, "message") {
        Some(Value::Object(msg)) => chat_message(msg)?,
        Some(Value::String(content)) => ChatMessage {
            role: Role::Bot,
            content: content.clone(),
            timestamp: text_field(obj, "timestamp").unwrap_or_else(now_timestamp),
        },
        Some(_) => {
            return Err(NormalizeError::malformed("message", "expected an object"));
        }
        None if truthy(obj, "content").is_some() => chat_message(obj)?,
        None => {
            return Err(NormalizeError::Unrecognized {
                payload: payload.clone(),
            });
        }
    };

    let session_id = truthy(obj, "session_id")
        .and_then(scalar_text)
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    let suggestions = match obj.get("suggestions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|s| s.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(ChatReply {
        message,
        session_id,
        suggestions,
    })
}

fn chat_message(obj: &Map<String, Value>) -> Result<ChatMessage, NormalizeError> {
    let content = match truthy(obj, "content") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(NormalizeError::malformed("content", "expected a string")),
        None => return Err(NormalizeError::malformed("content", "missing")),
    };
    // Unknown roles fall back to the bot; only the server ever answers.
    let role = truthy(obj, "role")
        .and_then(Value::as_str)
        .and_then(|r| Role::try_from(r).ok())
        .unwrap_or(Role::Bot);

    Ok(ChatMessage {
        role,
        content,
        timestamp: text_field(obj, "timestamp").unwrap_or_else(now_timestamp),
    })
}

// ── Summaries and quizzes ────────────────────────────────────────────────────

/// Classifies a summarize-endpoint payload as a summary or a quiz.
///
/// A payload is a summary when it has `summary`, or `content` together with
/// `source_type`; otherwise it is a quiz when it has `questions` or `quiz`.
/// Anything else is [`NormalizeError::Unrecognized`].
pub fn normalize_summarize(
    payload: &Value,
    default_source: SourceType,
) -> Result<SummarizeResult, NormalizeError> {
    let obj = payload.as_object().ok_or(NormalizeError::NotAnObject)?;

    let is_summary = truthy(obj, "summary").is_some()
        || (truthy(obj, "content").is_some() && truthy(obj, "source_type").is_some());
    if is_summary {
        return summary(obj, default_source).map(SummarizeResult::Summary);
    }

    if truthy(obj, "questions").is_some() || truthy(obj, "quiz").is_some() {
        return quiz(obj, default_source).map(SummarizeResult::Quiz);
    }

    Err(NormalizeError::Unrecognized {
        payload: payload.clone(),
    })
}

fn summary(obj: &Map<String, Value>, default_source: SourceType) -> Result<Summary, NormalizeError> {
    let body = match truthy(obj, "summary").or_else(|| truthy(obj, "content")) {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(NormalizeError::malformed("summary", "expected a string")),
    };
    let source_type = source_type(obj, default_source);

    let sections = match (truthy(obj, "sections"), truthy(obj, "timestamps")) {
        (Some(sections), _) => Some(section_list("sections", sections)?),
        (None, Some(legacy)) => Some(section_list("timestamps", legacy)?),
        (None, None) if source_type == SourceType::Youtube => Some(Vec::new()),
        (None, None) => None,
    };

    Ok(Summary {
        summary: body,
        source_type,
        source_info: source_info(obj)?,
        timestamp: text_field(obj, "timestamp").unwrap_or_else(now_timestamp),
        key_points: string_list(obj, "key_points")?,
        sections,
        metadata: object_field(obj, "metadata")?,
    })
}

fn quiz(obj: &Map<String, Value>, default_source: SourceType) -> Result<Quiz, NormalizeError> {
    let (field, items) = question_source(obj)?;
    let questions = items
        .iter()
        .enumerate()
        .map(|(i, q)| quiz_question(&format!("{field}[{i}]"), q))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Quiz {
        questions,
        source_type: source_type(obj, default_source),
        source_info: source_info(obj)?,
        timestamp: text_field(obj, "timestamp").unwrap_or_else(now_timestamp),
        metadata: object_field(obj, "metadata")?,
    })
}

/// `questions` wins over the legacy `quiz` unless it is empty and `quiz` is not.
fn question_source(obj: &Map<String, Value>) -> Result<(&'static str, &[Value]), NormalizeError> {
    let mut fallback: Option<(&'static str, &[Value])> = None;
    for field in ["questions", "quiz"] {
        match truthy(obj, field) {
            Some(Value::Array(items)) if !items.is_empty() => return Ok((field, items.as_slice())),
            Some(Value::Array(items)) => {
                fallback.get_or_insert((field, items.as_slice()));
            }
            Some(_) => return Err(NormalizeError::malformed(field, "expected an array")),
            None => {}
        }
    }
    Ok(fallback.unwrap_or(("questions", &[][..])))
}

fn quiz_question(field: &str, value: &Value) -> Result<QuizQuestion, NormalizeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| NormalizeError::malformed(field, "expected an object"))?;

    let question = match truthy(obj, "question") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            return Err(NormalizeError::malformed(
                format!("{field}.question"),
                "expected a non-empty string",
            ))
        }
    };
    let options = string_list(obj, "options")
        .map_err(|_| NormalizeError::malformed(format!("{field}.options"), "expected strings"))?;

    // Missing or out-of-range answers leave the question unmarked.
    let correct_answer = obj
        .get("correct_answer")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .filter(|&n| n < options.len());

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation: text_field(obj, "explanation"),
    })
}

fn source_type(obj: &Map<String, Value>, default_source: SourceType) -> SourceType {
    truthy(obj, "source_type")
        .and_then(Value::as_str)
        .and_then(SourceType::parse)
        .unwrap_or(default_source)
}

fn source_info(obj: &Map<String, Value>) -> Result<SourceInfo, NormalizeError> {
    match truthy(obj, "source_info") {
        Some(Value::Object(map)) => Ok(SourceInfo::from_map(map)),
        Some(_) => Err(NormalizeError::malformed("source_info", "expected an object")),
        None => Ok(SourceInfo::default()),
    }
}

/// Reads `sections`, or derives them from legacy `timestamps` entries that
/// use `description` in place of `text`.
fn section_list(field: &str, value: &Value) -> Result<Vec<Section>, NormalizeError> {
    let items = value
        .as_array()
        .ok_or_else(|| NormalizeError::malformed(field, "expected an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let obj = entry.as_object().ok_or_else(|| {
                NormalizeError::malformed(format!("{field}[{i}]"), "expected an object")
            })?;
            Ok(Section {
                time: truthy(obj, "time").and_then(scalar_text).unwrap_or_default(),
                text: truthy(obj, "text")
                    .or_else(|| truthy(obj, "description"))
                    .and_then(scalar_text)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

// ── Field helpers ────────────────────────────────────────────────────────────

fn truthy<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    truthy(obj, key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, NormalizeError> {
    match truthy(obj, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| NormalizeError::malformed(key, "expected an array of strings"))
            })
            .collect(),
        Some(_) => Err(NormalizeError::malformed(key, "expected an array")),
    }
}

fn object_field(obj: &Map<String, Value>, key: &str) -> Result<Map<String, Value>, NormalizeError> {
    match truthy(obj, key) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(NormalizeError::malformed(key, "expected an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summarize(payload: Value, default_source: SourceType) -> SummarizeResult {
        normalize_summarize(&payload, default_source).unwrap()
    }

    fn as_summary(result: SummarizeResult) -> Summary {
        match result {
            SummarizeResult::Summary(s) => s,
            other => panic!("expected a summary, got {other:?}"),
        }
    }

    fn as_quiz(result: SummarizeResult) -> Quiz {
        match result {
            SummarizeResult::Quiz(q) => q,
            other => panic!("expected a quiz, got {other:?}"),
        }
    }

    // ── chat ─────────────────────────────────────────────────────────────

    #[test]
    fn chat_content_is_wrapped_into_message() {
        let reply = normalize_chat(&json!({"content": "hello", "session_id": "abc"})).unwrap();
        assert_eq!(reply.message.role, Role::Bot);
        assert_eq!(reply.message.content, "hello");
        assert!(!reply.message.timestamp.is_empty());
        assert_eq!(reply.session_id, "abc");
    }

    #[test]
    fn chat_keeps_upstream_role_and_timestamp() {
        let reply = normalize_chat(&json!({
            "content": "note",
            "role": "system",
            "timestamp": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(reply.message.role, Role::System);
        assert_eq!(reply.message.timestamp, "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn chat_session_id_defaults_to_placeholder() {
        let reply = normalize_chat(&json!({
            "message": {"role": "bot", "content": "hi"}
        }))
        .unwrap();
        assert_eq!(reply.session_id, DEFAULT_SESSION_ID);
        assert_eq!(reply.message.content, "hi");
    }

    #[test]
    fn chat_collects_string_suggestions() {
        let reply = normalize_chat(&json!({
            "message": {"content": "hi"},
            "suggestions": ["a", 3, "b"]
        }))
        .unwrap();
        assert_eq!(reply.suggestions, vec!["a", "b"]);
    }

    #[test]
    fn chat_without_message_or_content_is_unrecognized() {
        let payload = json!({"detail": "oops"});
        let err = normalize_chat(&payload).unwrap_err();
        assert_eq!(err, NormalizeError::Unrecognized { payload });
    }

    #[test]
    fn chat_rejects_non_object() {
        assert_eq!(
            normalize_chat(&json!("plain")).unwrap_err(),
            NormalizeError::NotAnObject
        );
    }

    // ── summaries ────────────────────────────────────────────────────────

    #[test]
    fn summary_fills_defaults() {
        let s = as_summary(summarize(json!({"summary": "short"}), SourceType::Text));
        assert_eq!(s.summary, "short");
        assert_eq!(s.source_type, SourceType::Text);
        assert_eq!(s.source_info, SourceInfo::default());
        assert!(s.key_points.is_empty());
        assert!(s.metadata.is_empty());
        assert_eq!(s.sections, None);
        assert!(!s.timestamp.is_empty());
    }

    #[test]
    fn content_with_source_type_is_a_summary() {
        let s = as_summary(summarize(
            json!({"content": "body", "source_type": "pdf", "key_points": ["k1"]}),
            SourceType::Text,
        ));
        assert_eq!(s.summary, "body");
        assert_eq!(s.source_type, SourceType::Pdf);
        assert_eq!(s.key_points, vec!["k1"]);
    }

    #[test]
    fn content_alone_is_not_a_summary() {
        let payload = json!({"content": "body"});
        assert!(matches!(
            normalize_summarize(&payload, SourceType::Text),
            Err(NormalizeError::Unrecognized { .. })
        ));
    }

    #[test]
    fn summary_field_wins_over_content() {
        let s = as_summary(summarize(
            json!({"summary": "main", "content": "other", "source_type": "text"}),
            SourceType::Text,
        ));
        assert_eq!(s.summary, "main");
    }

    #[test]
    fn youtube_summary_gets_empty_sections() {
        let s = as_summary(summarize(json!({"summary": "v"}), SourceType::Youtube));
        assert_eq!(s.sections, Some(vec![]));
    }

    #[test]
    fn legacy_timestamps_become_sections() {
        let s = as_summary(summarize(
            json!({
                "summary": "v",
                "timestamps": [
                    {"time": "1:23", "text": "intro"},
                    {"time": "4:56", "description": "demo"},
                    {"time": "7:00"}
                ]
            }),
            SourceType::Youtube,
        ));
        assert_eq!(
            s.sections,
            Some(vec![
                Section { time: "1:23".into(), text: "intro".into() },
                Section { time: "4:56".into(), text: "demo".into() },
                Section { time: "7:00".into(), text: String::new() },
            ])
        );
        let out = serde_json::to_value(&s).unwrap();
        assert!(out.get("timestamps").is_none());
    }

    #[test]
    fn sections_take_precedence_over_timestamps() {
        let s = as_summary(summarize(
            json!({
                "summary": "v",
                "source_type": "youtube",
                "sections": [{"time": "0:10", "text": "start"}],
                "timestamps": [{"time": "9:99", "text": "ignored"}]
            }),
            SourceType::Text,
        ));
        assert_eq!(
            s.sections,
            Some(vec![Section { time: "0:10".into(), text: "start".into() }])
        );
    }

    #[test]
    fn unknown_source_type_falls_back_to_route() {
        let s = as_summary(summarize(
            json!({"summary": "x", "source_type": "podcast"}),
            SourceType::Pdf,
        ));
        assert_eq!(s.source_type, SourceType::Pdf);
    }

    #[test]
    fn summary_with_non_string_key_points_is_malformed() {
        let err = normalize_summarize(&json!({"summary": "x", "key_points": [1]}), SourceType::Text)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Malformed { ref field, .. } if field == "key_points"));
    }

    #[test]
    fn empty_summary_string_counts_as_missing() {
        let payload = json!({"summary": "", "metadata": {}});
        assert!(matches!(
            normalize_summarize(&payload, SourceType::Text),
            Err(NormalizeError::Unrecognized { .. })
        ));
    }

    // ── quizzes ──────────────────────────────────────────────────────────

    fn question(text: &str) -> Value {
        json!({
            "question": text,
            "options": ["a", "b", "c"],
            "correct_answer": 2,
            "explanation": "because"
        })
    }

    #[test]
    fn quiz_fills_defaults() {
        let q = as_quiz(summarize(json!({"questions": [question("Q1")]}), SourceType::Youtube));
        assert_eq!(q.questions.len(), 1);
        assert_eq!(q.questions[0].correct_answer, Some(2));
        assert_eq!(q.questions[0].explanation.as_deref(), Some("because"));
        assert_eq!(q.source_type, SourceType::Youtube);
        assert_eq!(q.source_info, SourceInfo::default());
        assert!(q.metadata.is_empty());
    }

    #[test]
    fn legacy_quiz_field_is_accepted() {
        let q = as_quiz(summarize(json!({"quiz": [question("old")]}), SourceType::Text));
        assert_eq!(q.questions[0].question, "old");
        let out = serde_json::to_value(&q).unwrap();
        assert!(out.get("quiz").is_none());
        assert!(out.get("questions").is_some());
    }

    #[test]
    fn questions_field_wins_when_both_present() {
        let q = as_quiz(summarize(
            json!({"questions": [question("new")], "quiz": [question("old")]}),
            SourceType::Text,
        ));
        assert_eq!(q.questions[0].question, "new");
    }

    #[test]
    fn empty_questions_defer_to_legacy_quiz() {
        let q = as_quiz(summarize(
            json!({"questions": [], "quiz": [question("old")]}),
            SourceType::Text,
        ));
        assert_eq!(q.questions[0].question, "old");
    }

    #[test]
    fn empty_questions_still_make_a_quiz() {
        let q = as_quiz(summarize(json!({"questions": []}), SourceType::Pdf));
        assert!(q.questions.is_empty());
        assert_eq!(q.source_type, SourceType::Pdf);
    }

    #[test]
    fn out_of_range_answer_is_left_unmarked() {
        let q = as_quiz(summarize(
            json!({"questions": [{"question": "q", "options": ["a"], "correct_answer": 1}]}),
            SourceType::Text,
        ));
        assert_eq!(q.questions[0].correct_answer, None);
        let out = serde_json::to_value(&q).unwrap();
        assert!(out["questions"][0].get("correct_answer").is_none());
    }

    #[test]
    fn incomplete_question_is_kept() {
        let q = as_quiz(summarize(
            json!({"questions": [question("full"), {"question": "bare"}]}),
            SourceType::Text,
        ));
        assert_eq!(q.questions.len(), 2);
        assert_eq!(q.questions[0].correct_answer, Some(2));
        assert!(q.questions[1].options.is_empty());
        assert_eq!(q.questions[1].correct_answer, None);
    }

    #[test]
    fn non_string_options_are_malformed() {
        let err = normalize_summarize(
            &json!({"questions": [{"question": "q", "options": [1, 2], "correct_answer": 0}]}),
            SourceType::Text,
        )
        .unwrap_err();
        assert!(
            matches!(err, NormalizeError::Malformed { ref field, .. } if field == "questions[0].options")
        );
    }

    #[test]
    fn unrecognized_payload_is_never_defaulted() {
        let payload = json!({"status": "done", "metadata": {"model": "x"}});
        let err = normalize_summarize(&payload, SourceType::Youtube).unwrap_err();
        assert_eq!(err, NormalizeError::Unrecognized { payload });
        assert_eq!(err.to_string(), UNRECOGNIZED_FORMAT);
    }

    #[test]
    fn normalizing_canonical_output_is_stable() {
        let first = summarize(
            json!({
                "content": "c",
                "source_type": "youtube",
                "source_info": {"title": "T", "duration": "3:00", "lang": "en"},
                "timestamps": [{"time": "0:01", "description": "d"}],
                "metadata": {"model": "m"}
            }),
            SourceType::Youtube,
        );
        let again = summarize(serde_json::to_value(&first).unwrap(), SourceType::Text);
        assert_eq!(first, again);

        let quiz = summarize(json!({"quiz": [question("q")]}), SourceType::Pdf);
        let again = summarize(serde_json::to_value(&quiz).unwrap(), SourceType::Text);
        assert_eq!(quiz, again);
    }

    #[test]
    fn normalize_dispatches_on_route() {
        let chat = normalize(&json!({"content": "c", "source_type": "text"}), Route::Chat).unwrap();
        assert!(matches!(chat, Normalized::Chat(_)));
        let summary = normalize(
            &json!({"content": "c", "source_type": "text"}),
            Route::Summarize(SourceType::Text),
        )
        .unwrap();
        assert!(matches!(summary, Normalized::Summary(_)));
    }
}
