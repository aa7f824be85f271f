//! Browser-side state for the chat transcript and the summarize panel.
//!
//! Each slot issues a [`RequestToken`] per request. A response is only
//! applied when it carries the most recently issued token; anything older
//! was superseded by a later submission and is dropped.

use serde_json::Value;

use crate::models::{ChatMessage, Role, SourceType, SummarizeResult};
use crate::normalize::{normalize_chat, normalize_summarize, NormalizeError};
use crate::validation::{validate_message, ValidationError};

/// `localStorage` key holding the serialized chat transcript.
pub const TRANSCRIPT_STORAGE_KEY: &str = "chatMessages";

const UNRECOGNIZED_MESSAGE: &str =
    "Unrecognized response format from API. Check console for details.";
const GENERIC_CHAT_ERROR: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TokenCounter {
    latest: u64,
}

impl TokenCounter {
    fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

/// Error text for a non-2xx response: the JSON `detail` when there is one,
/// else the raw body, else the status code.
pub fn error_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::Null) | None => format!("Failed with status: {status}"),
            Some(other) => other.to_string(),
        },
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("Failed with status: {status}"),
    }
}

/// Turns an HTTP status and body into the outcome fed to `settle`.
///
/// A non-2xx `{detail, payload}` body is the proxy refusing an upstream
/// payload it could not classify; the payload itself is returned so the
/// session classifies and keeps it like any other response.
pub fn response_outcome(status: u16, body: &str) -> Result<Value, String> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| format!("Parse error: {e}"));
    }
    if let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(body) {
        if obj.contains_key("detail") {
            if let Some(payload) = obj.remove("payload") {
                return Ok(payload);
            }
        }
    }
    Err(error_detail(status, body))
}

// ── Chat ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    suggestions: Vec<String>,
    session_id: Option<String>,
    phase: Phase,
    error: Option<String>,
    raw_response: Option<Value>,
    tokens: TokenCounter,
}

/// Outcome of loading a persisted transcript.
#[derive(Debug)]
pub struct Restored {
    pub session: ChatSession,
    /// The stored value could not be parsed and should be removed.
    pub discard_stored: bool,
}

impl ChatSession {
    pub fn restore(stored: Option<&str>) -> Restored {
        let Some(raw) = stored else {
            return Restored {
                session: Self::default(),
                discard_stored: false,
            };
        };
        match serde_json::from_str::<Vec<ChatMessage>>(raw) {
            Ok(messages) => Restored {
                session: Self {
                    messages,
                    ..Self::default()
                },
                discard_stored: false,
            },
            Err(_) => Restored {
                session: Self::default(),
                discard_stored: true,
            },
        }
    }

    /// Serialized transcript for persistence; `None` while it is empty.
    pub fn to_storage(&self) -> Option<String> {
        if self.messages.is_empty() {
            return None;
        }
        serde_json::to_string(&self.messages).ok()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.raw_response.as_ref()
    }

    /// Appends the user's message and marks the slot as loading.
    ///
    /// Nothing changes when the message fails validation.
    pub fn begin_turn(&mut self, text: &str) -> Result<RequestToken, ValidationError> {
        validate_message(text)?;
        self.messages.push(ChatMessage::new(Role::User, text));
        self.phase = Phase::Loading;
        self.error = None;
        self.raw_response = None;
        Ok(self.tokens.issue())
    }

    /// Applies the response of a turn. Returns `false` if the token is stale.
    pub fn settle_turn(&mut self, token: RequestToken, outcome: Result<Value, String>) -> bool {
        if !self.tokens.is_current(token) {
            return false;
        }
        self.phase = Phase::Idle;

        let payload = match outcome {
            Ok(payload) => payload,
            Err(message) => {
                self.fail(message);
                return true;
            }
        };

        let normalized = normalize_chat(&payload);
        self.raw_response = Some(payload);
        match normalized {
            Ok(reply) => {
                self.messages.push(reply.message);
                self.suggestions = reply.suggestions;
                self.session_id = Some(reply.session_id);
            }
            Err(NormalizeError::Unrecognized { .. }) => self.fail(UNRECOGNIZED_MESSAGE.to_string()),
            Err(err) => self.fail(err.to_string()),
        }
        true
    }

    fn fail(&mut self, message: String) {
        let message = if message.trim().is_empty() {
            GENERIC_CHAT_ERROR.to_string()
        } else {
            message
        };
        self.messages
            .push(ChatMessage::new(Role::System, format!("Error: {message}")));
        self.error = Some(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.suggestions.clear();
        self.raw_response = None;
        self.error = None;
    }
}

// ── Summarize ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarizeSession {
    source: Option<SourceType>,
    phase: Phase,
    result: Option<SummarizeResult>,
    error: Option<String>,
    raw_response: Option<Value>,
    tokens: TokenCounter,
}

impl SummarizeSession {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn result(&self) -> Option<&SummarizeResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.raw_response.as_ref()
    }

    /// Starts a request for `source`, dropping any previous result.
    pub fn begin(&mut self, source: SourceType) -> RequestToken {
        self.source = Some(source);
        self.phase = Phase::Loading;
        self.result = None;
        self.error = None;
        self.raw_response = None;
        self.tokens.issue()
    }

    /// Applies a response. Returns `false` if the token is stale.
    pub fn settle(&mut self, token: RequestToken, outcome: Result<Value, String>) -> bool {
        if !self.tokens.is_current(token) {
            return false;
        }
        self.phase = Phase::Idle;
        let source = self.source.unwrap_or(SourceType::Text);

        match outcome {
            Ok(payload) => {
                match normalize_summarize(&payload, source) {
                    Ok(result) => self.result = Some(result),
                    Err(NormalizeError::Unrecognized { .. }) => {
                        self.error = Some(UNRECOGNIZED_MESSAGE.to_string());
                    }
                    Err(err) => self.error = Some(err.to_string()),
                }
                self.raw_response = Some(payload);
            }
            Err(message) if message.trim().is_empty() => {
                self.error = Some(format!("An error occurred while processing {source}"));
            }
            Err(message) => self.error = Some(message),
        }
        true
    }

    pub fn clear(&mut self) {
        self.result = None;
        self.error = None;
        self.raw_response = None;
    }
}
