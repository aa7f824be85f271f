use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bareminimum_shared::{Route, SourceType};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Operations the upstream service exposes. Paths are identical on the
/// proxy and on the upstream side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ChatMessage,
    SummarizeText,
    SummarizePdf,
    SummarizeYoutube,
    Health,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ChatMessage => "/api/v1/chat/message",
            Endpoint::SummarizeText => "/api/v1/summarize/text",
            Endpoint::SummarizePdf => "/api/v1/summarize/pdf",
            Endpoint::SummarizeYoutube => "/api/v1/summarize/youtube",
            Endpoint::Health => "/api/v1/health",
        }
    }

    /// How responses from this endpoint are normalized, if at all.
    pub fn route(&self) -> Option<Route> {
        match self {
            Endpoint::ChatMessage => Some(Route::Chat),
            Endpoint::SummarizeText => Some(Route::Summarize(SourceType::Text)),
            Endpoint::SummarizePdf => Some(Route::Summarize(SourceType::Pdf)),
            Endpoint::SummarizeYoutube => Some(Route::Summarize(SourceType::Youtube)),
            Endpoint::Health => None,
        }
    }
}

// ── Outgoing form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: UploadedFile },
}

/// Multipart body sent upstream, kept as plain data so it can be logged and
/// rebuilt into a `reqwest` form for each call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamForm {
    parts: Vec<FormPart>,
}

impl UpstreamForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// One line per field for logs; file contents are summarised, never dumped.
    pub fn describe(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|part| match part {
                FormPart::Text { name, value } => format!("{name}: {value}"),
                FormPart::File { name, file } => format!(
                    "{name}: [File] {}, {}, {} bytes",
                    file.file_name,
                    file.content_type.as_deref().unwrap_or("unknown"),
                    file.bytes.len()
                ),
            })
            .collect()
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// Transport-level result of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
    /// Whether `body` was parsed from an `application/json` response.
    pub is_json: bool,
    /// `set-cookie` values to hand back to the browser, verbatim.
    pub cookies: Vec<String>,
}

/// Response envelope returned by every proxy handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: Value,
    pub cookies: Vec<String>,
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = (status, Json(self.body)).into_response();
        for cookie in self.cookies {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => warn!("Dropping unforwardable set-cookie header: {e}"),
            }
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}
