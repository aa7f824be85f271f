use bareminimum_shared::session::response_outcome;
use bareminimum_shared::{SourceType, SummarizeOptions};
use gloo_net::http::{Request, Response};
use serde_json::Value;
use web_sys::{File, FormData, RequestCredentials};

/// Base URL of the proxy server.
const API_BASE: &str = "http://localhost:3000";

/// What the user asked to have summarized.
pub enum SummarizeInput {
    Text(String),
    Pdf { file: File, page_range: String },
    Youtube { video_url: String, include_timestamps: bool },
}

impl SummarizeInput {
    pub fn source_type(&self) -> SourceType {
        match self {
            SummarizeInput::Text(_) => SourceType::Text,
            SummarizeInput::Pdf { .. } => SourceType::Pdf,
            SummarizeInput::Youtube { .. } => SourceType::Youtube,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            SummarizeInput::Text(_) => "/api/v1/summarize/text",
            SummarizeInput::Pdf { .. } => "/api/v1/summarize/pdf",
            SummarizeInput::Youtube { .. } => "/api/v1/summarize/youtube",
        }
    }
}

/// Sends one chat turn. The session cookie travels with the request.
pub async fn send_chat(message: &str) -> Result<Value, String> {
    let form = new_form()?;
    append(&form, "message", message)?;
    post_form("/api/v1/chat/message", form).await
}

/// Submits a summarize request for any source type.
pub async fn summarize(input: SummarizeInput, options: &SummarizeOptions) -> Result<Value, String> {
    let form = new_form()?;
    let path = input.path();

    match input {
        SummarizeInput::Text(text) => append(&form, "text", &text)?,
        SummarizeInput::Pdf { file, page_range } => {
            form.append_with_blob_and_filename("file", &file, &file.name())
                .map_err(|e| format!("Form error: {e:?}"))?;
            if !page_range.trim().is_empty() {
                append(&form, "page_range", page_range.trim())?;
            }
        }
        SummarizeInput::Youtube {
            video_url,
            include_timestamps,
        } => {
            append(&form, "video_url", video_url.trim())?;
            append(
                &form,
                "include_timestamps",
                if include_timestamps { "true" } else { "false" },
            )?;
        }
    }
    for (name, value) in options.to_fields() {
        append(&form, name, &value)?;
    }

    post_form(path, form).await
}

async fn post_form(path: &str, form: FormData) -> Result<Value, String> {
    let resp = Request::post(&format!("{API_BASE}{path}"))
        .credentials(RequestCredentials::Include)
        .body(form)
        .map_err(|e| format!("Request error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    read_json(resp).await
}

async fn read_json(resp: Response) -> Result<Value, String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    let outcome = response_outcome(status, &body);
    match &outcome {
        Ok(value) => log::debug!("API response ({status}): {value}"),
        Err(e) => log::warn!("API error ({status}): {e}"),
    }
    outcome
}

fn new_form() -> Result<FormData, String> {
    FormData::new().map_err(|e| format!("Form error: {e:?}"))
}

fn append(form: &FormData, name: &str, value: &str) -> Result<(), String> {
    form.append_with_str(name, value)
        .map_err(|e| format!("Form error: {e:?}"))
}
