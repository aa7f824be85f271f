use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::Json;
use bareminimum_shared::formatting::now_timestamp;
use bareminimum_shared::validation::{
    parse_flag, validate_message, validate_page_range, validate_pdf, validate_text,
    validate_youtube_url, ValidationError,
};
use bareminimum_shared::SummarizeOptions;

use crate::errors::AppError;
use crate::models::{Endpoint, HealthResponse, ProxyReply, UpstreamForm};
use crate::routes::form::FormFields;
use crate::service::proxy_service::ProxyService;

type Form = Result<Multipart, MultipartRejection>;

/// POST `/api/v1/chat/message`
pub async fn chat_message_handler(
    State(svc): State<ProxyService>,
    headers: HeaderMap,
    multipart: Form,
) -> Result<ProxyReply, AppError> {
    let fields = FormFields::read(multipart?).await?;
    let message = fields.text("message").unwrap_or_default();
    validate_message(message)?;

    let form = UpstreamForm::new().text("message", message);
    Ok(svc
        .dispatch(Endpoint::ChatMessage, form, browser_cookie(&headers))
        .await)
}

/// POST `/api/v1/summarize/text`
pub async fn summarize_text_handler(
    State(svc): State<ProxyService>,
    headers: HeaderMap,
    multipart: Form,
) -> Result<ProxyReply, AppError> {
    let fields = FormFields::read(multipart?).await?;
    let text = fields.text("text").unwrap_or_default();
    validate_text(text)?;
    let options = SummarizeOptions::from_fields(|name| fields.text(name))?;

    let form = with_options(UpstreamForm::new().text("text", text), &options);
    Ok(svc
        .dispatch(Endpoint::SummarizeText, form, browser_cookie(&headers))
        .await)
}

/// POST `/api/v1/summarize/pdf`
pub async fn summarize_pdf_handler(
    State(svc): State<ProxyService>,
    headers: HeaderMap,
    multipart: Form,
) -> Result<ProxyReply, AppError> {
    let mut fields = FormFields::read(multipart?).await?;
    let file = fields
        .take_file("file")
        .ok_or_else(|| ValidationError::new("file", "Please upload a valid PDF file."))?;
    validate_pdf(file.content_type.as_deref(), file.bytes.len())?;
    let page_range = fields.non_blank("page_range");
    if let Some(range) = page_range {
        validate_page_range(range)?;
    }
    let options = SummarizeOptions::from_fields(|name| fields.text(name))?;

    let mut form = with_options(UpstreamForm::new().file("file", file), &options);
    if let Some(range) = page_range {
        form = form.text("page_range", range);
    }
    Ok(svc
        .dispatch(Endpoint::SummarizePdf, form, browser_cookie(&headers))
        .await)
}

/// POST `/api/v1/summarize/youtube`
pub async fn summarize_youtube_handler(
    State(svc): State<ProxyService>,
    headers: HeaderMap,
    multipart: Form,
) -> Result<ProxyReply, AppError> {
    let fields = FormFields::read(multipart?).await?;
    let video_url = fields.non_blank("video_url").unwrap_or_default();
    validate_youtube_url(video_url)?;
    let include_timestamps = match fields.non_blank("include_timestamps") {
        Some(raw) => parse_flag("include_timestamps", raw)?,
        None => true,
    };
    let options = SummarizeOptions::from_fields(|name| fields.text(name))?;

    let form = with_options(UpstreamForm::new().text("video_url", video_url), &options)
        .text("include_timestamps", include_timestamps.to_string());
    Ok(svc
        .dispatch(Endpoint::SummarizeYoutube, form, browser_cookie(&headers))
        .await)
}

/// GET `/api/v1/health` — answered locally, upstream is not contacted.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn browser_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn with_options(form: UpstreamForm, options: &SummarizeOptions) -> UpstreamForm {
    options
        .to_fields()
        .into_iter()
        .fold(form, |form, (name, value)| form.text(name, value))
}
