pub mod api_routes;
pub mod form;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::Endpoint;
use crate::service::proxy_service::ProxyService;
use api_routes::{
    chat_message_handler, health_handler, summarize_pdf_handler, summarize_text_handler,
    summarize_youtube_handler,
};

pub fn build_router(svc: ProxyService, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route(Endpoint::ChatMessage.path(), post(chat_message_handler))
        .route(Endpoint::SummarizeText.path(), post(summarize_text_handler))
        .route(Endpoint::SummarizePdf.path(), post(summarize_pdf_handler))
        .route(Endpoint::SummarizeYoutube.path(), post(summarize_youtube_handler))
        .route(Endpoint::Health.path(), get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(svc)
}
