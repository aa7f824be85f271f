//! Canonical result shapes, response normalization, form validation and the
//! browser-side session state machines.
//!
//! Everything here is pure so the proxy server and the wasm client run the
//! exact same rules.

pub mod formatting;
pub mod models;
pub mod normalize;
pub mod request;
pub mod session;
pub mod validation;

pub use models::{
    ChatMessage, ChatReply, Quiz, QuizQuestion, Role, Section, SourceInfo, SourceType, Summary,
    SummarizeResult,
};
pub use normalize::{normalize, normalize_chat, normalize_summarize, NormalizeError, Normalized, Route};
pub use request::{OutputType, SummarizeOptions, SummaryLength, SummaryStyle, WireChoice};
pub use session::{ChatSession, Phase, RequestToken, SummarizeSession};
pub use validation::ValidationError;
