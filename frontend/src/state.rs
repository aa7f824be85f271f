use bareminimum_shared::session::TRANSCRIPT_STORAGE_KEY;
use bareminimum_shared::validation::{
    validate_page_range, validate_pdf, validate_text, validate_youtube_url,
};
use bareminimum_shared::{ChatSession, SummarizeOptions, SummarizeSession, ValidationError};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, SummarizeInput};
use crate::storage;

const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored preference, else the system color scheme.
    fn load() -> Self {
        match storage::read(THEME_STORAGE_KEY).as_deref() {
            Some("dark") => Theme::Dark,
            Some("light") => Theme::Light,
            _ if storage::prefers_dark() => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chat,
    Summarize,
}

/// Shared application state, provided via Leptos context.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub chat: ReadSignal<ChatSession>,
    pub summarize: ReadSignal<SummarizeSession>,
    pub theme: ReadSignal<Theme>,
    pub view: ReadSignal<View>,

    // --- Write signals (for mutating state) ---
    pub set_chat: WriteSignal<ChatSession>,
    pub set_summarize: WriteSignal<SummarizeSession>,
    pub set_theme: WriteSignal<Theme>,
    pub set_view: WriteSignal<View>,
}

impl AppState {
    /// Create a new `AppState` from persisted preferences and provide it in
    /// the current Leptos context.
    pub fn provide() -> Self {
        let restored = ChatSession::restore(storage::read(TRANSCRIPT_STORAGE_KEY).as_deref());
        if restored.discard_stored {
            log::warn!("Discarding unreadable chat transcript from storage");
            storage::remove(TRANSCRIPT_STORAGE_KEY);
        }

        let (chat, set_chat) = signal(restored.session);
        let (summarize, set_summarize) = signal(SummarizeSession::default());
        let (theme, set_theme) = signal(Theme::load());
        let (view, set_view) = signal(View::Chat);

        let state = Self {
            chat,
            summarize,
            theme,
            view,
            set_chat,
            set_summarize,
            set_theme,
            set_view,
        };

        // Keep the stored transcript in step with the session.
        Effect::new(move |_| {
            chat.with(|session| match session.to_storage() {
                Some(serialized) => storage::write(TRANSCRIPT_STORAGE_KEY, &serialized),
                None => storage::remove(TRANSCRIPT_STORAGE_KEY),
            })
        });

        Effect::new(move |_| apply_theme(theme.get()));

        provide_context(state);
        state
    }

    /// Send a chat message. Validation failures leave the transcript as is.
    pub fn send_message(&self, text: String) -> Result<(), ValidationError> {
        let token = self
            .set_chat
            .try_update(|session| session.begin_turn(&text))
            .unwrap_or_else(|| Err(ValidationError::new("message", "Chat is unavailable.")))?;

        let set_chat = self.set_chat;
        spawn_local(async move {
            let outcome = api::send_chat(&text).await;
            if let Err(e) = &outcome {
                log::error!("Chat request failed: {e}");
            }
            set_chat.update(|session| {
                if !session.settle_turn(token, outcome) {
                    log::debug!("Dropping superseded chat response");
                }
            });
        });
        Ok(())
    }

    pub fn clear_chat(&self) {
        self.set_chat.update(ChatSession::clear);
    }

    /// Validate and submit a summarize request. A newer submission
    /// supersedes any request still in flight.
    pub fn submit_summary(
        &self,
        input: SummarizeInput,
        options: SummarizeOptions,
    ) -> Result<(), ValidationError> {
        match &input {
            SummarizeInput::Text(text) => validate_text(text)?,
            SummarizeInput::Pdf { file, page_range } => {
                let content_type = file.type_();
                validate_pdf(Some(content_type.as_str()), file.size() as usize)?;
                validate_page_range(page_range)?;
            }
            SummarizeInput::Youtube { video_url, .. } => validate_youtube_url(video_url)?,
        }

        let source = input.source_type();
        let Some(token) = self.set_summarize.try_update(|session| session.begin(source)) else {
            return Ok(());
        };

        let set_summarize = self.set_summarize;
        spawn_local(async move {
            let outcome = api::summarize(input, &options).await;
            if let Err(e) = &outcome {
                log::error!("Summarize request for {source} failed: {e}");
            }
            set_summarize.update(|session| {
                if !session.settle(token, outcome) {
                    log::debug!("Dropping superseded {source} response");
                }
                if let (Some(error), Some(raw)) = (session.error(), session.raw_response()) {
                    log::warn!("{error} Payload: {raw}");
                }
            });
        });
        Ok(())
    }

    pub fn clear_summary(&self) {
        self.set_summarize.update(SummarizeSession::clear);
    }

    pub fn toggle_theme(&self) {
        let next = self.theme.get_untracked().toggled();
        storage::write(THEME_STORAGE_KEY, next.as_str());
        self.set_theme.set(next);
    }
}

fn apply_theme(theme: Theme) {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    if let Some(root) = root {
        if let Err(e) = root.set_attribute("data-theme", theme.as_str()) {
            log::warn!("Failed to apply theme: {e:?}");
        }
    }
}
