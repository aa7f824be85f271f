use bareminimum_shared::validation::MAX_MESSAGE_LENGTH;
use bareminimum_shared::{ChatMessage, Role};
use leptos::ev;
use leptos::prelude::*;

use crate::state::AppState;

/// Main chat area with the transcript, suggestions, and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="chat-area">
            <div class="chat-header">
                <span>"Chat"</span>
                <button
                    class="clear-btn"
                    on:click=move |_| state.clear_chat()
                    disabled=move || state.chat.with(|c| c.messages().is_empty())
                >
                    "Clear chat"
                </button>
            </div>

            // Messages
            <div class="messages-container">
                {move || {
                    if state.chat.with(|c| c.messages().is_empty()) {
                        view! {
                            <div class="empty-state">
                                "Send a message to start chatting"
                            </div>
                        }.into_any()
                    } else {
                        view! {
                            <For
                                each=move || {
                                    state.chat.with(|c| {
                                        c.messages().iter().cloned().enumerate().collect::<Vec<_>>()
                                    })
                                }
                                key=|(i, m)| (*i, m.timestamp.clone())
                                let:entry
                            >
                                <MessageBubble message=entry.1 />
                            </For>
                        }.into_any()
                    }
                }}
                {move || {
                    state.chat.with(|c| c.is_loading()).then(|| {
                        view! {
                            <div class="message bot">
                                <div class="role-label">"bot"</div>
                                <div class="typing-indicator">"Thinking…"</div>
                            </div>
                        }
                    })
                }}
            </div>

            <Suggestions />
            <ChatInput />
        </main>
    }
}

/// A single transcript entry.
#[component]
fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let css_class = match message.role {
        Role::User => "message user",
        Role::Bot => "message bot",
        Role::System => "message system",
    };

    view! {
        <div class=css_class>
            <div class="role-label">{message.role.as_str()}</div>
            <div class="message-content">{message.content}</div>
        </div>
    }
}

/// Follow-up prompts offered by the last reply. Clicking one sends it.
#[component]
fn Suggestions() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || {
        let suggestions = state.chat.with(|c| c.suggestions().to_vec());
        (!suggestions.is_empty()).then(|| {
            view! {
                <div class="suggestions">
                    {suggestions
                        .into_iter()
                        .map(|text| {
                            let label = text.clone();
                            view! {
                                <button
                                    class="suggestion-chip"
                                    disabled=move || state.chat.with(|c| c.is_loading())
                                    on:click=move |_| {
                                        if let Err(e) = state.send_message(text.clone()) {
                                            log::warn!("Suggestion rejected: {e}");
                                        }
                                    }
                                >
                                    {label}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            }
        })
    }
}

/// Chat input form with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());
    let (input_error, set_input_error) = signal(None::<String>);

    let is_sending = move || state.chat.with(|c| c.is_loading());

    let send = move || {
        if is_sending() {
            return;
        }
        match state.send_message(input.get_untracked()) {
            Ok(()) => {
                set_input.set(String::new());
                set_input_error.set(None);
            }
            Err(e) => set_input_error.set(Some(e.message)),
        }
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            {move || input_error.get().map(|err| view! { <div class="field-error">{err}</div> })}
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type a message… (Enter to send, Shift+Enter for newline)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    on:click=move |_| send()
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    {move || if is_sending() { "Sending…" } else { "Send" }}
                </button>
            </div>
            <div class="char-count">
                {move || format!("{}/{MAX_MESSAGE_LENGTH}", input.get().chars().count())}
            </div>
        </div>
    }
}
