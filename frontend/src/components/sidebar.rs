use leptos::prelude::*;

use crate::state::{AppState, Theme, View};

/// Sidebar with navigation between the chat and summarize views and the
/// theme toggle.
#[component]
pub fn Sidebar() -> impl IntoView {
    let state = expect_context::<AppState>();

    let nav_item = move |view: View, label: &'static str| {
        view! {
            <div
                class="nav-item"
                class:active=move || state.view.get() == view
                on:click=move |_| state.set_view.set(view)
            >
                {label}
            </div>
        }
    };

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Bare Minimum"</h2>
            </div>
            <nav class="nav-list">
                {nav_item(View::Chat, "Chat")}
                {nav_item(View::Summarize, "Summarize")}
            </nav>
            <div class="sidebar-footer">
                <button class="theme-toggle" on:click=move |_| state.toggle_theme()>
                    {move || match state.theme.get() {
                        Theme::Light => "Dark mode",
                        Theme::Dark => "Light mode",
                    }}
                </button>
            </div>
        </aside>
    }
}
