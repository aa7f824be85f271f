mod api;
mod components;
mod state;
mod storage;

use leptos::prelude::*;
use leptos::mount::mount_to_body;

use components::chat::ChatArea;
use components::sidebar::Sidebar;
use components::summarize::SummarizePanel;
use state::{AppState, View};

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    view! {
        <div class="app-container">
            <Sidebar />
            {move || match state.view.get() {
                View::Chat => view! { <ChatArea /> }.into_any(),
                View::Summarize => view! { <SummarizePanel /> }.into_any(),
            }}
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
