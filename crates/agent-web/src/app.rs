//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::ChatPage;

/// Root application component. The server falls back to `index.html` for
/// every path, so unknown routes land here too.
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p class="notice notice-warning">"Nothing here. "<a href="/">"Back to the agent"</a></p> }>
                    <Route path=path!("/") view=ChatPage />
                </Routes>
            </main>
        </Router>
    }
}
