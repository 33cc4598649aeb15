//! UI Components

use leptos::prelude::*;

/// Severity of a [`Notice`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    const fn class(self) -> &'static str {
        match self {
            Self::Info => "notice notice-info",
            Self::Warning => "notice notice-warning",
            Self::Error => "notice notice-error",
        }
    }
}

/// One-line status message
#[component]
pub fn Notice(kind: NoticeKind, message: &'static str) -> impl IntoView {
    view! { <div class=kind.class() role="status">{message}</div> }
}

/// The agent's answer, line breaks preserved
#[component]
pub fn ResponsePanel(text: String) -> impl IntoView {
    view! {
        <section class="response">
            <h3>"Agent Response"</h3>
            <div class="response-body">{text}</div>
        </section>
    }
}
