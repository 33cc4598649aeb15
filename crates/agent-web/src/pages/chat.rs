//! Chat Page

use leptos::logging;
use leptos::prelude::*;

use crate::api::{self, ChatRequest};
use crate::components::{Notice, NoticeKind, ResponsePanel};
use crate::presets::{self, ROLE_PRESETS};

const EMPTY_QUERY: &str = "Please enter a query before asking the agent.";
const BACKEND_ERROR: &str = "Error communicating with backend. Please check the logs.";

/// What the page shows under the form
#[derive(Clone, Debug, PartialEq, Eq)]
enum Outcome {
    Idle,
    Thinking,
    EmptyQuery,
    Answer(String),
    Failed,
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let (role, set_role) = signal(ROLE_PRESETS[0].name.to_string());
    let (system_prompt, set_system_prompt) = signal(ROLE_PRESETS[0].prompt.to_string());
    let (models, set_models) = signal(
        api::FALLBACK_MODELS
            .iter()
            .map(|m| (*m).to_string())
            .collect::<Vec<_>>(),
    );
    let (model, set_model) = signal(api::FALLBACK_MODELS[0].to_string());
    let (allow_search, set_allow_search) = signal(false);
    let (query, set_query) = signal(String::new());
    let (outcome, set_outcome) = signal(Outcome::Idle);

    leptos::task::spawn_local(async move {
        match api::fetch_models().await {
            Ok(list) if !list.is_empty() => {
                if !list.contains(&model.get_untracked()) {
                    set_model.set(list[0].clone());
                }
                set_models.set(list);
            }
            Ok(_) => logging::warn!("Backend returned an empty model list"),
            Err(e) => logging::warn!("Could not load models, using defaults: {e}"),
        }
    });

    let on_role = move |ev: leptos::ev::Event| {
        let name = event_target_value(&ev);
        set_system_prompt.set(presets::prompt_for(&name).to_string());
        set_role.set(name);
    };

    let ask = move |_| {
        if outcome.get_untracked() == Outcome::Thinking {
            return;
        }

        let Some(request) = ChatRequest::single_turn(
            &model.get_untracked(),
            &system_prompt.get_untracked(),
            &query.get_untracked(),
            allow_search.get_untracked(),
        ) else {
            set_outcome.set(Outcome::EmptyQuery);
            return;
        };

        set_outcome.set(Outcome::Thinking);
        logging::log!("Sending request to backend");

        leptos::task::spawn_local(async move {
            match api::send_chat(&request).await {
                Ok(text) => {
                    logging::log!("Successfully received response from backend");
                    set_outcome.set(Outcome::Answer(text));
                }
                Err(e) => {
                    logging::error!("Error communicating with backend: {e}");
                    set_outcome.set(Outcome::Failed);
                }
            }
        });
    };

    view! {
        <div class="chat">
            <aside class="sidebar">
                <h2>"Agent Configuration"</h2>
                <div class="field">
                    <label for="role">"Select agent role:"</label>
                    <select id="role" on:change=on_role prop:value=move || role.get()>
                        {ROLE_PRESETS
                            .iter()
                            .map(|p| view! { <option value=p.name>{p.name}</option> })
                            .collect_view()}
                    </select>
                </div>
                <div class="field">
                    <label for="model">"Select your AI model:"</label>
                    <select
                        id="model"
                        on:change=move |ev| set_model.set(event_target_value(&ev))
                        prop:value=move || model.get()
                    >
                        <For
                            each=move || models.get()
                            key=Clone::clone
                            children=move |m| { let value = m.clone(); view! { <option value=value>{m}</option> } }
                        />
                    </select>
                </div>
                <div class="field inline">
                    <input
                        id="search"
                        type="checkbox"
                        prop:checked=move || allow_search.get()
                        on:change=move |ev| set_allow_search.set(event_target_checked(&ev))
                    />
                    <label for="search">"Allow web search"</label>
                </div>
                <p class="hint">"You can edit the system prompt in the main panel."</p>
            </aside>

            <section class="chat-main">
                <h1>"Multi AI Agent"</h1>
                <div class="field">
                    <label for="prompt">"System prompt (agent instructions):"</label>
                    <textarea
                        id="prompt"
                        rows="5"
                        prop:value=move || system_prompt.get()
                        on:input=move |ev| set_system_prompt.set(event_target_value(&ev))
                    />
                </div>
                <div class="field">
                    <label for="query">"Enter your query:"</label>
                    <textarea
                        id="query"
                        rows="7"
                        prop:value=move || query.get()
                        on:input=move |ev| set_query.set(event_target_value(&ev))
                    />
                </div>
                <button on:click=ask disabled=move || outcome.get() == Outcome::Thinking>
                    "Ask Agent"
                </button>

                {move || match outcome.get() {
                    Outcome::Idle => ().into_any(),
                    Outcome::Thinking => {
                        view! { <Notice kind=NoticeKind::Info message="Thinking..." /> }.into_any()
                    }
                    Outcome::EmptyQuery => {
                        view! { <Notice kind=NoticeKind::Warning message=EMPTY_QUERY /> }.into_any()
                    }
                    Outcome::Answer(text) => view! { <ResponsePanel text=text /> }.into_any(),
                    Outcome::Failed => {
                        view! { <Notice kind=NoticeKind::Error message=BACKEND_ERROR /> }.into_any()
                    }
                }}
            </section>
        </div>
    }
}
