//! multi-ai-agent Web Frontend
//!
//! Leptos-based WASM frontend: pick a role and a model, ask a question,
//! read the agent's answer.

mod api;
mod app;
mod components;
mod pages;
mod presets;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
