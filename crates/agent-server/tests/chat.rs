//! End-to-end checks of the chat API against a stub invoker

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use agent_runtime::{AgentError, AgentInvoker, Invocation, InvocationError};
use agent_server::{Settings, api_router, state::AppState};

/// What the stub should do when called
enum Behaviour {
    Reply(&'static str),
    Fail,
    Empty,
}

struct SpyInvoker {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last: Mutex<Option<Invocation>>,
}

impl SpyInvoker {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentInvoker for SpyInvoker {
    async fn invoke(&self, invocation: Invocation) -> Result<String, InvocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(invocation);
        match self.behaviour {
            Behaviour::Reply(text) => Ok(text.to_string()),
            Behaviour::Fail => Err(AgentError::Auth("Invalid API Key".into()).into()),
            Behaviour::Empty => Err(InvocationError::EmptyResult),
        }
    }
}

fn app(spy: &Arc<SpyInvoker>) -> Router {
    let settings = Settings::from_lookup(|_| None).unwrap();
    api_router(AppState::new(Arc::new(settings), spy.clone()))
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn chat_body(model: &str) -> Value {
    json!({
        "model_name": model,
        "system_prompt": "You are helpful.",
        "messages": ["What is 2+2?"],
        "allow_search": false,
    })
}

#[tokio::test]
async fn test_valid_request_returns_invoker_text() {
    let spy = SpyInvoker::new(Behaviour::Reply("4"));

    let (status, body) = post_chat(app(&spy), chat_body("llama3-70b-8192")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "4"}));
    assert_eq!(spy.calls(), 1);

    let seen = spy.last.lock().unwrap().clone().unwrap();
    assert_eq!(seen.model_id, "llama3-70b-8192");
    assert_eq!(seen.system_prompt, "You are helpful.");
    assert_eq!(seen.messages, vec!["What is 2+2?"]);
    assert!(!seen.allow_search);
}

#[tokio::test]
async fn test_response_text_is_passed_through_unchanged() {
    let spy = SpyInvoker::new(Behaviour::Reply("  line one\nline two  "));

    let (status, body) = post_chat(app(&spy), chat_body("llama-3.3-70b-versatile")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "  line one\nline two  ");
}

#[tokio::test]
async fn test_unknown_model_is_rejected_without_invoking() {
    let spy = SpyInvoker::new(Behaviour::Reply("never"));

    for model in ["gpt-4", "", "LLAMA3-70B-8192", "llama3-70b-8192 "] {
        let (status, body) = post_chat(app(&spy), chat_body(model)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "model {model:?}");
        assert!(body["detail"].as_str().unwrap().contains("Invalid model name"));
        assert_eq!(body["code"], "INVALID_MODEL");
    }

    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_invoker_failure_becomes_500_with_detail() {
    let spy = SpyInvoker::new(Behaviour::Fail);
    let router = app(&spy);

    let (status, body) = post_chat(router.clone(), chat_body("llama3-70b-8192")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to get AI response"));
    assert!(detail.contains("Invalid API Key"));
    assert_eq!(body["code"], "AGENT_ERROR");

    // Still serving afterwards
    let (status, _) = post_chat(router, chat_body("llama3-70b-8192")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(spy.calls(), 2);
}

#[tokio::test]
async fn test_empty_result_is_a_distinct_500() {
    let spy = SpyInvoker::new(Behaviour::Empty);

    let (status, body) = post_chat(app(&spy), chat_body("llama3-70b-8192")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "EMPTY_RESULT");
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_fields_never_reach_invoker() {
    let spy = SpyInvoker::new(Behaviour::Reply("4"));

    let cases = [
        json!({"model_name": "llama3-70b-8192", "messages": ["hi"], "allow_search": false}),
        json!({"model_name": "llama3-70b-8192", "system_prompt": "", "messages": "hi", "allow_search": false}),
        json!({"model_name": "llama3-70b-8192", "system_prompt": "", "messages": ["hi"], "allow_search": "yes"}),
    ];

    for case in cases {
        let (status, _) = post_chat(app(&spy), case).await;
        assert!(status.is_client_error(), "got {status}");
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_multiple_turns_and_search_flag_forwarded() {
    let spy = SpyInvoker::new(Behaviour::Reply("ok"));
    let body = json!({
        "model_name": "llama-3.3-70b-versatile",
        "system_prompt": "",
        "messages": ["first", "second", "third"],
        "allow_search": true,
    });

    let (status, _) = post_chat(app(&spy), body).await;

    assert_eq!(status, StatusCode::OK);
    let seen = spy.last.lock().unwrap().clone().unwrap();
    assert_eq!(seen.messages, vec!["first", "second", "third"]);
    assert!(seen.allow_search);
}

#[tokio::test]
async fn test_models_endpoint_lists_allow_list() {
    let spy = SpyInvoker::new(Behaviour::Reply("4"));
    let request = Request::builder().uri("/models").body(Body::empty()).unwrap();

    let response = app(&spy).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"models": ["llama3-70b-8192", "llama-3.3-70b-versatile"]}));
}

#[tokio::test]
async fn test_health_reports_missing_keys() {
    let spy = SpyInvoker::new(Behaviour::Reply("4"));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app(&spy).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["groq_configured"], false);
    assert_eq!(body["search_configured"], false);
    assert_eq!(spy.calls(), 0);
}
