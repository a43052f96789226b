// Shared fixtures for the integration tests: a scripted provider, recipe payloads, and
// helpers to drive the router in-process or over a real socket.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sous_chef::api_connection::endpoints::GenerateContentRequest;
use sous_chef::api_connection::endpoints::GenerateContentResponse;
use sous_chef::api_connection::{ApiConnectionError, GenerativeProvider};
use sous_chef::chef::Chef;
use sous_chef::request_builder::RequestBuilder;
use sous_chef::server::build_router;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const MAX_IMAGE_BYTES: usize = 64 * 1024;
pub const MAX_BODY_BYTES: usize = 128 * 1024;
pub const STUB_FAILURE: &str = "stub exploded: quota exceeded for project kitchen-42";
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUg==";

type Script = dyn Fn(&str, &GenerateContentRequest) -> Result<GenerateContentResponse, ApiConnectionError>
    + Send
    + Sync;

/// Provider double that answers from a script and records every call.
pub struct StubProvider {
    script: Box<Script>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, GenerateContentRequest)>>,
}

impl StubProvider {
    pub fn scripted(
        script: impl Fn(&str, &GenerateContentRequest) -> Result<GenerateContentResponse, ApiConnectionError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(response: GenerateContentResponse) -> Arc<Self> {
        Self::scripted(move |_, _| Ok(response.clone()))
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::replying(text_response(text))
    }

    pub fn failing() -> Arc<Self> {
        Self::scripted(|_, _| {
            Err(ApiConnectionError::ApiError {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                error_body: STUB_FAILURE.to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<(String, GenerateContentRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for StubProvider {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        (self.script)(model, request)
    }
}

pub fn text_response(text: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
    .unwrap()
}

pub fn image_response(mime_type: &str, data: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{ "content": { "role": "model", "parts": [
            { "text": "Here is the plated dish." },
            { "inlineData": { "mimeType": mime_type, "data": data } }
        ] } }]
    }))
    .unwrap()
}

pub fn recipe_json(name: &str, difficulty: &str) -> Value {
    json!({
        "name": name,
        "description": "Silken egg under a veil of slow-cooked onion",
        "cookingTime": "45 minutes",
        "difficulty": difficulty,
        "calories": "410 kcal",
        "ingredients": ["egg", "onion", "brown butter"],
        "missingIngredients": ["brown butter"],
        "instructions": ["Confit the onion.", "Poach the egg at 63°C.", "Assemble."],
        "platingTip": "Keep the plate two-thirds empty."
    })
}

pub fn three_recipes(difficulty: &str) -> String {
    json!({
        "recipes": [
            recipe_json("Onion Veil", difficulty),
            recipe_json("Egg Lantern", difficulty),
            recipe_json("Allium Nocturne", difficulty),
        ]
    })
    .to_string()
}

pub fn chef_with(provider: Arc<StubProvider>) -> Chef {
    Chef::new(provider, RequestBuilder::default(), MAX_IMAGE_BYTES)
}

pub fn app_with(provider: Arc<StubProvider>) -> Router {
    build_router(chef_with(provider), MAX_BODY_BYTES)
}

/// Sends one request through the router without opening a socket.
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Serves `app` on an ephemeral local port for the lifetime of the test runtime.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}
