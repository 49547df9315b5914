use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::HeaderValue;
use http::header::HeaderName;
use parley_llm::ModelInfo;
use parley_settings::{ChatTimeoutSettings, FeedCatalog, ToolSettings};
use serde::Serialize;
use tokio::time::Instant;
use tracing::Instrument;

use crate::error::ChatError;
use crate::relay::{self, event_stream};
use crate::request::{ConversationRequest, parse_json};
use crate::state::ChatState;

/// Routes for conversations, model listing and runtime settings
pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/api/chat", routing::post(chat))
        .route("/api/models", routing::get(list_models))
        .route("/api/settings/tools", routing::get(get_tool_settings).put(put_tool_settings))
        .route(
            "/api/settings/chat-timeout",
            routing::get(get_chat_timeout).put(put_chat_timeout),
        )
        .route("/api/settings/feeds", routing::get(get_feeds).put(put_feeds))
        .with_state(state)
}

/// Handle `POST /api/chat`
///
/// Validation failures are answered with a plain JSON error. Once the
/// request is accepted the conversation runs on its own task and the
/// response is an event stream that ends with exactly one terminal frame.
async fn chat(State(state): State<ChatState>, body: Bytes) -> Response {
    let request = match ConversationRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let default_timeout = state.default_timeout();
    let timeout = state.settings().chat_timeout().await.effective(default_timeout);
    let now = Instant::now();
    let deadline = now
        .checked_add(timeout)
        .unwrap_or_else(|| now + default_timeout);

    let (sender, events) = relay::channel(state.channel_capacity());
    let cancel = state.conversation_token();
    let orchestrator = state.orchestrator();
    let model = request.model.clone();

    let span = tracing::info_span!(
        "conversation",
        model = %request.model,
        messages = request.messages.len(),
        tools = request.tools,
        timeout_secs = timeout.as_secs(),
    );

    tokio::spawn(
        async move {
            orchestrator.run(request, sender, cancel, deadline).await;
        }
        .instrument(span),
    );

    let stream = Sse::new(event_stream(model, events)).keep_alive(KeepAlive::default());

    (
        [(HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no"))],
        stream,
    )
        .into_response()
}

#[derive(Serialize)]
struct ModelList {
    models: Vec<ModelInfo>,
}

/// Handle `GET /api/models`
async fn list_models(State(state): State<ChatState>) -> Result<Json<ModelList>, ChatError> {
    let models = state.transport().list_models().await.inspect_err(|e| {
        tracing::warn!(error = %e, "model listing failed");
    })?;

    Ok(Json(ModelList { models }))
}

async fn get_tool_settings(State(state): State<ChatState>) -> Json<ToolSettings> {
    Json(state.settings().tool_settings().await)
}

async fn put_tool_settings(State(state): State<ChatState>, body: Bytes) -> Result<Json<ToolSettings>, ChatError> {
    let settings: ToolSettings = parse_json(&body)?;
    state.settings().set_tool_settings(settings).await?;

    Ok(Json(settings))
}

/// Stored override alongside the deadline that will actually apply
#[derive(Debug, Serialize)]
struct ChatTimeoutView {
    timeout_seconds: u64,
    effective_seconds: u64,
}

impl ChatTimeoutView {
    fn new(settings: ChatTimeoutSettings, state: &ChatState) -> Self {
        Self {
            timeout_seconds: settings.timeout_seconds,
            effective_seconds: settings.effective(state.default_timeout()).as_secs(),
        }
    }
}

async fn get_chat_timeout(State(state): State<ChatState>) -> Json<ChatTimeoutView> {
    let settings = state.settings().chat_timeout().await;
    Json(ChatTimeoutView::new(settings, &state))
}

async fn put_chat_timeout(State(state): State<ChatState>, body: Bytes) -> Result<Json<ChatTimeoutView>, ChatError> {
    let settings: ChatTimeoutSettings = parse_json(&body)?;
    state.settings().set_chat_timeout(settings).await?;

    Ok(Json(ChatTimeoutView::new(settings, &state)))
}

async fn get_feeds(State(state): State<ChatState>) -> Json<FeedCatalog> {
    Json(state.settings().feeds().await)
}

async fn put_feeds(State(state): State<ChatState>, body: Bytes) -> Result<Json<FeedCatalog>, ChatError> {
    let catalog: FeedCatalog = parse_json(&body)?;
    state.settings().set_feeds(catalog.clone()).await?;

    Ok(Json(catalog))
}
