//! Mock inference backend for integration tests
//!
//! Speaks the OpenAI-compatible streaming protocol. Each chat request
//! consumes the next scripted reply; once the script runs out every
//! request is answered with a short greeting.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::stream;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// One scripted answer to a chat completion request
#[derive(Debug, Clone)]
pub enum Reply {
    /// Stream these chunks, pausing `delay` before each one, then `[DONE]`
    Stream { chunks: Vec<Value>, delay: Duration },
    /// Answer with an error status and body
    Fail { status: StatusCode, body: String },
}

impl Reply {
    pub fn stream(chunks: Vec<Value>) -> Self {
        Self::Stream {
            chunks,
            delay: Duration::ZERO,
        }
    }

    pub fn slow(chunks: Vec<Value>, delay: Duration) -> Self {
        Self::Stream { chunks, delay }
    }

    /// Content split into one chunk per word, then `stop`
    pub fn text(content: &str) -> Self {
        let mut chunks: Vec<Value> = content.split_inclusive(' ').map(content_chunk).collect();
        chunks.push(finish_chunk("stop"));
        Self::stream(chunks)
    }

    /// A single tool call split into a header and an arguments fragment
    pub fn tool_call(id: &str, name: &str, arguments: &str) -> Self {
        Self::stream(vec![
            tool_call_chunk(0, Some(id), Some(name), ""),
            tool_call_chunk(0, None, None, arguments),
            finish_chunk("tool_calls"),
        ])
    }
}

pub fn content_chunk(text: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]
    })
}

pub fn tool_call_chunk(index: u32, id: Option<&str>, name: Option<&str>, arguments: &str) -> Value {
    let mut call = json!({"index": index, "function": {"arguments": arguments}});
    if let Some(id) = id {
        call["id"] = json!(id);
        call["type"] = json!("function");
    }
    if let Some(name) = name {
        call["function"]["name"] = json!(name);
    }

    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"tool_calls": [call]}, "finish_reason": null}]
    })
}

pub fn finish_chunk(reason: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {}, "finish_reason": reason}]
    })
}

/// Mock backend with a scripted reply queue
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

#[derive(Default)]
struct MockLlmState {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Value>>,
}

impl MockLlm {
    /// Start a backend that always greets
    pub async fn start() -> anyhow::Result<Self> {
        Self::scripted(Vec::new()).await
    }

    /// Start a backend answering requests with `replies` in order
    pub async fn scripted(replies: Vec<Reply>) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/models", routing::get(handle_models))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including `/v1`, as the transport appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Every chat completion body received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(State(state): State<Arc<MockLlmState>>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body);

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::text("Hello from mock LLM"));

    match reply {
        Reply::Fail { status, body } => (status, body).into_response(),
        Reply::Stream { chunks, delay } => {
            let frames = chunks
                .into_iter()
                .map(|chunk| format!("data: {chunk}\n\n"))
                .chain(std::iter::once("data: [DONE]\n\n".to_owned()));

            let body = stream::unfold(frames, move |mut frames| async move {
                let frame = frames.next()?;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Some((Ok::<_, Infallible>(frame), frames))
            });

            Response::builder()
                .header(header::CONTENT_TYPE, "text/event-stream")
                .body(Body::from_stream(body))
                .unwrap()
        }
    }
}

async fn handle_models() -> impl IntoResponse {
    Json(json!({
        "object": "list",
        "data": [
            {"id": "llama3:8b", "object": "model", "owned_by": "mock"},
            {"id": "qwen2.5:7b", "object": "model", "owned_by": "mock"}
        ]
    }))
}
