use std::pin::pin;
use std::time::Instant;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use parley_config::LlmConfig;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use url::Url;

use super::Transport;
use crate::convert::openai::chunk_to_events;
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiModelList, OpenAiRequest, OpenAiStreamChunk};
use crate::types::{CompletionReason, CompletionRequest, ModelInfo, ResponseEvent};

const DONE_SENTINEL: &str = "[DONE]";

/// Client for `/chat/completions` on an OpenAI-compatible server
pub struct OpenAiTransport {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    channel_capacity: usize,
}

impl OpenAiTransport {
    pub fn new(config: &LlmConfig, channel_capacity: usize) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LlmError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            channel_capacity: channel_capacity.max(1),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }
}

#[async_trait]
impl Transport for OpenAiTransport {
    async fn open(&self, request: CompletionRequest) -> Result<mpsc::Receiver<ResponseEvent>, LlmError> {
        if request.model.is_empty() {
            return Err(LlmError::InvalidRequest("model must not be empty".to_owned()));
        }

        let wire = OpenAiRequest::from(&request);
        let builder = self.authorized(self.client.post(self.endpoint("chat/completions"))).json(&wire);

        let (sender, receiver) = mpsc::channel(self.channel_capacity);
        tokio::spawn(pump(builder, sender, request.model));

        Ok(receiver)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .authorized(self.client.get(self.endpoint("models")))
            .send()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to reach inference backend: {e}")))?;

        let response = ensure_success(response).await.map_err(LlmError::Upstream)?;

        let list: OpenAiModelList = response
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to parse model list: {e}")))?;

        Ok(list.into())
    }
}

/// How a stream read ended
enum Outcome {
    /// Send this terminal event, then stop
    Terminal(ResponseEvent),
    /// Receiver is gone
    Abandoned,
}

async fn pump(builder: RequestBuilder, events: mpsc::Sender<ResponseEvent>, model: String) {
    let started = Instant::now();

    // The backend may hold the request before sending headers
    let opened = tokio::select! {
        biased;
        () = events.closed() => Err(Outcome::Abandoned),
        opened = open_stream(builder) => opened,
    };

    let outcome = match opened {
        Err(outcome) => outcome,
        Ok(response) => forward(response.bytes_stream().eventsource(), &events).await,
    };

    match outcome {
        Outcome::Terminal(event) => {
            if let ResponseEvent::Error(message) = &event {
                tracing::warn!(model = %model, error = %message, "inference stream failed");
            } else {
                tracing::debug!(model = %model, elapsed_ms = started.elapsed().as_millis(), "inference stream completed");
            }

            if events.send(event).await.is_err() {
                tracing::debug!(model = %model, "receiver dropped before terminal event");
            }
        }
        Outcome::Abandoned => {
            tracing::debug!(model = %model, "receiver dropped, inference stream abandoned");
        }
    }
}

/// Send the request and check the status line
async fn open_stream(builder: RequestBuilder) -> Result<Response, Outcome> {
    let response = builder
        .send()
        .await
        .map_err(|e| Outcome::Terminal(ResponseEvent::Error(format!("failed to reach inference backend: {e}"))))?;

    ensure_success(response)
        .await
        .map_err(|message| Outcome::Terminal(ResponseEvent::Error(message)))
}

/// Relay parsed frames until a terminal marker, a failure, or the receiver goes away
async fn forward<S, E>(frames: S, events: &mpsc::Sender<ResponseEvent>) -> Outcome
where
    S: Stream<Item = Result<eventsource_stream::Event, E>>,
    E: std::fmt::Display,
{
    let mut frames = pin!(frames);

    loop {
        let frame = tokio::select! {
            () = events.closed() => return Outcome::Abandoned,
            frame = frames.next() => frame,
        };

        let data = match frame {
            None => {
                return Outcome::Terminal(ResponseEvent::Error("stream ended before completion".to_owned()));
            }
            Some(Err(e)) => return Outcome::Terminal(ResponseEvent::Error(format!("stream interrupted: {e}"))),
            Some(Ok(event)) => event.data,
        };

        let data = data.trim();
        if data.is_empty() {
            continue;
        }
        if data == DONE_SENTINEL {
            return Outcome::Terminal(ResponseEvent::Completion(CompletionReason::None));
        }

        let chunk: OpenAiStreamChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => return Outcome::Terminal(ResponseEvent::Error(format!("malformed stream frame: {e}"))),
        };

        for event in chunk_to_events(chunk) {
            if event.is_terminal() {
                return Outcome::Terminal(event);
            }
            if events.send(event).await.is_err() {
                return Outcome::Abandoned;
            }
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(format!("inference backend returned {status}: {}", body.trim()))
}
