//! Client-facing event stream
//!
//! The orchestrator speaks in [`ChatEvent`]s; this module carries them to
//! the response and turns them into the JSON frames written as SSE.
//!
//! A relay has two lanes: a bounded queue for deltas and a single slot for
//! the terminal event. The slot cannot fill up, so a slow client still gets
//! its terminal frame once it has read everything queued ahead of it.

use std::convert::Infallible;

use axum::response::sse::Event;
use futures_util::Stream;
use futures_util::stream;
use parley_llm::{CompletionReason, FunctionCall, Role, ToolCall, ToolCallDelta};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

/// Reported to the client when a conversation is interrupted
pub const CANCELLED_MESSAGE: &str = "context cancelled";

/// Something the client should see, in production order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Content(String),
    ToolCall(ToolCallDelta),
    Done(CompletionReason),
    Failed(String),
    Cancelled,
}

impl ChatEvent {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_) | Self::Cancelled)
    }
}

/// One `data:` frame of the response stream
#[derive(Debug, Serialize)]
pub struct OutboundFrame<'a> {
    pub model: &'a str,
    pub message: OutboundMessage,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutboundMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl OutboundMessage {
    fn assistant(content: String) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls: None,
        }
    }
}

impl<'a> OutboundFrame<'a> {
    pub fn new(model: &'a str, event: ChatEvent) -> Self {
        let mut frame = Self {
            model,
            message: OutboundMessage::assistant(String::new()),
            done: event.is_terminal(),
            done_reason: None,
            error: None,
        };

        match event {
            ChatEvent::Content(text) => frame.message.content = text,
            ChatEvent::ToolCall(delta) => frame.message.tool_calls = Some(vec![partial_call(delta)]),
            ChatEvent::Done(reason) => frame.done_reason = reason.as_str(),
            ChatEvent::Failed(message) => {
                frame.done_reason = CompletionReason::Error.as_str();
                frame.error = Some(message);
            }
            ChatEvent::Cancelled => {
                frame.done_reason = CompletionReason::Cancelled.as_str();
                frame.error = Some(CANCELLED_MESSAGE.to_owned());
            }
        }

        frame
    }
}

fn partial_call(delta: ToolCallDelta) -> ToolCall {
    ToolCall {
        id: delta.call_id,
        tool_type: if delta.tool_type.is_empty() {
            "function".to_owned()
        } else {
            delta.tool_type
        },
        function: FunctionCall {
            name: delta.function_name,
            arguments: delta.arguments_fragment,
        },
    }
}

/// Create a relay queueing up to `capacity` deltas ahead of the client
pub fn channel(capacity: usize) -> (RelaySender, RelayReceiver) {
    let (events, queued) = mpsc::channel(capacity.max(1));
    let (terminal, last) = oneshot::channel();

    (
        RelaySender { events, terminal },
        RelayReceiver {
            events: queued,
            terminal: Some(last),
        },
    )
}

/// Producer half, owned by the conversation
#[derive(Debug)]
pub struct RelaySender {
    events: mpsc::Sender<ChatEvent>,
    terminal: oneshot::Sender<ChatEvent>,
}

impl RelaySender {
    /// Queue a delta, waiting for room; fails once the client is gone
    pub async fn send(&self, event: ChatEvent) -> Result<(), ChatEvent> {
        self.events.send(event).await.map_err(|e| e.0)
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Resolves when the client goes away
    pub async fn closed(&self) {
        self.events.closed().await;
    }

    /// Close the delta queue and hand over the terminal event
    ///
    /// Returns false if the client was already gone.
    pub fn finish(self, event: ChatEvent) -> bool {
        let Self { events, terminal } = self;
        drop(events);
        terminal.send(event).is_ok()
    }
}

/// Consumer half, read by the response stream
#[derive(Debug)]
pub struct RelayReceiver {
    events: mpsc::Receiver<ChatEvent>,
    terminal: Option<oneshot::Receiver<ChatEvent>>,
}

impl RelayReceiver {
    /// Next event in production order; the terminal event always comes last
    pub async fn recv(&mut self) -> Option<ChatEvent> {
        if let Some(event) = self.events.recv().await {
            return Some(event);
        }

        self.terminal.take()?.await.ok()
    }
}

/// Serialize events into SSE frames until the terminal one
pub fn event_stream(model: String, events: RelayReceiver) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(Some(events), move |state| {
        let model = model.clone();
        async move {
            let mut events = state?;
            let event = events.recv().await?;
            let finished = event.is_terminal();

            let (data, finished) = match encode(&model, &OutboundFrame::new(&model, event)) {
                Ok(data) => (data, finished),
                Err(failure) => (failure, true),
            };

            let next = if finished { None } else { Some(events) };
            Some((Ok(Event::default().data(data)), next))
        }
    })
}

/// Serialize one frame
///
/// On failure the error carries a ready-to-send terminal failure frame in
/// place of the one that could not be written.
fn encode<T: Serialize>(model: &str, frame: &T) -> Result<String, String> {
    serde_json::to_string(frame).map_err(|e| {
        tracing::error!(model, error = %e, "failed to encode stream frame");

        serde_json::json!({
            "model": model,
            "message": {"role": "assistant", "content": ""},
            "done": true,
            "done_reason": CompletionReason::Error.as_str(),
            "error": format!("failed to encode stream frame: {e}"),
        })
        .to_string()
    })
}
