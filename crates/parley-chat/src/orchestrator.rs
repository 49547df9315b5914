//! Multi-round conversation driver
//!
//! A conversation alternates between generating with the inference backend
//! and executing the tool calls the model asked for, until the model stops
//! on its own, something fails, or the conversation is interrupted.
//!
//! Every wait is raced against three interruption sources: the
//! cancellation token (server shutdown), the conversation deadline, and the
//! client going away. Whatever happens, exactly one terminal [`ChatEvent`]
//! is sent to the relay.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use indexmap::IndexMap;
use parley_llm::{CompletionReason, CompletionRequest, Message, ResponseEvent, Transport};
use parley_telemetry::KeyValue;
use parley_telemetry::metrics::{ChatMetrics, record_duration};
use parley_tools::ToolExecutor;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::accumulator::{ToolCallAccumulator, ToolCallRecord};
use crate::relay::{ChatEvent, RelaySender};
use crate::request::ConversationRequest;

/// How a conversation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationOutcome {
    Done(CompletionReason),
    Failed(String),
    Cancelled,
}

impl ConversationOutcome {
    const fn label(&self) -> &'static str {
        match self {
            Self::Done(_) => "done",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    fn to_event(&self) -> ChatEvent {
        match self {
            Self::Done(reason) => ChatEvent::Done(*reason),
            Self::Failed(message) => ChatEvent::Failed(message.clone()),
            Self::Cancelled => ChatEvent::Cancelled,
        }
    }
}

/// Raised when any interruption source fires
struct Interrupted;

/// Interruption sources for one conversation
struct Session<'a> {
    relay: &'a RelaySender,
    cancel: &'a CancellationToken,
    deadline: Instant,
}

impl Session<'_> {
    /// Non-blocking check; timers may not have fired yet for a past deadline
    fn is_interrupted(&self) -> bool {
        self.cancel.is_cancelled() || self.relay.is_closed() || Instant::now() >= self.deadline
    }

    async fn interrupted(&self) {
        tokio::select! {
            () = self.cancel.cancelled() => tracing::debug!("conversation cancelled"),
            () = tokio::time::sleep_until(self.deadline) => tracing::debug!("conversation deadline reached"),
            () = self.relay.closed() => tracing::debug!("client disconnected"),
        }
    }

    /// Run `future` unless the conversation is interrupted first
    async fn guard<F: Future>(&self, future: F) -> Result<F::Output, Interrupted> {
        if self.is_interrupted() {
            return Err(Interrupted);
        }

        tokio::select! {
            biased;
            () = self.interrupted() => Err(Interrupted),
            output = future => Ok(output),
        }
    }

    async fn forward(&self, event: ChatEvent) -> Result<(), Interrupted> {
        self.guard(self.relay.send(event)).await?.map_err(|_| Interrupted)
    }
}

/// Drives conversations against a transport and a tool executor
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    tools: Arc<dyn ToolExecutor>,
    max_rounds: u32,
    metrics: ChatMetrics,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>, tools: Arc<dyn ToolExecutor>, max_rounds: u32) -> Self {
        Self {
            transport,
            tools,
            max_rounds,
            metrics: ChatMetrics::new(),
        }
    }

    /// Run a conversation to its end, streaming events into `relay`
    ///
    /// The relay receives every content and tool-call delta as it arrives,
    /// followed by exactly one terminal event.
    pub async fn run(
        &self,
        request: ConversationRequest,
        relay: RelaySender,
        cancel: CancellationToken,
        deadline: Instant,
    ) -> ConversationOutcome {
        let start = std::time::Instant::now();
        let model = request.model.clone();

        let session = Session {
            relay: &relay,
            cancel: &cancel,
            deadline,
        };

        let outcome = self
            .converse(request, &session)
            .await
            .unwrap_or(ConversationOutcome::Cancelled);

        if !relay.finish(outcome.to_event()) {
            tracing::debug!(%model, "client gone before terminal event");
        }

        let attributes = [
            KeyValue::new("model", model.clone()),
            KeyValue::new("outcome", outcome.label()),
        ];
        self.metrics.conversations.add(1, &attributes);
        record_duration(&self.metrics.conversation_duration, start, &attributes);

        match &outcome {
            ConversationOutcome::Failed(error) => tracing::warn!(%model, %error, "conversation failed"),
            other => tracing::info!(
                %model,
                outcome = other.label(),
                elapsed_ms = start.elapsed().as_millis(),
                "conversation finished"
            ),
        }

        outcome
    }

    async fn converse(
        &self,
        request: ConversationRequest,
        session: &Session<'_>,
    ) -> Result<ConversationOutcome, Interrupted> {
        let ConversationRequest {
            model,
            messages: mut history,
            tools: offer_tools,
            ..
        } = request;

        let start = std::time::Instant::now();
        let mut first_token = true;

        for round in 1..=self.max_rounds {
            self.metrics.rounds.add(1, &[KeyValue::new("model", model.clone())]);

            let tools = if offer_tools {
                session.guard(self.tools.list_enabled_tools()).await?
            } else {
                Vec::new()
            };

            tracing::debug!(round, tools = tools.len(), messages = history.len(), "starting round");

            let completion = CompletionRequest {
                model: model.clone(),
                messages: history.clone(),
                tools,
            };

            let mut events = match session.guard(self.transport.open(completion)).await? {
                Ok(events) => events,
                Err(e) => return Ok(ConversationOutcome::Failed(e.to_string())),
            };

            let mut content = String::new();
            let mut calls = ToolCallAccumulator::new();

            let reason = loop {
                match session.guard(events.recv()).await? {
                    Some(ResponseEvent::ContentDelta(text)) => {
                        if first_token {
                            first_token = false;
                            record_duration(
                                &self.metrics.time_to_first_token,
                                start,
                                &[KeyValue::new("model", model.clone())],
                            );
                        }
                        content.push_str(&text);
                        session.forward(ChatEvent::Content(text)).await?;
                    }
                    Some(ResponseEvent::ToolCallDelta(delta)) => {
                        calls.push(delta.clone());
                        session.forward(ChatEvent::ToolCall(delta)).await?;
                    }
                    Some(ResponseEvent::Completion(reason)) => break reason,
                    Some(ResponseEvent::Error(message)) => return Ok(ConversationOutcome::Failed(message)),
                    None => {
                        return Ok(ConversationOutcome::Failed(
                            "inference stream closed without completing".to_owned(),
                        ));
                    }
                }
            };

            if reason != CompletionReason::ToolCalls {
                return Ok(ConversationOutcome::Done(reason));
            }

            let records = calls.finish();
            if records.is_empty() {
                tracing::debug!(round, "tool_calls completion without usable calls");
                return Ok(ConversationOutcome::Done(reason));
            }

            if round == self.max_rounds {
                tracing::warn!(round, calls = records.len(), "tool round limit reached, calls not executed");
                break;
            }

            let tool_calls = records.values().cloned().map(ToolCallRecord::into_tool_call).collect();
            history.push(Message::assistant_with_tools(content, tool_calls));

            let results = session.guard(self.execute_all(&records)).await?;
            history.extend(results);
        }

        Ok(ConversationOutcome::Failed(format!(
            "maximum tool rounds ({}) exceeded",
            self.max_rounds
        )))
    }

    /// Execute every call concurrently; results keep the records' order
    async fn execute_all(&self, records: &IndexMap<String, ToolCallRecord>) -> Vec<Message> {
        tracing::info!(
            calls = records.len(),
            tools = ?records.values().map(|r| r.function_name.as_str()).collect::<Vec<_>>(),
            "executing tool calls"
        );

        let executions = records.values().map(|record| async move {
            let output = match self.tools.execute(&record.function_name, &record.arguments).await {
                Ok(output) => output,
                Err(e) => format!("Error executing tool {}: {e}", record.function_name),
            };
            Message::tool_result(record.call_id.clone(), output)
        });

        join_all(executions).await
    }
}
