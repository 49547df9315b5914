//! Metric names and instruments for conversations and tools

use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter};

pub const CHAT_CONVERSATION_COUNT: &str = "chat.conversation.count";
pub const CHAT_CONVERSATION_DURATION: &str = "chat.conversation.duration";
pub const CHAT_ROUND_COUNT: &str = "chat.round.count";
pub const CHAT_TIME_TO_FIRST_TOKEN: &str = "chat.time_to_first_token";
pub const TOOL_CALL_COUNT: &str = "tool.call.count";
pub const TOOL_CALL_DURATION: &str = "tool.call.duration";

/// Meter shared by every Parley instrument
///
/// Falls back to a no-op meter until [`crate::init`] installs a provider.
pub fn meter() -> Meter {
    global::meter("parley")
}

/// Record seconds elapsed since `start` on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}

/// Instruments recorded by the conversation orchestrator
#[derive(Clone)]
pub struct ChatMetrics {
    pub conversations: Counter<u64>,
    pub conversation_duration: Histogram<f64>,
    pub rounds: Counter<u64>,
    pub time_to_first_token: Histogram<f64>,
}

impl ChatMetrics {
    pub fn new() -> Self {
        let meter = meter();
        Self {
            conversations: meter.u64_counter(CHAT_CONVERSATION_COUNT).build(),
            conversation_duration: meter
                .f64_histogram(CHAT_CONVERSATION_DURATION)
                .with_unit("s")
                .build(),
            rounds: meter.u64_counter(CHAT_ROUND_COUNT).build(),
            time_to_first_token: meter.f64_histogram(CHAT_TIME_TO_FIRST_TOKEN).with_unit("s").build(),
        }
    }
}

impl Default for ChatMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Instruments recorded by the tool executor
#[derive(Clone)]
pub struct ToolMetrics {
    pub calls: Counter<u64>,
    pub duration: Histogram<f64>,
}

impl ToolMetrics {
    pub fn new() -> Self {
        let meter = meter();
        Self {
            calls: meter.u64_counter(TOOL_CALL_COUNT).build(),
            duration: meter.f64_histogram(TOOL_CALL_DURATION).with_unit("s").build(),
        }
    }
}

impl Default for ToolMetrics {
    fn default() -> Self {
        Self::new()
    }
}
