use std::time::Duration;

use serde::Deserialize;

/// Limits applied to every streamed conversation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChatConfig {
    /// Deadline for a whole conversation, unless overridden at runtime
    #[serde(with = "crate::duration")]
    pub timeout: Duration,
    /// Maximum number of inference rounds per conversation
    pub max_rounds: u32,
    /// Capacity of the channel between the inference stream and the orchestrator
    pub channel_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            // Generous default for slow local hardware
            timeout: Duration::from_secs(24 * 60 * 60),
            max_rounds: 8,
            channel_capacity: 16,
        }
    }
}
