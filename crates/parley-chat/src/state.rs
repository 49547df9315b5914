use std::sync::Arc;
use std::time::Duration;

use parley_config::{ChatConfig, Config};
use parley_llm::{OpenAiTransport, Transport};
use parley_settings::SettingsStore;
use parley_tools::{ToolExecutor, ToolRegistry};
use tokio_util::sync::CancellationToken;

use crate::orchestrator::Orchestrator;

/// Shared state behind the chat and settings routes
#[derive(Clone)]
pub struct ChatState {
    inner: Arc<ChatStateInner>,
}

struct ChatStateInner {
    orchestrator: Arc<Orchestrator>,
    transport: Arc<dyn Transport>,
    settings: SettingsStore,
    default_timeout: Duration,
    channel_capacity: usize,
    /// Parent of every conversation's cancellation token
    conversations: CancellationToken,
}

impl ChatState {
    /// Wire the OpenAI-compatible transport, tool registry and settings store
    ///
    /// Cancelling `conversations` interrupts every conversation in flight.
    pub async fn from_config(config: &Config, conversations: CancellationToken) -> anyhow::Result<Self> {
        let settings = SettingsStore::open(&config.settings).await?;
        let transport = OpenAiTransport::new(&config.llm, config.chat.channel_capacity)?;
        let tools = ToolRegistry::from_config(&config.tools, settings.clone())?;

        tracing::debug!(
            backend = %config.llm.base_url,
            max_rounds = config.chat.max_rounds,
            "chat state initialized"
        );

        Ok(Self::new(
            Arc::new(transport),
            Arc::new(tools),
            settings,
            &config.chat,
            conversations,
        ))
    }

    pub fn new(
        transport: Arc<dyn Transport>,
        tools: Arc<dyn ToolExecutor>,
        settings: SettingsStore,
        chat: &ChatConfig,
        conversations: CancellationToken,
    ) -> Self {
        let orchestrator = Orchestrator::new(Arc::clone(&transport), tools, chat.max_rounds);

        Self {
            inner: Arc::new(ChatStateInner {
                orchestrator: Arc::new(orchestrator),
                transport,
                settings,
                default_timeout: chat.timeout,
                channel_capacity: chat.channel_capacity,
                conversations,
            }),
        }
    }

    pub(crate) fn orchestrator(&self) -> Arc<Orchestrator> {
        Arc::clone(&self.inner.orchestrator)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.inner.settings
    }

    /// Deadline applied when no runtime override is stored
    pub fn default_timeout(&self) -> Duration {
        self.inner.default_timeout
    }

    pub(crate) fn channel_capacity(&self) -> usize {
        self.inner.channel_capacity
    }

    pub(crate) fn conversation_token(&self) -> CancellationToken {
        self.inner.conversations.child_token()
    }
}
