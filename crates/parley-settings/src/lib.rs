//! Operator-editable settings for Parley
//!
//! Tool enablement, the chat deadline override and the news feed catalog
//! live in small JSON files that can be changed at runtime through the
//! HTTP API. Each value is read as an atomic snapshot.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod feeds;
mod file;
mod timeout;
mod tools;

use std::sync::Arc;

use parley_config::SettingsConfig;

pub use error::SettingsError;
pub use feeds::{FeedCatalog, FeedSource};
pub use timeout::ChatTimeoutSettings;
pub use tools::ToolSettings;

use crate::file::JsonFile;

/// Shared handle to every runtime setting
///
/// Cheap to clone; all clones observe the same values.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<SettingsStoreInner>,
}

#[derive(Debug)]
struct SettingsStoreInner {
    tools: JsonFile<ToolSettings>,
    chat_timeout: JsonFile<ChatTimeoutSettings>,
    feeds: JsonFile<FeedCatalog>,
}

impl SettingsStore {
    /// Load every settings file from the configured directory
    ///
    /// Missing files start from defaults; malformed files are an error.
    pub async fn open(config: &SettingsConfig) -> Result<Self, SettingsError> {
        let tools = JsonFile::open(config.tool_settings_path()).await?;
        let chat_timeout = JsonFile::open(config.chat_timeout_path()).await?;
        let feeds = JsonFile::open(config.feeds_path()).await?;

        tracing::debug!(directory = %config.directory.display(), "settings loaded");

        Ok(Self {
            inner: Arc::new(SettingsStoreInner {
                tools,
                chat_timeout,
                feeds,
            }),
        })
    }

    pub async fn tool_settings(&self) -> ToolSettings {
        self.inner.tools.get().await
    }

    pub async fn set_tool_settings(&self, settings: ToolSettings) -> Result<(), SettingsError> {
        self.inner.tools.set(settings).await?;
        tracing::info!(
            web_search = settings.enable_web_search,
            feeds = settings.enable_feeds,
            portfolio = settings.enable_portfolio,
            "tool settings updated"
        );
        Ok(())
    }

    pub async fn chat_timeout(&self) -> ChatTimeoutSettings {
        self.inner.chat_timeout.get().await
    }

    pub async fn set_chat_timeout(&self, settings: ChatTimeoutSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.inner.chat_timeout.set(settings).await?;
        tracing::info!(timeout_seconds = settings.timeout_seconds, "chat timeout updated");
        Ok(())
    }

    pub async fn feeds(&self) -> FeedCatalog {
        self.inner.feeds.get().await
    }

    pub async fn set_feeds(&self, catalog: FeedCatalog) -> Result<(), SettingsError> {
        catalog.validate()?;
        let topics = catalog.topics().len();
        self.inner.feeds.set(catalog).await?;
        tracing::info!(topics, "feed catalog updated");
        Ok(())
    }
}
