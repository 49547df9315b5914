//! Test server wrapper that starts Parley on a random port

use std::net::SocketAddr;

use parley_server::Server;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::config::ConfigBuilder;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    _settings_dir: TempDir,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(builder: ConfigBuilder) -> anyhow::Result<Self> {
        let (config, settings_dir) = builder.build();
        let server = Server::new(config).await?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            _settings_dir: settings_dir,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Post a conversation and return the raw event-stream body
    pub async fn chat(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/chat"))
            .json(body)
            .send()
            .await
            .expect("chat request sent")
    }

    /// Replace the stored tool enablement
    pub async fn enable_tools(&self, web_search: bool, feeds: bool, portfolio: bool) {
        let response = self
            .client
            .put(self.url("/api/settings/tools"))
            .json(&serde_json::json!({
                "enable_web_search": web_search,
                "enable_feeds": feeds,
                "enable_portfolio": portfolio,
            }))
            .send()
            .await
            .expect("settings request sent");

        assert!(response.status().is_success());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
