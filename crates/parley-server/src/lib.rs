//! HTTP server assembly for Parley

mod cors;
mod health;

use std::net::SocketAddr;

use axum::Router;
use parley_chat::ChatState;
use parley_config::Config;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    /// Cancelled on shutdown so open event streams can finish
    conversations: CancellationToken,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the settings store cannot be loaded or an
    /// outbound HTTP client cannot be built
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let conversations = CancellationToken::new();
        let chat_state = ChatState::from_config(&config, conversations.clone()).await?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(parley_chat::chat_router(chat_state));

        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
            conversations,
        })
    }

    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. Conversations still
    /// streaming at that point are cancelled and end with a terminal frame.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        let conversations = self.conversations;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
                conversations.cancel();
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn config(settings_dir: &std::path::Path, extra: &str) -> Config {
        let raw = format!("[settings]\ndirectory = \"{}\"\n{extra}", settings_dir.display());
        Config::parse(&raw).unwrap()
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::new(config(dir.path(), "")).await.unwrap();

        let response = server
            .into_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_route_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::new(config(dir.path(), "[server.health]\nenabled = false\n"))
            .await
            .unwrap();

        let response = server
            .into_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn default_listen_address() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::new(config(dir.path(), "")).await.unwrap();

        assert_eq!(server.listen_address(), SocketAddr::from(([0, 0, 0, 0], 3000)));
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let dir = tempfile::tempdir().unwrap();
        let server = Server::new(config(
            dir.path(),
            "[server.cors]\norigins = [\"http://localhost:5173\"]\n",
        ))
        .await
        .unwrap();

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = server.into_router().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:5173"
        );
    }
}
