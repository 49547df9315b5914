use std::future::Future;
use std::time::Duration;

use parley_config::Config;
use parley_tools::ToolError;
use parley_tools::portfolio::PortfolioClient;
use parley_tools::search::SearchClient;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Check the tool backends once at startup
///
/// Unavailable backends are only reported; the matching tools keep
/// failing per call until the backend comes up.
pub async fn probe_backends(config: &Config) -> anyhow::Result<()> {
    let search = SearchClient::new(&config.tools.search)?;
    let portfolio = PortfolioClient::new(&config.tools.portfolio)?;

    tokio::join!(
        report("search", config.tools.search.url.as_str(), search.health()),
        report("portfolio", config.tools.portfolio.url.as_str(), portfolio.health()),
    );

    Ok(())
}

async fn report(backend: &str, url: &str, check: impl Future<Output = Result<(), ToolError>>) {
    match tokio::time::timeout(PROBE_TIMEOUT, check).await {
        Ok(Ok(())) => tracing::info!(backend, url, "backend available"),
        Ok(Err(e)) => tracing::warn!(backend, url, error = %e, "backend unavailable"),
        Err(_) => tracing::warn!(backend, url, timeout_secs = PROBE_TIMEOUT.as_secs(), "backend health check timed out"),
    }
}
