//! News headlines from operator-configured RSS/Atom feeds

mod rss;

use std::cmp::Reverse;
use std::fmt::Write;
use std::sync::OnceLock;

use async_trait::async_trait;
use futures_util::future::join_all;
use jiff::Zoned;
use parley_config::NewsConfig;
use parley_llm::ToolDescriptor;
use parley_settings::{FeedCatalog, FeedSource, SettingsStore, ToolSettings};
use regex::Regex;
use reqwest::Client;
use serde_json::json;

pub use self::rss::{FeedItem, parse_feed};
use crate::Tool;
use crate::args::{Arguments, count_arg, string_arg};
use crate::error::ToolError;

const DEFAULT_TOPIC: &str = "world";
const DEFAULT_MAX_ARTICLES: usize = 10;
const DESCRIPTION_LIMIT: usize = 300;

/// A feed item tagged with the feed it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Plain text, tags stripped and shortened
    pub description: String,
    pub source: String,
    pub published: Option<Zoned>,
}

/// Fetches and merges feeds
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
}

impl NewsClient {
    pub fn new(config: &NewsConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build news client: {e}"))?;

        Ok(Self { client })
    }

    /// Newest `max_articles` across all feeds
    ///
    /// A feed that fails is skipped; only when every feed fails is the
    /// whole fetch an error.
    pub async fn fetch(&self, feeds: &[FeedSource], max_articles: usize) -> Result<Vec<Article>, ToolError> {
        let results = join_all(feeds.iter().map(|feed| self.fetch_feed(feed))).await;

        let mut articles = Vec::new();
        let mut failures = Vec::new();

        for (feed, result) in feeds.iter().zip(results) {
            match result {
                Ok(items) => articles.extend(items),
                Err(e) => {
                    tracing::warn!(feed = %feed.name, url = %feed.url, error = %e, "feed fetch failed");
                    failures.push(format!("{}: {e}", feed.name));
                }
            }
        }

        if !feeds.is_empty() && failures.len() == feeds.len() {
            return Err(ToolError::UpstreamFailure(format!(
                "failed to fetch news: {}",
                failures.join("; ")
            )));
        }

        articles.sort_by_key(|article| Reverse(article.published.as_ref().map(Zoned::timestamp)));
        articles.truncate(max_articles);

        Ok(articles)
    }

    async fn fetch_feed(&self, feed: &FeedSource) -> Result<Vec<Article>, ToolError> {
        let response = self
            .client
            .get(feed.url.clone())
            .send()
            .await
            .map_err(|e| ToolError::UpstreamFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::UpstreamFailure(format!("feed returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::UpstreamFailure(e.to_string()))?;

        let items = parse_feed(&body).map_err(ToolError::UpstreamFailure)?;

        Ok(items
            .into_iter()
            .map(|item| Article {
                description: clean_description(&item.description),
                title: item.title,
                link: item.link,
                source: feed.name.clone(),
                published: item.published,
            })
            .collect())
    }
}

fn markup() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| Regex::new(r"<[^>]*>").expect("must be valid regex"))
}

/// Strip HTML and squeeze whitespace, shortening long text
fn clean_description(raw: &str) -> String {
    let text = markup()
        .replace_all(raw, " ")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text;
    }

    let mut short: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    short.truncate(short.trim_end().len());
    short.push_str("...");
    short
}

/// `get_news` tool
pub struct NewsTool {
    client: NewsClient,
    settings: SettingsStore,
}

impl NewsTool {
    pub const fn new(client: NewsClient, settings: SettingsStore) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> &'static str {
        "get_news"
    }

    fn is_enabled(&self, settings: &ToolSettings) -> bool {
        settings.enable_feeds
    }

    fn descriptor(&self, feeds: &FeedCatalog) -> ToolDescriptor {
        let topics = feeds.topics().join(", ");

        let (description, topic_description) = if feeds.is_empty() {
            (
                "Get latest news articles. No feeds are currently configured.".to_owned(),
                "News topic (no feeds configured - add feeds in settings)".to_owned(),
            )
        } else {
            (
                format!(
                    "Get latest news articles. Available topics: {topics}. \
                     Call this tool once per topic if you need multiple categories."
                ),
                format!("Must be one of: {topics}. Use the exact topic name as shown."),
            )
        };

        ToolDescriptor {
            name: self.name().to_owned(),
            description,
            parameters: json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": topic_description
                    },
                    "max_articles": {
                        "type": "integer",
                        "description": "Maximum number of articles to return (default 10)"
                    }
                },
                "required": ["topic"]
            }),
        }
    }

    async fn call(&self, args: &Arguments) -> Result<String, ToolError> {
        let requested = string_arg(args, "topic").unwrap_or(DEFAULT_TOPIC);
        let max_articles = count_arg(args, "max_articles", DEFAULT_MAX_ARTICLES)?;

        let catalog = self.settings.feeds().await;
        if catalog.is_empty() {
            return Err(ToolError::invalid("topic", "no news feeds are configured"));
        }

        let Some((topic, feeds)) = catalog.feeds(requested) else {
            return Err(ToolError::invalid(
                "topic",
                format!(
                    "unknown topic '{requested}', available topics: {}",
                    catalog.topics().join(", ")
                ),
            ));
        };

        let articles = self.client.fetch(feeds, max_articles).await?;

        Ok(format_articles(topic, &articles))
    }
}

fn format_articles(topic: &str, articles: &[Article]) -> String {
    let mut out = format!("Latest {topic} news:\n\n");

    if articles.is_empty() {
        out.push_str("No articles found.\n");
    }

    for (i, article) in articles.iter().enumerate() {
        let published = article
            .published
            .as_ref()
            .map_or_else(|| "unknown".to_owned(), |date| date.strftime("%b %-d, %Y %-I:%M %p").to_string());

        let _ = write!(
            out,
            "{}. **{}**\n   Source: {}\n   Published: {published}\n",
            i + 1,
            article.title,
            article.source
        );
        if !article.description.is_empty() {
            let _ = writeln!(out, "   {}", article.description);
        }
        let _ = write!(out, "   Read more: {}\n\n", article.link);
    }

    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_config::SettingsConfig;
    use serde_json::Value;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn rss(items: &[(&str, &str)]) -> String {
        let items: String = items
            .iter()
            .map(|(title, date)| {
                format!(
                    "<item><title>{title}</title><link>https://news.example/{title}</link>\
                     <description>&lt;p&gt;About {title}&lt;/p&gt;</description>\
                     <pubDate>{date}</pubDate></item>"
                )
            })
            .collect();
        format!("<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>t</title>{items}</channel></rss>")
    }

    async fn mount_feed(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml"))
            .mount(server)
            .await;
    }

    fn source(server: &MockServer, name: &str, route: &str) -> FeedSource {
        FeedSource {
            name: name.to_owned(),
            url: Url::parse(&format!("{}{route}", server.uri())).unwrap(),
        }
    }

    async fn tool(dir: &tempfile::TempDir, catalog: FeedCatalog) -> NewsTool {
        let settings = SettingsStore::open(&SettingsConfig {
            directory: dir.path().to_path_buf(),
        })
        .await
        .unwrap();
        settings.set_feeds(catalog).await.unwrap();

        let client = NewsClient::new(&NewsConfig {
            request_timeout: Duration::from_secs(2),
        })
        .unwrap();

        NewsTool::new(client, settings)
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn merges_feeds_newest_first() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/a",
            rss(&[("Older", "Mon, 13 Oct 2025 08:00:00 +0000"), ("Newest", "Tue, 14 Oct 2025 21:05:00 +0000")]),
        )
        .await;
        mount_feed(&server, "/b", rss(&[("Middle", "Tue, 14 Oct 2025 09:30:00 +0000")])).await;

        let dir = tempfile::tempdir().unwrap();
        let catalog =
            FeedCatalog::default().with_topic("tech", vec![source(&server, "A", "/a"), source(&server, "B", "/b")]);
        let tool = tool(&dir, catalog).await;

        let output = tool
            .call(&args(json!({"topic": "Tech", "max_articles": 2})))
            .await
            .unwrap();

        assert_eq!(
            output,
            "Latest tech news:\n\n\
             1. **Newest**\n   Source: A\n   Published: Oct 14, 2025 9:05 PM\n   About Newest\n   \
             Read more: https://news.example/Newest\n\n\
             2. **Middle**\n   Source: B\n   Published: Oct 14, 2025 9:30 AM\n   About Middle\n   \
             Read more: https://news.example/Middle\n\n"
        );
    }

    #[tokio::test]
    async fn failing_feed_is_skipped() {
        let server = MockServer::start().await;
        mount_feed(&server, "/ok", rss(&[("Story", "Tue, 14 Oct 2025 09:30:00 +0000")])).await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let catalog = FeedCatalog::default().with_topic(
            "world",
            vec![source(&server, "Down", "/down"), source(&server, "Up", "/ok")],
        );
        let tool = tool(&dir, catalog).await;

        let output = tool.call(&args(json!({}))).await.unwrap();

        assert!(output.starts_with("Latest world news:"));
        assert!(output.contains("**Story**"));
    }

    #[tokio::test]
    async fn every_feed_failing_is_upstream_failure() {
        // Nothing mounted, so the feed answers 404
        let server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let catalog = FeedCatalog::default().with_topic("world", vec![source(&server, "Junk", "/junk")]);
        let tool = tool(&dir, catalog).await;

        let err = tool.call(&args(json!({"topic": "world"}))).await.unwrap_err();

        assert!(matches!(err, ToolError::UpstreamFailure(message) if message.contains("Junk")));
    }

    #[tokio::test]
    async fn unknown_topic_lists_available_ones() {
        let dir = tempfile::tempdir().unwrap();
        let feed = FeedSource {
            name: "Wire".to_owned(),
            url: Url::parse("https://wire.example/rss").unwrap(),
        };
        let catalog = FeedCatalog::default()
            .with_topic("business", vec![feed.clone()])
            .with_topic("world", vec![feed]);
        let tool = tool(&dir, catalog).await;

        let err = tool.call(&args(json!({"topic": "sports"}))).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid topic: unknown topic 'sports', available topics: business, world"
        );
    }

    #[tokio::test]
    async fn descriptor_names_topics() {
        let dir = tempfile::tempdir().unwrap();
        let tool = tool(&dir, FeedCatalog::default()).await;

        let empty = tool.descriptor(&FeedCatalog::default());
        assert!(empty.description.contains("No feeds are currently configured"));

        let feed = FeedSource {
            name: "Wire".to_owned(),
            url: Url::parse("https://wire.example/rss").unwrap(),
        };
        let catalog = FeedCatalog::default()
            .with_topic("world", vec![feed.clone()])
            .with_topic("business", vec![feed]);
        let described = tool.descriptor(&catalog);
        assert!(described.description.contains("Available topics: business, world."));
        assert_eq!(
            described.parameters["properties"]["topic"]["description"],
            "Must be one of: business, world. Use the exact topic name as shown."
        );
    }

    #[test]
    fn descriptions_are_plain_and_bounded() {
        assert_eq!(clean_description("<p>Hello&nbsp;<b>world</b></p>\n\n"), "Hello world");

        let long = "word ".repeat(200);
        let cleaned = clean_description(&long);
        assert!(cleaned.ends_with("..."));
        assert!(cleaned.chars().count() <= DESCRIPTION_LIMIT + 3);
    }
}
