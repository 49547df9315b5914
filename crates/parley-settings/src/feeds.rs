use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SettingsError;

/// News feeds grouped by topic
///
/// Persisted as `{"<topic>": [{"name": ..., "url": ...}]}`. Topics are
/// kept sorted so the list offered to the model is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedCatalog {
    topics: BTreeMap<String, Vec<FeedSource>>,
}

/// A single RSS or Atom feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    /// Display name, reported as the article source
    pub name: String,
    pub url: Url,
}

impl FeedCatalog {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Topic names in sorted order
    pub fn topics(&self) -> Vec<&str> {
        self.topics.keys().map(String::as_str).collect()
    }

    /// Feeds for a topic, matched case-insensitively
    ///
    /// Returns the canonical topic name alongside its feeds.
    pub fn feeds(&self, topic: &str) -> Option<(&str, &[FeedSource])> {
        self.topics
            .get_key_value(topic)
            .or_else(|| self.topics.iter().find(|(name, _)| name.eq_ignore_ascii_case(topic)))
            .map(|(name, feeds)| (name.as_str(), feeds.as_slice()))
    }

    /// Add or replace the feeds for a topic
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>, feeds: Vec<FeedSource>) -> Self {
        self.topics.insert(topic.into(), feeds);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SettingsError> {
        for (topic, feeds) in &self.topics {
            if topic.trim().is_empty() {
                return Err(SettingsError::Invalid("feed topic must not be empty".to_owned()));
            }

            if feeds.is_empty() {
                return Err(SettingsError::Invalid(format!("topic '{topic}' has no feeds")));
            }

            for feed in feeds {
                if feed.name.trim().is_empty() {
                    return Err(SettingsError::Invalid(format!("a feed in topic '{topic}' has no name")));
                }

                if !matches!(feed.url.scheme(), "http" | "https") {
                    return Err(SettingsError::Invalid(format!(
                        "feed '{}' must use http or https",
                        feed.name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(name: &str, url: &str) -> FeedSource {
        FeedSource {
            name: name.to_owned(),
            url: Url::parse(url).unwrap(),
        }
    }

    #[test]
    fn topics_are_sorted() {
        let catalog = FeedCatalog::default()
            .with_topic("world", vec![feed("BBC", "https://feeds.bbci.co.uk/news/world/rss.xml")])
            .with_topic("technology", vec![feed("Ars", "https://feeds.arstechnica.com/arstechnica/index")]);

        assert_eq!(catalog.topics(), vec!["technology", "world"]);
    }

    #[test]
    fn lookup_ignores_case() {
        let catalog = FeedCatalog::default().with_topic("world", vec![feed("BBC", "https://bbc.example/rss")]);

        let (name, feeds) = catalog.feeds("World").unwrap();
        assert_eq!(name, "world");
        assert_eq!(feeds.len(), 1);
        assert!(catalog.feeds("sports").is_none());
    }

    #[test]
    fn deserializes_from_topic_map() {
        let catalog: FeedCatalog =
            serde_json::from_str(r#"{"science": [{"name": "Nature", "url": "https://nature.example/rss"}]}"#).unwrap();

        assert_eq!(catalog.topics(), vec!["science"]);
    }

    #[test]
    fn rejects_non_http_feed() {
        let catalog = FeedCatalog::default().with_topic("local", vec![feed("Disk", "file:///tmp/feed.xml")]);
        assert!(matches!(catalog.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn rejects_topic_without_feeds() {
        let catalog = FeedCatalog::default().with_topic("empty", Vec::new());
        assert!(matches!(catalog.validate(), Err(SettingsError::Invalid(_))));
    }
}
