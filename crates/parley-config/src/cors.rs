use std::time::Duration;

use serde::Deserialize;

/// Cross-origin settings for browser front-ends
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed request headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Headers the browser may read from responses
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard or an explicit list of values
///
/// A list containing `"*"` anywhere collapses to [`AnyOrArray::Any`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OneOrMany")]
pub enum AnyOrArray {
    #[default]
    Any,
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for AnyOrArray {
    fn from(raw: OneOrMany) -> Self {
        let values = match raw {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        };

        if values.iter().any(|v| v == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_string_means_any() {
        let config: CorsConfig = toml::from_str(r#"origins = "*""#).unwrap();
        assert_eq!(config.origins, AnyOrArray::Any);
    }

    #[test]
    fn single_string_becomes_list() {
        let config: CorsConfig = toml::from_str(r#"origins = "http://localhost:5173""#).unwrap();
        assert_eq!(config.origins, AnyOrArray::List(vec!["http://localhost:5173".to_owned()]));
    }

    #[test]
    fn wildcard_inside_list_means_any() {
        let config: CorsConfig = toml::from_str(r#"methods = ["GET", "*"]"#).unwrap();
        assert_eq!(config.methods, AnyOrArray::Any);
    }

    #[test]
    fn omitted_fields_default_to_any() {
        let config: CorsConfig = toml::from_str("max_age = 300").unwrap();
        assert_eq!(config.headers, AnyOrArray::Any);
        assert_eq!(config.max_age_duration(), Some(Duration::from_secs(300)));
    }
}
