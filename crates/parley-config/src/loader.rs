use std::path::Path;

use url::Url;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot
    /// be resolved, the TOML is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus the file access
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_chat()?;
        self.validate_urls()?;

        if self.tools.timeout.is_zero() {
            anyhow::bail!("tools.timeout must be greater than zero");
        }

        Ok(())
    }

    fn validate_chat(&self) -> anyhow::Result<()> {
        if self.chat.timeout.is_zero() {
            anyhow::bail!("chat.timeout must be greater than zero");
        }

        if self.chat.max_rounds == 0 {
            anyhow::bail!("chat.max_rounds must be at least 1");
        }

        if self.chat.channel_capacity == 0 {
            anyhow::bail!("chat.channel_capacity must be at least 1");
        }

        Ok(())
    }

    fn validate_urls(&self) -> anyhow::Result<()> {
        let urls: [(&str, &Url); 3] = [
            ("llm.base_url", &self.llm.base_url),
            ("tools.search.url", &self.tools.search.url),
            ("tools.portfolio.url", &self.tools.portfolio.url),
        ];

        for (field, url) in urls {
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("{field} must use http or https, got '{}'", url.scheme());
            }
        }

        Ok(())
    }
}
