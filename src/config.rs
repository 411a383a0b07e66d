use crate::ScrapeError;
use serde::Deserialize;
use std::path::Path;
use tokio::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Immutable scraper settings, shared by every request a scraper makes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub instagram_base_url: String,
    /// Tried in order.
    pub facebook_base_urls: Vec<String>,
    pub concurrency: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            instagram_base_url: "https://www.instagram.com".to_string(),
            facebook_base_urls: vec![
                "https://m.facebook.com".to_string(),
                "https://www.facebook.com".to_string(),
            ],
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScraperConfig {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ScraperConfig, ScrapeError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: ScraperConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.timeout_secs == 0 {
            return Err(ScrapeError::ConfigError(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if self.facebook_base_urls.is_empty() {
            return Err(ScrapeError::ConfigError(
                "facebook_base_urls must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{ "timeout_secs": 3, "user_agent": "curl/8" }"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.user_agent, "curl/8");
        assert_eq!(config.facebook_base_urls.len(), 2);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_validate() {
        assert!(ScraperConfig::default().validate().is_ok());

        let config = ScraperConfig {
            facebook_base_urls: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScrapeError::ConfigError(_))));
    }
}
