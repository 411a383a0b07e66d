use crate::{ScrapeError, ScraperConfig};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

#[async_trait::async_trait]
pub trait PageFetcher {
    /// Single GET attempt. Non-success statuses are errors.
    async fn get_page(&self, url: &str) -> Result<String, ScrapeError>;
}

/// `reqwest` fetcher with a fixed identification header and a per-request
/// timeout. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<HttpFetcher, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_page(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Visit {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
