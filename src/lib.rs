use chrono::NaiveDate;
use futures::{stream, StreamExt};
use scraper::Html;
use std::fmt;
use tracing::{debug, info, warn};

pub mod count;
pub mod facebook;
pub mod instagram;
pub mod metrics;

mod config;
mod data;
mod error;
mod fetcher;
mod utils;

pub use config::ScraperConfig;
pub use data::Table;
pub use error::ScrapeError;
pub use facebook::FacebookExtractor;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use instagram::InstagramExtractor;
pub use metrics::{ArtistHandles, MetricStore};
pub use utils::today;

pub const FOLLOWERS_METRIC: &str = "followers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
}

impl Platform {
    pub fn code(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One extraction routine per platform.
pub trait Extractor {
    fn platform(&self) -> Platform;

    /// Profile urls to try, in priority order.
    fn candidate_urls(&self, identifier: &str) -> Vec<String>;

    /// A usable count from one fetched page, if the page carries one.
    fn extract(&self, doc: &Html) -> Option<u64>;
}

/// Best-effort follower counts for public profiles.
///
/// Holds only immutable settings, so a single instance can serve any number
/// of concurrent calls.
pub struct FollowerScraper<F = HttpFetcher> {
    fetcher: F,
    instagram: InstagramExtractor,
    facebook: FacebookExtractor,
}

impl FollowerScraper<HttpFetcher> {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        Ok(FollowerScraper::with_fetcher(HttpFetcher::new(config)?, config))
    }
}

impl<F: PageFetcher + Send + Sync> FollowerScraper<F> {
    pub fn with_fetcher(fetcher: F, config: &ScraperConfig) -> Self {
        FollowerScraper {
            fetcher,
            instagram: InstagramExtractor {
                base_url: config.instagram_base_url.clone(),
            },
            facebook: FacebookExtractor {
                base_urls: config.facebook_base_urls.clone(),
            },
        }
    }

    /// Follower count for `identifier` on `platform`, or `None`.
    ///
    /// Failures never cross this boundary; their cause is logged.
    pub async fn fetch_followers(&self, platform: Platform, identifier: &str) -> Option<u64> {
        match self.scrape(platform, identifier).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("No {} count for {:?}: {}", platform, identifier.trim(), e);
                None
            }
        }
    }

    /// Like [`fetch_followers`](Self::fetch_followers) but keeps the reason
    /// the last candidate failed.
    #[tracing::instrument(skip(self))]
    pub async fn scrape(&self, platform: Platform, identifier: &str) -> Result<u64, ScrapeError> {
        match platform {
            Platform::Instagram => self.run(&self.instagram, identifier).await,
            Platform::Facebook => self.run(&self.facebook, identifier).await,
        }
    }

    async fn run<E: Extractor + Sync>(
        &self,
        extractor: &E,
        identifier: &str,
    ) -> Result<u64, ScrapeError> {
        let identifier = identifier.trim();
        let mut last_error = ScrapeError::NoCandidates {
            identifier: identifier.to_string(),
        };

        for url in extractor.candidate_urls(identifier) {
            let html = match self.fetcher.get_page(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!("Skip {}: {}", url, e);
                    last_error = e;
                    continue;
                }
            };

            let count = {
                let doc = Html::parse_document(&html);
                extractor.extract(&doc)
            };

            match count {
                Some(count) => {
                    info!("{} {} -> {}", extractor.platform(), url, count);
                    return Ok(count);
                }
                None => {
                    debug!("No usable count on {}", url);
                    last_error = ScrapeError::NoSignal { url };
                }
            }
        }

        Err(last_error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RefreshSummary {
    pub attempted: usize,
    pub stored: usize,
    pub missed: usize,
}

/// Scrape every registered handle and store the counts as `followers`
/// metrics dated `date`. At most `concurrency` requests are in flight.
pub async fn refresh_metrics<F>(
    scraper: &FollowerScraper<F>,
    store: &MetricStore,
    date: NaiveDate,
    concurrency: usize,
) -> Result<RefreshSummary, ScrapeError>
where
    F: PageFetcher + Send + Sync,
{
    let jobs: Vec<(i64, Platform, String)> = store
        .handles()
        .await?
        .into_iter()
        .flat_map(|h| {
            let artist_id = h.artist_id;
            [
                (Platform::Instagram, h.instagram),
                (Platform::Facebook, h.facebook),
            ]
            .into_iter()
            .filter_map(move |(platform, handle)| {
                handle
                    .filter(|handle| !handle.trim().is_empty())
                    .map(|handle| (artist_id, platform, handle))
            })
        })
        .collect();

    info!("Refreshing {} handles for {}", jobs.len(), date);

    let results: Vec<_> = stream::iter(jobs)
        .map(|(artist_id, platform, handle)| async move {
            let count = scraper.fetch_followers(platform, &handle).await;
            (artist_id, platform, handle, count)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = RefreshSummary {
        attempted: results.len(),
        ..Default::default()
    };
    for (artist_id, platform, handle, count) in results {
        match count {
            Some(count) => {
                store
                    .upsert_metric(artist_id, FOLLOWERS_METRIC, platform, date, count)
                    .await?;
                summary.stored += 1;
            }
            None => {
                debug!("[artist {}] no {} count for {}", artist_id, platform, handle);
                summary.missed += 1;
            }
        }
    }

    info!(
        "Refresh done: {} stored, {} missed",
        summary.stored, summary.missed
    );
    Ok(summary)
}
