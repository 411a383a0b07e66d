use artist_metrics_scraper::{
    refresh_metrics, today, ArtistHandles, FollowerScraper, MetricStore, Platform, ScraperConfig,
    FOLLOWERS_METRIC,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about = "Scrape public follower counts and keep a daily history")]
struct Cli {
    /// JSON file with scraper settings
    #[arg(long, env = "SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured User-Agent
    #[arg(long, env = "SCRAPER_USER_AGENT")]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SCRAPER_TIMEOUT")]
    timeout: Option<u64>,

    #[arg(long, env = "METRICS_DB", default_value = "metrics.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the follower count of one profile
    Fetch {
        #[arg(value_enum)]
        platform: Platform,
        identifier: String,
    },
    /// Scrape every registered handle and store today's counts
    Refresh {
        /// Date to store the counts under (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Register the social handles of an artist
    SetHandle {
        #[arg(long)]
        artist_id: i64,
        #[arg(long)]
        instagram: Option<String>,
        #[arg(long)]
        facebook: Option<String>,
    },
    /// Print the stored daily values of an artist as JSON
    History {
        #[arg(long)]
        artist_id: i64,
        #[arg(long, default_value = FOLLOWERS_METRIC)]
        metric: String,
        #[arg(long, value_enum)]
        platform: Option<Platform>,
    },
}

#[derive(serde::Serialize)]
struct Point {
    date: String,
    value: u64,
}

async fn load_config(cli: &Cli) -> Result<ScraperConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ScraperConfig::from_file(path).await?,
        None => ScraperConfig::default(),
    };
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    debug!("{:?}", config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;

    match cli.command {
        Command::Fetch {
            platform,
            identifier,
        } => {
            let scraper = FollowerScraper::new(&config)?;
            match scraper.fetch_followers(platform, &identifier).await {
                Some(count) => println!("{}", count),
                None => println!("no result"),
            }
        }
        Command::Refresh { date, concurrency } => {
            let store = MetricStore::open(&cli.db).await?;
            let scraper = FollowerScraper::new(&config)?;
            let summary = refresh_metrics(
                &scraper,
                &store,
                date.unwrap_or_else(today),
                concurrency.unwrap_or(config.concurrency),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::SetHandle {
            artist_id,
            instagram,
            facebook,
        } => {
            let store = MetricStore::open(&cli.db).await?;
            store
                .set_handles(&ArtistHandles {
                    artist_id,
                    instagram,
                    facebook,
                })
                .await?;
        }
        Command::History {
            artist_id,
            metric,
            platform,
        } => {
            let store = MetricStore::open(&cli.db).await?;
            let points: Vec<Point> = store
                .time_series(artist_id, &metric, platform)
                .await?
                .into_iter()
                .map(|(date, value)| Point {
                    date: date.format("%Y-%m-%d").to_string(),
                    value,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
    }

    Ok(())
}
