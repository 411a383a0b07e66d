//! Caller-side storage for scraped counts: which handles each artist has, and
//! one dated value per (artist, metric, platform, day).

use crate::{utils, Platform, ScrapeError, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistHandles {
    pub artist_id: i64,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow<'a> {
    pub artist_id: i64,
    pub metric_code: &'a str,
    pub platform: Platform,
    pub metric_date: NaiveDate,
    pub value: i64,
}

pub struct HandleTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for HandleTable {
    type Record<'a> = &'a ArtistHandles;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            "CREATE TABLE {} (
                artist_id INTEGER PRIMARY KEY,
                instagram TEXT,
                facebook TEXT,
                created_at DATETIME
             )",
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn upsert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"INSERT INTO {} (artist_id, instagram, facebook, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(artist_id) DO UPDATE SET
                   instagram = excluded.instagram,
                   facebook = excluded.facebook"#,
            &self.name
        );
        sqlx::query(&query)
            .bind(record.artist_id)
            .bind(record.instagram.as_deref().map(str::trim))
            .bind(record.facebook.as_deref().map(str::trim))
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(())
    }
}

pub struct MetricTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for MetricTable {
    type Record<'a> = MetricRow<'a>;

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"
                CREATE TABLE {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    artist_id INTEGER NOT NULL,
                    metric_code TEXT NOT NULL,
                    platform TEXT NOT NULL,
                    metric_date DATE NOT NULL,
                    value INTEGER NOT NULL,
                    created_at DATETIME,
                    UNIQUE (artist_id, metric_code, platform, metric_date)
                )
            "#,
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn upsert<'a>(&self, record: Self::Record<'a>) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"INSERT INTO {} (artist_id, metric_code, platform, metric_date, value, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(artist_id, metric_code, platform, metric_date)
               DO UPDATE SET value = excluded.value"#,
            &self.name
        );
        sqlx::query(&query)
            .bind(record.artist_id)
            .bind(record.metric_code)
            .bind(record.platform.code())
            .bind(record.metric_date)
            .bind(record.value)
            .bind(utils::get_now())
            .execute(self.get_pool())
            .await?;
        Ok(())
    }
}

pub struct MetricStore {
    pub artists: HandleTable,
    pub metrics: MetricTable,
    pool: SqlitePool,
}

impl MetricStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<MetricStore, ScrapeError> {
        let opt = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        MetricStore::from_pool(pool).await
    }

    /// Single-connection in-memory store; every connection to `:memory:`
    /// would otherwise see its own empty database.
    pub async fn in_memory() -> Result<MetricStore, ScrapeError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        MetricStore::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<MetricStore, ScrapeError> {
        let store = MetricStore {
            artists: HandleTable {
                name: "artist_handles".to_string(),
                pool: pool.clone(),
            },
            metrics: MetricTable {
                name: "artist_metrics".to_string(),
                pool: pool.clone(),
            },
            pool,
        };
        store.artists.ensure().await?;
        store.metrics.ensure().await?;
        Ok(store)
    }

    pub async fn set_handles(&self, handles: &ArtistHandles) -> Result<(), ScrapeError> {
        Ok(self.artists.upsert(handles).await?)
    }

    pub async fn handles(&self) -> Result<Vec<ArtistHandles>, ScrapeError> {
        let query = format!(
            "SELECT artist_id, instagram, facebook FROM {} ORDER BY artist_id",
            self.artists.get_name()
        );
        let mut handles = vec![];
        for row in sqlx::query(&query).fetch_all(&self.pool).await? {
            handles.push(ArtistHandles {
                artist_id: row.try_get("artist_id")?,
                instagram: row.try_get("instagram")?,
                facebook: row.try_get("facebook")?,
            });
        }
        Ok(handles)
    }

    pub async fn upsert_metric(
        &self,
        artist_id: i64,
        metric_code: &str,
        platform: Platform,
        metric_date: NaiveDate,
        value: u64,
    ) -> Result<(), ScrapeError> {
        let stored =
            i64::try_from(value).map_err(|_| ScrapeError::ValueOutOfRange(value.to_string()))?;
        let row = MetricRow {
            artist_id,
            metric_code,
            platform,
            metric_date,
            value: stored,
        };
        Ok(self.metrics.upsert(row).await?)
    }

    /// Daily values for one metric, oldest first. Without a platform the
    /// values of all platforms are summed per day.
    pub async fn time_series(
        &self,
        artist_id: i64,
        metric_code: &str,
        platform: Option<Platform>,
    ) -> Result<Vec<(NaiveDate, u64)>, ScrapeError> {
        let query = format!(
            r#"SELECT metric_date, SUM(value) AS total FROM {}
               WHERE artist_id = ? AND metric_code = ? AND (? IS NULL OR platform = ?)
               GROUP BY metric_date
               ORDER BY metric_date"#,
            self.metrics.get_name()
        );
        let platform = platform.map(|p| p.code());

        let mut series = vec![];
        for row in sqlx::query(&query)
            .bind(artist_id)
            .bind(metric_code)
            .bind(platform)
            .bind(platform)
            .fetch_all(&self.pool)
            .await?
        {
            let total: i64 = row.try_get("total")?;
            let total =
                u64::try_from(total).map_err(|_| ScrapeError::ValueOutOfRange(total.to_string()))?;
            series.push((row.try_get("metric_date")?, total));
        }
        Ok(series)
    }
}
