#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("No usable count found on {url}")]
    NoSignal { url: String },

    #[error("No candidate url for {identifier:?}")]
    NoCandidates { identifier: String },

    #[error("Metric value {0} out of range")]
    ValueOutOfRange(String),

    #[error("Invalid config: {0}")]
    ConfigError(String),

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("JSON error")]
    JsonError(#[from] serde_json::Error),
}
