use crate::domain::reading::{SentimentReading, SentimentSource};
use std::fmt;

pub mod cnn;
pub mod demo;
pub mod naaim;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Both upstreams reject default library user agents.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Parse,
}

#[derive(Debug, Clone)]
pub struct FetchError {
    pub source: SentimentSource,
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn network(source: SentimentSource, detail: impl Into<String>) -> Self {
        Self {
            source,
            kind: FetchErrorKind::Network,
            detail: detail.into(),
        }
    }

    pub fn parse(source: SentimentSource, detail: impl Into<String>) -> Self {
        Self {
            source,
            kind: FetchErrorKind::Parse,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetch error (source={}, kind={:?}): {}",
            self.source.slug(),
            self.kind,
            self.detail
        )
    }
}

impl std::error::Error for FetchError {}

#[async_trait::async_trait]
pub trait SentimentFetcher: Send + Sync {
    fn source(&self) -> SentimentSource;

    async fn fetch_latest(&self) -> Result<SentimentReading, FetchError>;
}

/// The fetch-or-fallback decision: one live attempt per cycle, and on any
/// FetchError the caller gets the flagged demo reading instead. Never fails.
pub async fn latest_or_demo(client: &dyn SentimentFetcher) -> SentimentReading {
    match client.fetch_latest().await {
        Ok(reading) => reading,
        Err(err) => {
            tracing::warn!(
                source = client.source().slug(),
                kind = ?err.kind,
                error = %err,
                "live fetch failed; serving demo reading"
            );
            demo::demo_reading(client.source(), chrono::Utc::now())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails(SentimentSource, FetchErrorKind);

    #[async_trait::async_trait]
    impl SentimentFetcher for AlwaysFails {
        fn source(&self) -> SentimentSource {
            self.0
        }

        async fn fetch_latest(&self) -> Result<SentimentReading, FetchError> {
            Err(FetchError {
                source: self.0,
                kind: self.1,
                detail: "boom".to_string(),
            })
        }
    }

    struct AlwaysSucceeds(SentimentSource, f64);

    #[async_trait::async_trait]
    impl SentimentFetcher for AlwaysSucceeds {
        fn source(&self) -> SentimentSource {
            self.0
        }

        async fn fetch_latest(&self) -> Result<SentimentReading, FetchError> {
            Ok(SentimentReading::new(self.0, self.1, chrono::Utc::now()))
        }
    }

    #[tokio::test]
    async fn failure_of_any_kind_falls_back_to_demo() {
        for kind in [FetchErrorKind::Network, FetchErrorKind::Parse] {
            for source in [SentimentSource::CnnFearGreed, SentimentSource::Naaim] {
                let reading = latest_or_demo(&AlwaysFails(source, kind)).await;
                assert!(reading.is_demo);
                assert_eq!(reading.source, source);
                assert!((0.0..=100.0).contains(&reading.score));
            }
        }
    }

    #[tokio::test]
    async fn success_passes_the_live_reading_through() {
        let reading = latest_or_demo(&AlwaysSucceeds(SentimentSource::CnnFearGreed, 72.0)).await;
        assert!(!reading.is_demo);
        assert_eq!(reading.score, 72.0);
        assert_eq!(reading.label, "Greed");
    }

    #[test]
    fn fetch_error_display_names_source_and_kind() {
        let err = FetchError::parse(SentimentSource::Naaim, "exposure value not found");
        let s = err.to_string();
        assert!(s.contains("naaim"));
        assert!(s.contains("Parse"));
        assert!(s.contains("exposure value not found"));
    }
}
