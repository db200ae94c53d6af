pub mod domain;
pub mod fetch;
pub mod present;

pub mod config {
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub cnn_graphdata_url: Option<String>,
        pub naaim_index_url: Option<String>,
        pub refresh_interval_secs: Option<u64>,
    }

    pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                cnn_graphdata_url: std::env::var("CNN_GRAPHDATA_URL").ok(),
                naaim_index_url: std::env::var("NAAIM_INDEX_URL").ok(),
                refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok()),
            })
        }

        pub fn refresh_interval_secs(&self) -> u64 {
            self.refresh_interval_secs
                .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS)
        }
    }
}
