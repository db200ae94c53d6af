use crate::config::Settings;
use crate::domain::reading::{Component, HistoryEntry, SentimentReading, SentimentSource};
use crate::fetch::{FetchError, SentimentFetcher, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_GRAPHDATA_URL: &str =
    "https://production.dataviz.cnn.io/index/fearandgreed/graphdata";

// The seven component indicators, in the order the dashboard shows them.
pub(crate) const INDICATORS: [(&str, &str); 7] = [
    ("market_momentum_sp500", "S&P 500 Momentum"),
    ("stock_price_strength", "Stock Price Strength"),
    ("stock_price_breadth", "Stock Price Breadth"),
    ("put_call_options", "Put/Call Options"),
    ("market_volatility_vix", "Market Volatility (VIX)"),
    ("junk_bond_demand", "Junk Bond Demand"),
    ("safe_haven_demand", "Safe Haven Demand"),
];

#[derive(Debug, Clone)]
pub struct CnnFearGreedClient {
    http: reqwest::Client,
    url: String,
}

impl CnnFearGreedClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let url = settings
            .cnn_graphdata_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GRAPHDATA_URL.to_string());

        let timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build CNN http client")?;

        Ok(Self { http, url })
    }

    async fn fetch_graphdata(&self) -> Result<GraphData, FetchError> {
        let source = SentimentSource::CnnFearGreed;

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::network(source, format!("graphdata request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            FetchError::network(source, format!("failed to read graphdata response: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::network(source, format!("graphdata HTTP {status}")));
        }

        parse_graphdata(&text)
    }

    /// Daily index history as published alongside the headline value.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryBar>, FetchError> {
        let data = self.fetch_graphdata().await?;
        Ok(history_bars(&data))
    }
}

#[async_trait::async_trait]
impl SentimentFetcher for CnnFearGreedClient {
    fn source(&self) -> SentimentSource {
        SentimentSource::CnnFearGreed
    }

    async fn fetch_latest(&self) -> Result<SentimentReading, FetchError> {
        let data = self.fetch_graphdata().await?;
        Ok(reading_from_graphdata(&data, Utc::now()))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GraphData {
    fear_and_greed: FearGreedSummary,
    #[serde(default)]
    market_momentum_sp500: Option<IndicatorDetail>,
    #[serde(default)]
    stock_price_strength: Option<IndicatorDetail>,
    #[serde(default)]
    stock_price_breadth: Option<IndicatorDetail>,
    #[serde(default)]
    put_call_options: Option<IndicatorDetail>,
    #[serde(default)]
    market_volatility_vix: Option<IndicatorDetail>,
    #[serde(default)]
    junk_bond_demand: Option<IndicatorDetail>,
    #[serde(default)]
    safe_haven_demand: Option<IndicatorDetail>,
    #[serde(default)]
    fear_and_greed_historical: Option<HistoricalSeries>,
}

impl GraphData {
    fn indicator(&self, key: &str) -> Option<&IndicatorDetail> {
        match key {
            "market_momentum_sp500" => self.market_momentum_sp500.as_ref(),
            "stock_price_strength" => self.stock_price_strength.as_ref(),
            "stock_price_breadth" => self.stock_price_breadth.as_ref(),
            "put_call_options" => self.put_call_options.as_ref(),
            "market_volatility_vix" => self.market_volatility_vix.as_ref(),
            "junk_bond_demand" => self.junk_bond_demand.as_ref(),
            "safe_haven_demand" => self.safe_haven_demand.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FearGreedSummary {
    score: f64,
    #[serde(default)]
    previous_close: f64,
    #[serde(default)]
    previous_1_week: f64,
    #[serde(default)]
    previous_1_month: f64,
    #[serde(default)]
    previous_1_year: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct IndicatorDetail {
    score: f64,
    #[serde(default)]
    rating: String,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoricalSeries {
    #[serde(default)]
    data: Vec<HistoryPointRaw>,
}

// Points come as {x: epoch millis, y: score}.
#[derive(Debug, Clone, Deserialize)]
struct HistoryPointRaw {
    x: f64,
    y: f64,
    #[serde(default)]
    rating: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBar {
    pub date: DateTime<Utc>,
    pub score: f64,
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub window: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl HistoryStats {
    /// Summarize the trailing `window` bars. None when there is nothing to
    /// summarize.
    pub fn from_recent(bars: &[HistoryBar], window: usize) -> Option<Self> {
        if bars.is_empty() || window == 0 {
            return None;
        }

        let start = bars.len().saturating_sub(window);
        let recent = &bars[start..];

        let mut min = recent[0].score;
        let mut max = recent[0].score;
        let mut sum = 0.0;
        for bar in recent {
            sum += bar.score;
            min = min.min(bar.score);
            max = max.max(bar.score);
        }

        Some(Self {
            window: recent.len(),
            mean: sum / recent.len() as f64,
            max,
            min,
        })
    }
}

fn parse_graphdata(text: &str) -> Result<GraphData, FetchError> {
    serde_json::from_str::<GraphData>(text).map_err(|e| {
        FetchError::parse(
            SentimentSource::CnnFearGreed,
            format!("graphdata JSON did not match the expected shape: {e}"),
        )
    })
}

fn reading_from_graphdata(data: &GraphData, fetched_at: DateTime<Utc>) -> SentimentReading {
    let summary = &data.fear_and_greed;

    let mut components = Vec::with_capacity(INDICATORS.len());
    for (key, display_name) in INDICATORS {
        if let Some(detail) = data.indicator(key) {
            components.push(Component {
                name: display_name.to_string(),
                value: detail.score,
                rating: non_empty(&detail.rating),
            });
        }
    }

    let history = vec![
        HistoryEntry {
            label: "Previous close".to_string(),
            value: summary.previous_close,
        },
        HistoryEntry {
            label: "1 week ago".to_string(),
            value: summary.previous_1_week,
        },
        HistoryEntry {
            label: "1 month ago".to_string(),
            value: summary.previous_1_month,
        },
        HistoryEntry {
            label: "1 year ago".to_string(),
            value: summary.previous_1_year,
        },
    ];

    SentimentReading::new(SentimentSource::CnnFearGreed, summary.score, fetched_at)
        .with_components(components)
        .with_history(history)
}

fn history_bars(data: &GraphData) -> Vec<HistoryBar> {
    let Some(series) = &data.fear_and_greed_historical else {
        return Vec::new();
    };

    series
        .data
        .iter()
        .filter_map(|p| {
            let date = Utc.timestamp_millis_opt(p.x as i64).single()?;
            Some(HistoryBar {
                date,
                score: p.y,
                rating: p.rating.clone(),
            })
        })
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
