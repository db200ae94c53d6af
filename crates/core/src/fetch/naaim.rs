use crate::config::Settings;
use crate::domain::reading::{Component, SentimentReading, SentimentSource};
use crate::fetch::{FetchError, SentimentFetcher, DEFAULT_TIMEOUT_SECS, USER_AGENT};
use anyhow::Context;
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;

const DEFAULT_INDEX_URL: &str = "https://naaim.org/programs/naaim-exposure-index/";

// The widget NAAIM renders the weekly number into.
const INDEX_WIDGET_SELECTOR: &str = "div#brxe-ymwzia";

// Exposure can legitimately exceed 100 (leveraged long), up to 200.
const MAX_REPORTED_EXPOSURE: f64 = 200.0;

#[derive(Debug, Clone)]
pub struct NaaimExposureClient {
    http: reqwest::Client,
    url: String,
}

impl NaaimExposureClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let url = settings
            .naaim_index_url
            .clone()
            .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string());

        let timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build NAAIM http client")?;

        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl SentimentFetcher for NaaimExposureClient {
    fn source(&self) -> SentimentSource {
        SentimentSource::Naaim
    }

    async fn fetch_latest(&self) -> Result<SentimentReading, FetchError> {
        let source = SentimentSource::Naaim;

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::network(source, format!("index page request failed: {e}")))?;

        let status = res.status();
        let html = res.text().await.map_err(|e| {
            FetchError::network(source, format!("failed to read index page: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::network(source, format!("index page HTTP {status}")));
        }

        let parsed = parse_exposure_page(&html)?;
        Ok(reading_from_exposure(parsed, Utc::now()))
    }
}

#[derive(Debug, Clone)]
struct ParsedExposure {
    exposure: f64,
    via: &'static str,
}

fn parse_exposure_page(html: &str) -> Result<ParsedExposure, FetchError> {
    let source = SentimentSource::Naaim;

    let selector = Selector::parse(INDEX_WIDGET_SELECTOR)
        .map_err(|e| FetchError::parse(source, format!("bad widget selector: {e}")))?;

    let document = Html::parse_document(html);
    if let Some(widget) = document.select(&selector).next() {
        let text = widget.text().collect::<Vec<_>>().join(" ");
        if let Some(exposure) = first_plausible_exposure(&text)? {
            return Ok(ParsedExposure {
                exposure,
                via: "index widget",
            });
        }
    }

    // The widget id changes when the site is re-themed; the weekly
    // announcement sentence is more stable.
    let announcement =
        Regex::new(r"(?i)This week.s NAAIM Exposure Index number is[^0-9]*([0-9]{1,3}(?:\.[0-9]+)?)")
            .map_err(|e| FetchError::parse(source, format!("bad announcement pattern: {e}")))?;

    if let Some(caps) = announcement.captures(html) {
        if let Ok(exposure) = caps[1].parse::<f64>() {
            if (0.0..=MAX_REPORTED_EXPOSURE).contains(&exposure) {
                return Ok(ParsedExposure {
                    exposure,
                    via: "announcement text",
                });
            }
        }
    }

    Err(FetchError::parse(source, "exposure value not found in page"))
}

fn first_plausible_exposure(text: &str) -> Result<Option<f64>, FetchError> {
    let number = Regex::new(r"\b[0-9]{1,3}(?:\.[0-9]+)?\b").map_err(|e| {
        FetchError::parse(SentimentSource::Naaim, format!("bad number pattern: {e}"))
    })?;

    for m in number.find_iter(text) {
        if let Ok(value) = m.as_str().parse::<f64>() {
            if (0.0..=MAX_REPORTED_EXPOSURE).contains(&value) {
                return Ok(Some(value));
            }
        }
    }

    Ok(None)
}

fn reading_from_exposure(parsed: ParsedExposure, fetched_at: DateTime<Utc>) -> SentimentReading {
    // Score is clamped to the gauge scale; the raw exposure survives as the
    // single component row.
    SentimentReading::new(SentimentSource::Naaim, parsed.exposure, fetched_at)
        .with_components(vec![Component {
            name: "Reported Exposure".to_string(),
            value: parsed.exposure,
            rating: None,
        }])
        .with_note(format!("scraped via {}", parsed.via))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::band::SentimentBand;
    use crate::fetch::FetchErrorKind;

    #[test]
    fn extracts_exposure_from_the_index_widget() {
        let html = r#"
            <html><body>
              <div id="brxe-ymwzia">
                <h2>NAAIM Exposure Index</h2>
                <p>74.93</p>
              </div>
            </body></html>
        "#;

        let parsed = parse_exposure_page(html).unwrap();
        assert_eq!(parsed.exposure, 74.93);
        assert_eq!(parsed.via, "index widget");

        let reading = reading_from_exposure(parsed, Utc::now());
        assert!(!reading.is_demo);
        assert_eq!(reading.score, 74.93);
        assert_eq!(reading.band, SentimentBand::Neutral);
        assert_eq!(reading.label, "Neutral");
        assert_eq!(reading.components.len(), 1);
        assert_eq!(reading.components[0].name, "Reported Exposure");
    }

    #[test]
    fn widget_numbers_above_the_reported_range_are_skipped() {
        // A year in the widget text must not be mistaken for the exposure.
        let html = r#"<div id="brxe-ymwzia">Week of 2026: the index stands at 81.5</div>"#;
        let parsed = parse_exposure_page(html).unwrap();
        assert_eq!(parsed.exposure, 81.5);
    }

    #[test]
    fn falls_back_to_the_announcement_sentence() {
        let html = r#"
            <html><body>
              <p>This week's NAAIM Exposure Index number is: 103.20</p>
            </body></html>
        "#;

        let parsed = parse_exposure_page(html).unwrap();
        assert_eq!(parsed.exposure, 103.20);
        assert_eq!(parsed.via, "announcement text");

        // Leveraged-long exposures clamp onto the 0-100 gauge but stay intact
        // in the component row.
        let reading = reading_from_exposure(parsed, Utc::now());
        assert_eq!(reading.score, 100.0);
        assert_eq!(reading.label, "Extreme Bullish");
        assert_eq!(reading.components[0].value, 103.20);
    }

    #[test]
    fn page_without_a_number_is_a_parse_error() {
        let err = parse_exposure_page("<html><body>weekly survey</body></html>").unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Parse);
        assert_eq!(err.source, SentimentSource::Naaim);
    }
}
