use crate::domain::band::SentimentBand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentSource {
    CnnFearGreed,
    Naaim,
}

impl SentimentSource {
    pub fn display_name(self) -> &'static str {
        match self {
            SentimentSource::CnnFearGreed => "CNN Fear & Greed Index",
            SentimentSource::Naaim => "NAAIM Exposure Index",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            SentimentSource::CnnFearGreed => "cnn",
            SentimentSource::Naaim => "naaim",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cnn" => Some(SentimentSource::CnnFearGreed),
            "naaim" => Some(SentimentSource::Naaim),
            _ => None,
        }
    }

    /// Boundaries between the five bands, ascending. CNN uses its published
    /// banding; NAAIM uses the exposure banding (<40 extreme bearish, <60
    /// bearish, <80 neutral, <95 bullish, else extreme bullish).
    pub fn band_thresholds(self) -> [f64; 4] {
        match self {
            SentimentSource::CnnFearGreed => [25.0, 45.0, 55.0, 75.0],
            SentimentSource::Naaim => [40.0, 60.0, 80.0, 95.0],
        }
    }
}

/// One fetch result. Built fresh each refresh cycle and replaced wholesale;
/// the score is clamped into [0, 100] on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub source: SentimentSource,
    pub score: f64,
    pub band: SentimentBand,
    pub label: String,
    pub components: Vec<Component>,
    pub history: Vec<HistoryEntry>,
    pub fetched_at: DateTime<Utc>,
    pub is_demo: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub value: f64,
    pub rating: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub value: f64,
}

impl SentimentReading {
    pub fn new(source: SentimentSource, score: f64, fetched_at: DateTime<Utc>) -> Self {
        let score = score.clamp(0.0, 100.0);
        let band = SentimentBand::classify(source, score);
        Self {
            source,
            score,
            band,
            label: band.label_for(source).to_string(),
            components: Vec::new(),
            history: Vec::new(),
            fetched_at,
            is_demo: false,
            note: None,
        }
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn demo(mut self) -> Self {
        self.is_demo = true;
        self
    }
}
