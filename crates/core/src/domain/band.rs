use crate::domain::reading::SentimentSource;
use serde::{Deserialize, Serialize};

/// Five-level sentiment scale shared by both indicators. Thresholds are
/// per-source (see `SentimentSource::band_thresholds`); wording differs too:
/// CNN reads fear/greed, NAAIM reads bearish/bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBand {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentBand {
    pub const ALL: [SentimentBand; 5] = [
        SentimentBand::ExtremeFear,
        SentimentBand::Fear,
        SentimentBand::Neutral,
        SentimentBand::Greed,
        SentimentBand::ExtremeGreed,
    ];

    /// Bands are closed-open on the thresholds; the top band is closed at 100.
    pub fn classify(source: SentimentSource, score: f64) -> Self {
        let [t1, t2, t3, t4] = source.band_thresholds();
        if score < t1 {
            SentimentBand::ExtremeFear
        } else if score < t2 {
            SentimentBand::Fear
        } else if score < t3 {
            SentimentBand::Neutral
        } else if score < t4 {
            SentimentBand::Greed
        } else {
            SentimentBand::ExtremeGreed
        }
    }

    pub fn label_for(self, source: SentimentSource) -> &'static str {
        match source {
            SentimentSource::CnnFearGreed => match self {
                SentimentBand::ExtremeFear => "Extreme Fear",
                SentimentBand::Fear => "Fear",
                SentimentBand::Neutral => "Neutral",
                SentimentBand::Greed => "Greed",
                SentimentBand::ExtremeGreed => "Extreme Greed",
            },
            SentimentSource::Naaim => match self {
                SentimentBand::ExtremeFear => "Extreme Bearish",
                SentimentBand::Fear => "Bearish",
                SentimentBand::Neutral => "Neutral",
                SentimentBand::Greed => "Bullish",
                SentimentBand::ExtremeGreed => "Extreme Bullish",
            },
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            SentimentBand::ExtremeFear => "#d62728",
            SentimentBand::Fear => "#ff7f0e",
            SentimentBand::Neutral => "#ffdd57",
            SentimentBand::Greed => "#9acd32",
            SentimentBand::ExtremeGreed => "#2ca02c",
        }
    }
}
