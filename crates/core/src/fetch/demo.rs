use crate::domain::reading::{Component, SentimentReading, SentimentSource};
use chrono::{DateTime, Utc};

// Fixed placeholder values shown when a live fetch fails.
pub const DEMO_CNN_SCORE: f64 = 50.0;
pub const DEMO_NAAIM_EXPOSURE: f64 = 65.0;

const DEMO_NOTE: &str = "demo data; live fetch unavailable";

pub fn demo_reading(source: SentimentSource, fetched_at: DateTime<Utc>) -> SentimentReading {
    match source {
        SentimentSource::CnnFearGreed => {
            let components = crate::fetch::cnn::INDICATORS
                .iter()
                .map(|(_, display_name)| Component {
                    name: (*display_name).to_string(),
                    value: DEMO_CNN_SCORE,
                    rating: None,
                })
                .collect();

            SentimentReading::new(source, DEMO_CNN_SCORE, fetched_at)
                .with_components(components)
                .with_note(DEMO_NOTE)
                .demo()
        }
        SentimentSource::Naaim => SentimentReading::new(source, DEMO_NAAIM_EXPOSURE, fetched_at)
            .with_components(vec![Component {
                name: "Reported Exposure".to_string(),
                value: DEMO_NAAIM_EXPOSURE,
                rating: None,
            }])
            .with_note(DEMO_NOTE)
            .demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn demo_readings_are_flagged_and_in_range() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        for source in [SentimentSource::CnnFearGreed, SentimentSource::Naaim] {
            let reading = demo_reading(source, now);
            assert!(reading.is_demo);
            assert_eq!(reading.source, source);
            assert!((0.0..=100.0).contains(&reading.score));
            assert!(!reading.components.is_empty());
            assert!(reading.note.is_some());
        }
    }

    #[test]
    fn demo_readings_are_deterministic() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(
            demo_reading(SentimentSource::Naaim, now),
            demo_reading(SentimentSource::Naaim, now)
        );
    }

    #[test]
    fn cnn_demo_carries_all_seven_components() {
        let now = Utc::now();
        let reading = demo_reading(SentimentSource::CnnFearGreed, now);
        assert_eq!(reading.components.len(), 7);
        assert_eq!(reading.label, "Neutral");
    }
}
