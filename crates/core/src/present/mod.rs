use crate::domain::band::SentimentBand;
use crate::domain::reading::{SentimentReading, SentimentSource};
use serde::Serialize;
use std::fmt::Write as _;

pub const GAUGE_AXIS_MAX: f64 = 100.0;

/// Chart-facing view of a reading: the selected band, its color, the five
/// color steps of the dial, and the component rows in payload order.
#[derive(Debug, Clone, Serialize)]
pub struct GaugeModel {
    pub title: String,
    pub value: f64,
    pub axis_max: f64,
    pub band: SentimentBand,
    pub label: String,
    pub color: &'static str,
    pub is_demo: bool,
    pub steps: Vec<GaugeStep>,
    pub components: Vec<ComponentRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeStep {
    pub from: f64,
    pub to: f64,
    pub band: SentimentBand,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentRow {
    pub name: String,
    pub value: f64,
    pub rating: Option<String>,
}

impl GaugeModel {
    pub fn from_reading(reading: &SentimentReading) -> Self {
        Self {
            title: reading.source.display_name().to_string(),
            value: reading.score,
            axis_max: GAUGE_AXIS_MAX,
            band: reading.band,
            label: reading.label.clone(),
            color: reading.band.color(),
            is_demo: reading.is_demo,
            steps: band_steps(reading.source),
            components: reading
                .components
                .iter()
                .map(|c| ComponentRow {
                    name: c.name.clone(),
                    value: c.value,
                    rating: c.rating.clone(),
                })
                .collect(),
        }
    }
}

pub fn band_steps(source: SentimentSource) -> Vec<GaugeStep> {
    let [t1, t2, t3, t4] = source.band_thresholds();
    let bounds = [0.0, t1, t2, t3, t4, GAUGE_AXIS_MAX];

    SentimentBand::ALL
        .iter()
        .enumerate()
        .map(|(i, band)| GaugeStep {
            from: bounds[i],
            to: bounds[i + 1],
            band: *band,
            color: band.color(),
        })
        .collect()
}

/// One-line form: "72.0 Greed", with a demo marker when applicable.
pub fn render_brief(reading: &SentimentReading) -> String {
    let mut out = format!("{:.1} {}", reading.score, reading.label);
    if reading.is_demo {
        out.push_str(" (demo data)");
    }
    out
}

/// Multi-line report: header, score, rating, demo note, trailing history,
/// component breakdown.
pub fn render_report(reading: &SentimentReading) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ===", reading.source.display_name());
    let _ = writeln!(out, "Score: {:.1}", reading.score);
    let _ = writeln!(out, "Rating: {}", reading.label);

    if reading.is_demo {
        let note = reading.note.as_deref().unwrap_or("demo data");
        let _ = writeln!(out, "Note: {note}");
    }

    if !reading.history.is_empty() {
        let _ = writeln!(out, "History:");
        for entry in &reading.history {
            let _ = writeln!(out, "  {}: {:.1}", entry.label, entry.value);
        }
    }

    if !reading.components.is_empty() {
        let _ = writeln!(out, "Components:");
        for component in &reading.components {
            match component.rating.as_deref() {
                Some(rating) => {
                    let _ = writeln!(out, "  {}: {:.1} ({rating})", component.name, component.value);
                }
                None => {
                    let _ = writeln!(out, "  {}: {:.1}", component.name, component.value);
                }
            }
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::Component;
    use chrono::{TimeZone, Utc};

    fn reading(score: f64) -> SentimentReading {
        let at = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        SentimentReading::new(SentimentSource::CnnFearGreed, score, at)
    }

    #[test]
    fn steps_tile_the_axis_without_gap_or_overlap() {
        for source in [SentimentSource::CnnFearGreed, SentimentSource::Naaim] {
            let steps = band_steps(source);
            assert_eq!(steps.len(), 5);
            assert_eq!(steps[0].from, 0.0);
            assert_eq!(steps[4].to, GAUGE_AXIS_MAX);
            for pair in steps.windows(2) {
                assert_eq!(pair[0].to, pair[1].from);
                assert!(pair[0].from < pair[0].to);
            }
        }
    }

    #[test]
    fn gauge_model_mirrors_the_reading() {
        let r = reading(72.0).with_components(vec![Component {
            name: "Put/Call Options".to_string(),
            value: 55.0,
            rating: Some("neutral".to_string()),
        }]);

        let gauge = GaugeModel::from_reading(&r);
        assert_eq!(gauge.title, "CNN Fear & Greed Index");
        assert_eq!(gauge.value, 72.0);
        assert_eq!(gauge.label, "Greed");
        assert_eq!(gauge.color, SentimentBand::Greed.color());
        assert!(!gauge.is_demo);
        assert_eq!(gauge.components.len(), 1);
        assert_eq!(gauge.components[0].name, "Put/Call Options");
    }

    #[test]
    fn brief_form_marks_demo_readings() {
        assert_eq!(render_brief(&reading(72.0)), "72.0 Greed");

        let demo = reading(50.0).demo();
        assert_eq!(render_brief(&demo), "50.0 Neutral (demo data)");
    }

    #[test]
    fn report_lists_history_and_components_in_order() {
        let r = crate::fetch::demo::demo_reading(
            SentimentSource::CnnFearGreed,
            Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
        );
        let report = render_report(&r);

        assert!(report.starts_with("=== CNN Fear & Greed Index ==="));
        assert!(report.contains("Score: 50.0"));
        assert!(report.contains("Note: demo data"));

        let momentum = report.find("S&P 500 Momentum").unwrap();
        let safe_haven = report.find("Safe Haven Demand").unwrap();
        assert!(momentum < safe_haven);
    }
}
