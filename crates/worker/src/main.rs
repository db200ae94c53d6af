use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketmood_core::config::Settings;
use marketmood_core::domain::reading::{SentimentReading, SentimentSource};
use marketmood_core::fetch::cnn::{CnnFearGreedClient, HistoryStats};
use marketmood_core::fetch::naaim::NaaimExposureClient;
use marketmood_core::present;

#[derive(Debug, Parser)]
#[command(name = "marketmood_worker")]
struct Args {
    /// Show trailing history, the component breakdown, and 30-day stats.
    #[arg(short, long)]
    verbose: bool,

    /// Only report the given source (cnn|naaim).
    #[arg(long)]
    source: Option<String>,

    /// Keep running and re-print the report on a fixed interval.
    #[arg(long)]
    watch: bool,

    /// Seconds between refreshes in watch mode.
    #[arg(long, default_value_t = 30)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&settings, &args).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(settings: &Settings, args: &Args) -> anyhow::Result<()> {
    let sources = resolve_sources(args.source.as_deref())?;

    let cnn = CnnFearGreedClient::from_settings(settings)?;
    let naaim = NaaimExposureClient::from_settings(settings)?;

    if !args.watch {
        report_once(&cnn, &naaim, &sources, args.verbose).await;
        return Ok(());
    }

    anyhow::ensure!(args.interval_secs >= 1, "--interval-secs must be >= 1");

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs));
    loop {
        ticker.tick().await;
        report_once(&cnn, &naaim, &sources, args.verbose).await;
    }
}

async fn report_once(
    cnn: &CnnFearGreedClient,
    naaim: &NaaimExposureClient,
    sources: &[SentimentSource],
    verbose: bool,
) {
    for (idx, source) in sources.iter().enumerate() {
        if idx != 0 {
            println!("\n{}\n", "=".repeat(30));
        }

        match source {
            SentimentSource::CnnFearGreed => {
                let reading = marketmood_core::fetch::latest_or_demo(cnn).await;
                print_reading(&reading, verbose);
                if verbose && !reading.is_demo {
                    print_history_stats(cnn).await;
                }
            }
            SentimentSource::Naaim => {
                let reading = marketmood_core::fetch::latest_or_demo(naaim).await;
                print_reading(&reading, verbose);
            }
        }
    }
}

fn print_reading(reading: &SentimentReading, verbose: bool) {
    if verbose {
        println!("{}", present::render_report(reading));
    } else {
        println!("{}", present::render_brief(reading));
    }
}

async fn print_history_stats(cnn: &CnnFearGreedClient) {
    match cnn.fetch_history().await {
        Ok(bars) => {
            if let Some(stats) = HistoryStats::from_recent(&bars, 30) {
                println!();
                println!(
                    "Last {} days: mean {:.1}, high {:.1}, low {:.1}",
                    stats.window, stats.mean, stats.max, stats.min
                );
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "history fetch failed; skipping stats");
        }
    }
}

fn resolve_sources(arg: Option<&str>) -> anyhow::Result<Vec<SentimentSource>> {
    match arg {
        None => Ok(vec![SentimentSource::CnnFearGreed, SentimentSource::Naaim]),
        Some(s) => {
            let source = SentimentSource::from_slug(s)
                .with_context(|| format!("unknown source {s:?} (expected cnn or naaim)"))?;
            Ok(vec![source])
        }
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_both_sources() {
        let sources = resolve_sources(None).unwrap();
        assert_eq!(
            sources,
            vec![SentimentSource::CnnFearGreed, SentimentSource::Naaim]
        );
    }

    #[test]
    fn filters_to_a_single_source() {
        assert_eq!(
            resolve_sources(Some("naaim")).unwrap(),
            vec![SentimentSource::Naaim]
        );
        assert!(resolve_sources(Some("spx")).is_err());
    }
}
