use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketmood_core::config::Settings;
use marketmood_core::domain::reading::{SentimentReading, SentimentSource};
use marketmood_core::fetch::cnn::CnnFearGreedClient;
use marketmood_core::fetch::naaim::NaaimExposureClient;
use marketmood_core::present::GaugeModel;

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

    let result = run(&settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(settings: &Settings) -> anyhow::Result<()> {
    let cnn = CnnFearGreedClient::from_settings(settings)?;
    let naaim = NaaimExposureClient::from_settings(settings)?;

    let state = AppState {
        dashboard: Arc::new(RwLock::new(None)),
    };

    let interval = Duration::from_secs(settings.refresh_interval_secs());
    tokio::spawn(refresh_loop(state.dashboard.clone(), cnn, naaim, interval));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/readings/latest", get(get_latest_dashboard))
        .route("/readings/:source", get(get_reading))
        .route("/gauges/:source", get(get_gauge))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, refresh_secs = interval.as_secs(), "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    // None until the first refresh tick completes.
    dashboard: Arc<RwLock<Option<Dashboard>>>,
}

#[derive(Debug, Clone, Serialize)]
struct Dashboard {
    refreshed_at: DateTime<Utc>,
    cnn: SentimentReading,
    naaim: SentimentReading,
}

impl Dashboard {
    fn reading(&self, source: SentimentSource) -> &SentimentReading {
        match source {
            SentimentSource::CnnFearGreed => &self.cnn,
            SentimentSource::Naaim => &self.naaim,
        }
    }
}

async fn refresh_loop(
    dashboard: Arc<RwLock<Option<Dashboard>>>,
    cnn: CnnFearGreedClient,
    naaim: NaaimExposureClient,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        let cnn_reading = marketmood_core::fetch::latest_or_demo(&cnn).await;
        let naaim_reading = marketmood_core::fetch::latest_or_demo(&naaim).await;

        tracing::info!(
            cnn_score = cnn_reading.score,
            cnn_demo = cnn_reading.is_demo,
            naaim_score = naaim_reading.score,
            naaim_demo = naaim_reading.is_demo,
            "dashboard refreshed"
        );

        let next = Dashboard {
            refreshed_at: Utc::now(),
            cnn: cnn_reading,
            naaim: naaim_reading,
        };
        *dashboard.write().await = Some(next);
    }
}

async fn get_latest_dashboard(
    State(state): State<AppState>,
) -> Result<Json<Dashboard>, StatusCode> {
    let guard = state.dashboard.read().await;
    match guard.as_ref() {
        Some(dashboard) => Ok(Json(dashboard.clone())),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn get_reading(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<SentimentReading>, StatusCode> {
    let source = SentimentSource::from_slug(&source).ok_or(StatusCode::BAD_REQUEST)?;

    let guard = state.dashboard.read().await;
    let dashboard = guard.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(dashboard.reading(source).clone()))
}

async fn get_gauge(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<Json<GaugeModel>, StatusCode> {
    let source = SentimentSource::from_slug(&source).ok_or(StatusCode::BAD_REQUEST)?;

    let guard = state.dashboard.read().await;
    let dashboard = guard.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(GaugeModel::from_reading(dashboard.reading(source))))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
