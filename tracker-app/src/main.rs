use axum::Router;
use config::AppConfig;
use dotenv::dotenv;
use engine::app::{AppError, AppProperties, AppResult};
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use repositories::mongodb::{ConnectionDetails, MongoEngine};
use tracker_routes::auth::AuthConfig;
use tracker_routes::state::TrackerAppState;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("defect tracker shutting down"),
        Err(e) => {
            error!("defect tracker exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("TRACKER_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().change_context(AppError)?;
    let port = config.port;

    let routes = build_routes(config).await?;

    engine::app::run(routes, AppProperties { port }).await
}

async fn build_routes(config: AppConfig) -> AppResult<Router> {
    let engine = build_engine(&config).await?;
    let auth = AuthConfig::from_env().change_context(AppError)?;

    let state = if config.metrics_enabled {
        let handle = tracker_routes::metrics::setup_recorder().change_context(AppError)?;
        TrackerAppState::new_with_metrics(engine, auth, handle)
    } else {
        info!("metrics are disabled");
        TrackerAppState::new_without_metrics(engine, auth)
    };

    debug!("building routes..");
    Ok(tracker_routes::routes::build(state)).inspect(|_| debug!("routes built"))
}

#[instrument(skip_all)]
async fn build_engine(config: &AppConfig) -> AppResult<MongoEngine> {
    debug!("initializing mongodb repositories");
    MongoEngine::init(
        ConnectionDetails::Url(config.database_url.clone()),
        &config.database_name,
    )
    .await
    .change_context(AppError)
}
