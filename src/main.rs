use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsboard::config::Config;
use newsboard::present::Board;
use newsboard::routes::{self, AppState};
use newsboard::scheduler::{start_background_refresh, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWSBOARD_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} sources from {} ({:?} aggregation, translation {})",
        config.sources.len(),
        config_path,
        config.aggregation_mode(),
        if config.translation.enabled { "on" } else { "off" }
    );

    // Create pipeline
    let board = Board::new();
    let pipeline = Arc::new(Pipeline::from_config(&config, board)?);

    // Start background refresh task
    let bg_pipeline = pipeline.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        start_background_refresh(bg_pipeline, refresh_interval).await;
    });

    // Create app state
    let state = Arc::new(AppState {
        pipeline,
        refresh_interval,
    });

    // Build router
    let app = Router::new()
        .route("/", get(routes::index))
        .route("/api/items", get(routes::items))
        .route("/refresh", post(routes::refresh))
        .route("/refresh/status", get(routes::refresh_status))
        .route("/health", get(routes::health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server starting on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
