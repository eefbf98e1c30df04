use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use tracing::info;

use crate::fetcher::SourceReport;
use crate::present::{RenderRow, Snapshot};
use crate::scheduler::{log_outcome, Pipeline};

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Seconds between scheduled cycles; the page reloads on the same beat.
    pub refresh_interval: u64,
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub loaded: bool,
    pub rows: Vec<RenderRow>,
    pub failed: Vec<SourceReport>,
    pub generated_at: String,
    pub refreshing: bool,
    pub refresh_interval: u64,
}

#[derive(Template)]
#[template(path = "refresh_button.html")]
pub struct RefreshButtonTemplate {
    pub refreshing: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.pipeline.board().current().await;
    let refreshing = state.pipeline.is_refreshing().await;

    let template = match snapshot {
        Some(snapshot) => IndexTemplate {
            loaded: true,
            rows: snapshot.rows.clone(),
            failed: snapshot.failed_sources(),
            generated_at: snapshot.generated_at.format("%H:%M:%S UTC").to_string(),
            refreshing,
            refresh_interval: state.refresh_interval,
        },
        None => IndexTemplate {
            loaded: false,
            rows: Vec::new(),
            failed: Vec::new(),
            generated_at: String::new(),
            refreshing,
            refresh_interval: state.refresh_interval,
        },
    };

    HtmlTemplate(template)
}

pub async fn items(State(state): State<Arc<AppState>>) -> Json<Option<Snapshot>> {
    let snapshot = state.pipeline.board().current().await;
    Json(snapshot.map(|s| (*s).clone()))
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Spawn the refresh task
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        info!("Manual refresh requested");
        log_outcome(pipeline.run_cycle().await);
    });

    // Return refreshing state immediately
    HtmlTemplate(RefreshButtonTemplate { refreshing: true })
}

pub async fn refresh_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let refreshing = state.pipeline.is_refreshing().await;
    HtmlTemplate(RefreshButtonTemplate { refreshing })
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
