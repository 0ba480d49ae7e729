pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use handlers::*;
use middleware::TokenRegistry;
use services::{Clock, VideoCatalog, VideoViewerModel};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    pub viewers: Arc<dyn VideoViewerModel>,
    pub catalog: Arc<dyn VideoCatalog>,
    pub tokens: Arc<TokenRegistry>,
    pub clock: Clock,
    pub started_at: Instant,
}

pub fn create_router(state: AppState) -> Router {
    let stats_routes = Router::new()
        .route("/:video_id/stats/overall", get(get_overall_stats))
        .route(
            "/:video_id/stats/timeseries/:metric",
            get(get_timeserie_stats),
        )
        .route("/:video_id/stats/retention", get(get_retention_stats));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/videos", stats_routes)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
