//! Video stats endpoints. Each handler authenticates, validates, then makes a
//! single call to the viewer stats model and returns its result as JSON.

use crate::{
    error::StatsError,
    middleware::{
        validation::{self, OverallStatsRequest, RetentionStatsRequest, TimeserieStatsRequest},
        AuthenticatedUser,
    },
    models::{TimeserieQueryParams, VideoStatsOverall, VideoStatsRetention, VideoStatsTimeserie},
    services::{Clock, ModelError, TimeserieQuery, VideoViewerModel},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};

/// GET /:videoId/stats/overall
pub async fn get_overall_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoStatsOverall>, StatsError> {
    let request = validation::video_overall_stats(state.catalog.as_ref(), &user, &video_id).await?;

    let stats = overall_stats(state.viewers.as_ref(), request).await?;
    Ok(Json(stats))
}

/// GET /:videoId/stats/timeseries/:metric?startDate=&endDate=
pub async fn get_timeserie_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((video_id, metric)): Path<(String, String)>,
    Query(params): Query<TimeserieQueryParams>,
) -> Result<Json<VideoStatsTimeserie>, StatsError> {
    let request = validation::video_timeserie_stats(
        state.catalog.as_ref(),
        &user,
        &video_id,
        &metric,
        params,
    )
    .await?;

    let stats = timeserie_stats(state.viewers.as_ref(), request, &state.clock).await?;
    Ok(Json(stats))
}

/// GET /:videoId/stats/retention
pub async fn get_retention_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoStatsRetention>, StatsError> {
    let request =
        validation::video_retention_stats(state.catalog.as_ref(), &user, &video_id).await?;

    let stats = retention_stats(state.viewers.as_ref(), request).await?;
    Ok(Json(stats))
}

pub async fn overall_stats(
    model: &dyn VideoViewerModel,
    request: OverallStatsRequest,
) -> Result<VideoStatsOverall, ModelError> {
    tracing::debug!("Fetching overall stats of video {}", request.video.id);
    model.overall_stats(&request.video).await
}

/// Fills missing dates from `clock` and forwards the query.
pub async fn timeserie_stats(
    model: &dyn VideoViewerModel,
    request: TimeserieStatsRequest,
    clock: &Clock,
) -> Result<VideoStatsTimeserie, ModelError> {
    let range = clock.resolve_range(request.start_date, request.end_date);

    let query = TimeserieQuery {
        video: request.video,
        metric: request.metric,
        start_date: range.start_date,
        end_date: range.end_date,
    };

    tracing::debug!(
        "Fetching {} timeserie of video {} from {} to {}",
        query.metric,
        query.video.id,
        query.start_date,
        query.end_date
    );

    model.timeserie_stats(&query).await
}

pub async fn retention_stats(
    model: &dyn VideoViewerModel,
    request: RetentionStatsRequest,
) -> Result<VideoStatsRetention, ModelError> {
    tracing::debug!("Fetching retention stats of video {}", request.video.id);
    model.retention_stats(&request.video).await
}
