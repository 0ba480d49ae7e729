use crate::models::{
    TimeserieMetric, Video, VideoId, VideoStatsOverall, VideoStatsRetention, VideoStatsTimeserie,
};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Stats backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Stats backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid stats backend response: {0}")]
    Decode(String),
}

/// Timeseries request as forwarded to the model, dates already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeserieQuery {
    pub video: Video,
    pub metric: TimeserieMetric,
    pub start_date: String,
    pub end_date: String,
}

/// Aggregation side of the viewer stats model. Implementations own all
/// storage access and bucketing; callers only forward resolved requests.
#[async_trait]
pub trait VideoViewerModel: Send + Sync {
    async fn overall_stats(&self, video: &Video) -> Result<VideoStatsOverall, ModelError>;

    async fn timeserie_stats(&self, query: &TimeserieQuery)
        -> Result<VideoStatsTimeserie, ModelError>;

    async fn retention_stats(&self, video: &Video) -> Result<VideoStatsRetention, ModelError>;
}

/// Resolves `:videoId` path segments into loaded videos.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn load_video(&self, id: &VideoId) -> Result<Option<Video>, ModelError>;
}
