use crate::{
    models::{
        StatsPayload, Video, VideoId, VideoStatsOverall, VideoStatsRetention, VideoStatsTimeserie,
    },
    services::viewer_model::{ModelError, TimeserieQuery, VideoCatalog, VideoViewerModel},
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Viewer stats model backed by a remote stats service over HTTP.
#[derive(Clone)]
pub struct RemoteViewerModel {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteViewerModel {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    async fn check_status(response: Response) -> Result<Response, ModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Stats backend responded {}: {}", status, body);
        Err(ModelError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch_stats(&self, request: RequestBuilder) -> Result<StatsPayload, ModelError> {
        let response = Self::check_status(request.send().await?).await?;
        let body = response.text().await?;

        StatsPayload::from_json(body).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

#[async_trait]
impl VideoCatalog for RemoteViewerModel {
    async fn load_video(&self, id: &VideoId) -> Result<Option<Video>, ModelError> {
        let response = self.get(&format!("/videos/{}", id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Video {} not found in catalog", id);
            return Ok(None);
        }

        let video = Self::check_status(response)
            .await?
            .json::<Video>()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        Ok(Some(video))
    }
}

#[async_trait]
impl VideoViewerModel for RemoteViewerModel {
    async fn overall_stats(&self, video: &Video) -> Result<VideoStatsOverall, ModelError> {
        self.fetch_stats(self.get(&format!("/videos/{}/viewers/overall", video.uuid)))
            .await
    }

    async fn timeserie_stats(
        &self,
        query: &TimeserieQuery,
    ) -> Result<VideoStatsTimeserie, ModelError> {
        let request = self
            .get(&format!(
                "/videos/{}/viewers/timeseries/{}",
                query.video.uuid, query.metric
            ))
            .query(&[
                ("startDate", query.start_date.as_str()),
                ("endDate", query.end_date.as_str()),
            ]);

        self.fetch_stats(request).await
    }

    async fn retention_stats(&self, video: &Video) -> Result<VideoStatsRetention, ModelError> {
        self.fetch_stats(self.get(&format!("/videos/{}/viewers/retention", video.uuid)))
            .await
    }
}
