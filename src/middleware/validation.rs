//! Request validation: turns raw path and query parameters into typed,
//! authorized requests for the stats handlers.

use crate::{
    error::StatsError,
    middleware::auth::AuthenticatedUser,
    models::{TimeserieMetric, TimeserieQueryParams, Video, VideoId},
    services::VideoCatalog,
};
use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStatsRequest {
    pub video: Video,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeserieStatsRequest {
    pub video: Video,
    pub metric: TimeserieMetric,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetentionStatsRequest {
    pub video: Video,
}

pub async fn video_overall_stats(
    catalog: &dyn VideoCatalog,
    user: &AuthenticatedUser,
    video_id: &str,
) -> Result<OverallStatsRequest, StatsError> {
    let video = load_managed_video(catalog, user, video_id).await?;

    Ok(OverallStatsRequest { video })
}

pub async fn video_timeserie_stats(
    catalog: &dyn VideoCatalog,
    user: &AuthenticatedUser,
    video_id: &str,
    metric: &str,
    params: TimeserieQueryParams,
) -> Result<TimeserieStatsRequest, StatsError> {
    let metric: TimeserieMetric = metric.parse().map_err(StatsError::InvalidParameter)?;

    if let Some(start) = params.start_date.as_deref() {
        check_date("startDate", start)?;
    }
    if let Some(end) = params.end_date.as_deref() {
        check_date("endDate", end)?;
    }

    let video = load_managed_video(catalog, user, video_id).await?;

    Ok(TimeserieStatsRequest {
        video,
        metric,
        start_date: params.start_date,
        end_date: params.end_date,
    })
}

pub async fn video_retention_stats(
    catalog: &dyn VideoCatalog,
    user: &AuthenticatedUser,
    video_id: &str,
) -> Result<RetentionStatsRequest, StatsError> {
    let video = load_managed_video(catalog, user, video_id).await?;

    if video.is_live {
        return Err(StatsError::InvalidParameter(
            "Cannot get retention stats of live video".to_string(),
        ));
    }

    Ok(RetentionStatsRequest { video })
}

async fn load_managed_video(
    catalog: &dyn VideoCatalog,
    user: &AuthenticatedUser,
    video_id: &str,
) -> Result<Video, StatsError> {
    let id: VideoId = video_id.parse().map_err(StatsError::InvalidParameter)?;

    let video = catalog
        .load_video(&id)
        .await?
        .ok_or_else(|| StatsError::VideoNotFound(video_id.to_string()))?;

    if video.owner_id != user.id && !user.role.can_see_all_videos() {
        tracing::debug!(
            "User {} denied stats of video {} owned by {}",
            user.id,
            video.id,
            video.owner_id
        );
        return Err(StatsError::Forbidden(video_id.to_string()));
    }

    Ok(video)
}

fn check_date(name: &str, value: &str) -> Result<(), StatsError> {
    if is_iso8601(value) {
        Ok(())
    } else {
        Err(StatsError::InvalidParameter(format!(
            "{} is not a valid date: {}",
            name, value
        )))
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y-%j", "%G-W%V-%u", "%GW%V%u"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// ISO 8601 calendar, ordinal and week dates, in extended or basic form,
/// optionally followed by a time of day and a UTC offset.
pub fn is_iso8601(value: &str) -> bool {
    match value.split_once(|c: char| matches!(c, 'T' | 't' | ' ')) {
        Some((date, time)) => is_iso_date(date) && is_iso_time(time),
        None => is_iso_date(value),
    }
}

fn is_iso_date(date: &str) -> bool {
    if DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(date, f).is_ok())
    {
        return true;
    }

    // Reduced precision: YYYY, YYYY-MM, YYYY-Www
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match date.len() {
        4 => digits(date),
        7 if date.as_bytes()[4] == b'-' && digits(&date[5..]) => {
            NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d").is_ok()
        }
        8 if date.get(4..6) == Some("-W") => {
            NaiveDate::parse_from_str(&format!("{}-1", date), "%G-W%V-%u").is_ok()
        }
        _ => false,
    }
}

fn is_iso_time(time: &str) -> bool {
    let (clock, offset) = split_offset(time);

    let offset_ok = match offset {
        None => true,
        Some(offset) => match offset.len() {
            2 => NaiveTime::parse_from_str(&format!("{}:00", offset), "%H:%M").is_ok(),
            4 => NaiveTime::parse_from_str(offset, "%H%M").is_ok(),
            5 => NaiveTime::parse_from_str(offset, "%H:%M").is_ok(),
            _ => false,
        },
    };
    if !offset_ok || clock.is_empty() {
        return false;
    }

    let clock = clock.replace(',', ".");
    if clock.len() == 2 {
        return NaiveTime::parse_from_str(&format!("{}:00", clock), "%H:%M").is_ok();
    }

    TIME_FORMATS
        .iter()
        .any(|f| NaiveTime::parse_from_str(&clock, f).is_ok())
}

/// Splits `10:00:00+01:00` into the clock time and the offset digits.
/// A `Z` suffix counts as a valid offset with no digits.
fn split_offset(time: &str) -> (&str, Option<&str>) {
    if let Some(clock) = time.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return (clock, None);
    }

    match time.rfind(|c: char| c == '+' || c == '-') {
        Some(i) => (&time[..i], Some(&time[i + 1..])),
        None => (time, None),
    }
}
