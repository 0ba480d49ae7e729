use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

/// Metric charted by the timeseries endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeserieMetric {
    Viewers,
    AggregateWatchTime,
}

impl TimeserieMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeserieMetric::Viewers => "viewers",
            TimeserieMetric::AggregateWatchTime => "aggregateWatchTime",
        }
    }
}

impl FromStr for TimeserieMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewers" => Ok(TimeserieMetric::Viewers),
            "aggregateWatchTime" => Ok(TimeserieMetric::AggregateWatchTime),
            _ => Err(format!("Unknown timeserie metric: {}", s)),
        }
    }
}

impl fmt::Display for TimeserieMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string of the timeseries endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeserieQueryParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Stats result exactly as the viewer stats model produced it.
///
/// The JSON text is kept as received, so serializing it back writes the
/// same bytes: no field is dropped, added, reordered or renumbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsPayload(Box<RawValue>);

impl StatsPayload {
    pub fn from_json(json: String) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json).map(StatsPayload)
    }

    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::value::to_raw_value(value).map(StatsPayload)
    }

    pub fn get(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for StatsPayload {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

pub type VideoStatsOverall = StatsPayload;
pub type VideoStatsTimeserie = StatsPayload;
pub type VideoStatsRetention = StatsPayload;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_wire_names_match_path_segments() {
        for metric in [TimeserieMetric::Viewers, TimeserieMetric::AggregateWatchTime] {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
            assert_eq!(metric.as_str().parse::<TimeserieMetric>(), Ok(metric));
        }

        assert!("aggregate_watch_time".parse::<TimeserieMetric>().is_err());
    }

    #[test]
    fn payload_serializes_back_to_the_same_bytes() {
        let body = r#"{"viewersPeak":3,"averageWatchTime":1,"subdivisions":[{"name":"IDF"}]}"#;

        let payload: StatsPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.get(), body);
        assert_eq!(serde_json::to_string(&payload).unwrap(), body);
    }

    #[test]
    fn payload_rejects_invalid_json() {
        assert!(StatsPayload::from_json("{not json".to_string()).is_err());
        assert!(StatsPayload::from_json("[1, 2]".to_string()).is_ok());
    }
}
