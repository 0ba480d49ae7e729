use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A video as loaded from the catalog, already resolved from its path identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub owner_id: i64,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub duration_secs: u64,
}

/// The `:videoId` path segment: a numeric id or a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoId {
    Numeric(i64),
    Uuid(Uuid),
}

impl FromStr for VideoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<i64>() {
            if id > 0 {
                return Ok(VideoId::Numeric(id));
            }
            return Err(format!("Invalid video id: {}", s));
        }

        Uuid::parse_str(s)
            .map(VideoId::Uuid)
            .map_err(|_| format!("Invalid video id: {}", s))
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoId::Numeric(id) => write!(f, "{}", id),
            VideoId::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}
