// Per-bucket traffic metrics in the three collected granularities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of zone traffic, newest first in a zone result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub requests: u64,
    pub bytes: u64,
    pub threats: u64,
    pub cached_requests: u64,
    pub cached_bytes: u64,
}

/// One hour of zone traffic, newest first in a zone result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub datetime: DateTime<Utc>,
    pub requests: u64,
    pub bytes: u64,
    pub threats: u64,
    pub cached_requests: u64,
    pub cached_bytes: u64,
}

/// Traffic summed per client country across the geographic window.
/// `country` is never empty and never the remote's "Unknown" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAggregate {
    pub country: String,
    pub requests: u64,
    pub bytes: u64,
    pub threats: u64,
}
