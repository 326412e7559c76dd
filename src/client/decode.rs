// Typed decoders for the three response shapes. A shape mismatch is a
// DecodeError, distinct from the remote's own error list (ClientError::Remote).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{DailyPoint, HourlyPoint};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("response shape mismatch: {0}")]
    Shape(String),
    #[error("zone missing from response")]
    MissingZone,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<Z> {
    viewer: Viewer<Z>,
}

#[derive(Debug, Deserialize)]
struct Viewer<Z> {
    #[serde(default = "Vec::new")]
    zones: Vec<Z>,
}

#[derive(Debug, Deserialize)]
struct DailyZone {
    #[serde(rename = "httpRequests1dGroups")]
    groups: Option<Vec<DailyGroup>>,
}

#[derive(Debug, Deserialize)]
struct DailyGroup {
    dimensions: DailyDimensions,
    sum: TotalsSum,
}

#[derive(Debug, Deserialize)]
struct DailyDimensions {
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct HourlyZone {
    #[serde(rename = "httpRequests1hGroups")]
    groups: Option<Vec<HourlyGroup>>,
}

#[derive(Debug, Deserialize)]
struct HourlyGroup {
    dimensions: HourlyDimensions,
    sum: TotalsSum,
}

#[derive(Debug, Deserialize)]
struct HourlyDimensions {
    datetime: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalsSum {
    #[serde(default)]
    requests: u64,
    #[serde(default)]
    bytes: u64,
    #[serde(default)]
    threats: u64,
    #[serde(default)]
    cached_requests: u64,
    #[serde(default)]
    cached_bytes: u64,
}

#[derive(Debug, Deserialize)]
struct GeoZone {
    #[serde(rename = "httpRequests1dGroups")]
    groups: Option<Vec<GeoGroup>>,
}

#[derive(Debug, Deserialize)]
struct GeoGroup {
    #[serde(default)]
    sum: GeoSum,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoSum {
    #[serde(default)]
    country_map: Vec<CountryEntry>,
}

/// One raw per-record country entry, before aggregation across records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntry {
    #[serde(default)]
    pub client_country_name: String,
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub threats: u64,
}

#[derive(Debug, Deserialize)]
struct ProbeZone {
    #[serde(rename = "zoneTag")]
    zone_tag: String,
}

fn envelope<Z: serde::de::DeserializeOwned>(data: &Value) -> Result<DataEnvelope<Z>, DecodeError> {
    serde_json::from_value(data.clone()).map_err(|e| DecodeError::Shape(e.to_string()))
}

fn first_zone<Z>(envelope: DataEnvelope<Z>) -> Result<Z, DecodeError> {
    envelope
        .viewer
        .zones
        .into_iter()
        .next()
        .ok_or(DecodeError::MissingZone)
}

/// Daily aggregates, preserving the remote's (descending) order.
pub fn decode_daily(data: &Value) -> Result<Vec<DailyPoint>, DecodeError> {
    let zone = first_zone(envelope::<DailyZone>(data)?)?;
    Ok(zone
        .groups
        .unwrap_or_default()
        .into_iter()
        .map(|g| DailyPoint {
            date: g.dimensions.date,
            requests: g.sum.requests,
            bytes: g.sum.bytes,
            threats: g.sum.threats,
            cached_requests: g.sum.cached_requests,
            cached_bytes: g.sum.cached_bytes,
        })
        .collect())
}

/// Hourly aggregates, preserving the remote's (descending) order.
pub fn decode_hourly(data: &Value) -> Result<Vec<HourlyPoint>, DecodeError> {
    let zone = first_zone(envelope::<HourlyZone>(data)?)?;
    Ok(zone
        .groups
        .unwrap_or_default()
        .into_iter()
        .map(|g| HourlyPoint {
            datetime: g.dimensions.datetime,
            requests: g.sum.requests,
            bytes: g.sum.bytes,
            threats: g.sum.threats,
            cached_requests: g.sum.cached_requests,
            cached_bytes: g.sum.cached_bytes,
        })
        .collect())
}

/// Raw country entries flattened across all returned records; aggregation
/// happens in the zone collector.
pub fn decode_geography(data: &Value) -> Result<Vec<CountryEntry>, DecodeError> {
    let zone = first_zone(envelope::<GeoZone>(data)?)?;
    Ok(zone
        .groups
        .unwrap_or_default()
        .into_iter()
        .flat_map(|g| g.sum.country_map)
        .collect())
}

/// Zone tags visible to a token (probe query). An empty list is a valid
/// answer here, unlike the zone-filtered queries.
pub fn decode_zone_tags(data: &Value) -> Result<Vec<String>, DecodeError> {
    let env = envelope::<ProbeZone>(data)?;
    Ok(env.viewer.zones.into_iter().map(|z| z.zone_tag).collect())
}
