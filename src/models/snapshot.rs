// Snapshot document: the single published artifact, fully rebuilt each cycle

use serde::{Deserialize, Serialize};

use super::{CountryAggregate, DailyPoint, HourlyPoint};

/// Collected data for one zone. The three lists are always present; a
/// failed query leaves its list empty and sets `error` to the first
/// failure message encountered (daily, then hourly, then geography).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResult {
    pub domain: String,
    #[serde(default)]
    pub raw: Vec<DailyPoint>,
    #[serde(default)]
    pub raw_hours: Vec<HourlyPoint>,
    #[serde(default)]
    pub geography: Vec<CountryAggregate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ZoneResult {
    /// All-empty result carrying only the failure message, for zones where
    /// collection produced nothing usable.
    pub fn failed(domain: &str, error: String) -> Self {
        Self {
            domain: domain.to_string(),
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResult {
    pub name: String,
    pub zones: Vec<ZoneResult>,
}

/// Account order and zone order mirror the resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub accounts: Vec<AccountResult>,
}
