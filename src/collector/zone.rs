// Per-zone collection: the three queries run concurrently, and one
// failure never cancels or discards the others.

use std::collections::HashMap;

use crate::client::{CfClient, CountryEntry};
use crate::config::Zone;
use crate::models::{CountryAggregate, ZoneResult};
use crate::query::Window;

/// Countries kept per zone after aggregation.
pub const COUNTRY_LIMIT: usize = 15;

/// Time windows shared by every zone in one collection cycle.
pub struct ZoneWindows {
    pub daily: Window,
    pub hourly: Window,
    pub geography: Window,
}

/// Fetch daily, hourly, and geographic data for one zone and normalize
/// the result. All three queries settle before the result is assembled;
/// `error` records the first failure in daily, hourly, geography order
/// while successful shapes stay populated.
pub async fn collect_zone(
    client: &CfClient,
    token: &str,
    zone: &Zone,
    windows: &ZoneWindows,
) -> ZoneResult {
    let (daily, hourly, geography) = tokio::join!(
        client.fetch_daily(&zone.zone_id, &windows.daily, token),
        client.fetch_hourly(&zone.zone_id, &windows.hourly, token),
        client.fetch_geography(&zone.zone_id, &windows.geography, token),
    );

    let mut result = ZoneResult {
        domain: zone.domain.clone(),
        ..ZoneResult::default()
    };

    match daily {
        Ok(points) => {
            tracing::debug!(
                zone = %zone.domain,
                records = points.len(),
                operation = "fetch_daily",
                "daily data retrieved"
            );
            result.raw = points;
        }
        Err(e) => {
            tracing::warn!(
                zone = %zone.domain,
                error = %e,
                operation = "fetch_daily",
                "daily query failed"
            );
            result.error = Some(e.to_string());
        }
    }

    match hourly {
        Ok(points) => {
            tracing::debug!(
                zone = %zone.domain,
                records = points.len(),
                operation = "fetch_hourly",
                "hourly data retrieved"
            );
            result.raw_hours = points;
        }
        Err(e) => {
            tracing::warn!(
                zone = %zone.domain,
                error = %e,
                operation = "fetch_hourly",
                "hourly query failed"
            );
            if result.error.is_none() {
                result.error = Some(e.to_string());
            }
        }
    }

    match geography {
        Ok(entries) => {
            result.geography = aggregate_countries(entries);
            tracing::debug!(
                zone = %zone.domain,
                countries = result.geography.len(),
                operation = "fetch_geography",
                "geographic data aggregated"
            );
        }
        Err(e) => {
            tracing::warn!(
                zone = %zone.domain,
                error = %e,
                operation = "fetch_geography",
                "geographic query failed"
            );
            if result.error.is_none() {
                result.error = Some(e.to_string());
            }
        }
    }

    result
}

/// Sum per-record country entries into one aggregate per country. Empty
/// and "Unknown" names are dropped; the list is ordered by requests
/// descending (country name ascending on ties) and capped at
/// `COUNTRY_LIMIT`.
pub fn aggregate_countries(entries: Vec<CountryEntry>) -> Vec<CountryAggregate> {
    let mut by_country: HashMap<String, CountryAggregate> = HashMap::new();
    for entry in entries {
        if entry.client_country_name.is_empty() || entry.client_country_name == "Unknown" {
            continue;
        }
        let aggregate = by_country
            .entry(entry.client_country_name.clone())
            .or_insert_with(|| CountryAggregate {
                country: entry.client_country_name.clone(),
                requests: 0,
                bytes: 0,
                threats: 0,
            });
        aggregate.requests += entry.requests;
        aggregate.bytes += entry.bytes;
        aggregate.threats += entry.threats;
    }

    let mut countries: Vec<CountryAggregate> = by_country.into_values().collect();
    countries.sort_by(|a, b| {
        b.requests
            .cmp(&a.requests)
            .then_with(|| a.country.cmp(&b.country))
    });
    countries.truncate(COUNTRY_LIMIT);
    countries
}
