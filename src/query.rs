// GraphQL query construction for the three collected shapes.
// One builder parameterized by time grain, field set, and record limit;
// the daily/hourly/geography queries are instances of it.

use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{Value, json};

/// Aggregation bucket of the remote group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGrain {
    /// `httpRequests1dGroups`, filtered and keyed by `Date`.
    Daily,
    /// `httpRequests1hGroups`, filtered and keyed by `Time`.
    Hourly,
}

/// Which sum fields the query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    /// Flat per-bucket totals.
    Totals,
    /// Nested per-country breakdown within each bucket.
    CountryMap,
}

#[derive(Debug, Clone, Copy)]
pub struct QuerySpec {
    pub grain: TimeGrain,
    pub fields: FieldSet,
    pub limit: u32,
}

/// Daily aggregates over the trailing daily window.
pub const DAILY: QuerySpec = QuerySpec {
    grain: TimeGrain::Daily,
    fields: FieldSet::Totals,
    limit: 100,
};

/// Hourly aggregates over the trailing hourly window.
pub const HOURLY: QuerySpec = QuerySpec {
    grain: TimeGrain::Hourly,
    fields: FieldSet::Totals,
    limit: 200,
};

/// Country breakdown; the remote restricts countryMap to short windows,
/// so this is queried for the current day only.
pub const GEOGRAPHY: QuerySpec = QuerySpec {
    grain: TimeGrain::Daily,
    fields: FieldSet::CountryMap,
    limit: 100,
};

impl QuerySpec {
    /// Render the GraphQL document for this spec.
    pub fn document(&self) -> String {
        let (node, var_type, dimension, filter) = match self.grain {
            TimeGrain::Daily => ("httpRequests1dGroups", "Date", "date", "date"),
            TimeGrain::Hourly => ("httpRequests1hGroups", "Time", "datetime", "datetime"),
        };
        let sum = match self.fields {
            FieldSet::Totals => "requests bytes threats cachedRequests cachedBytes".to_string(),
            FieldSet::CountryMap => {
                "countryMap { clientCountryName requests bytes threats }".to_string()
            }
        };
        format!(
            r#"query($zone: String!, $since: {var_type}!, $until: {var_type}!) {{
  viewer {{
    zones(filter: {{zoneTag: $zone}}) {{
      {node}(
        filter: {{{filter}_geq: $since, {filter}_leq: $until}}
        limit: {limit}
        orderBy: [{dimension}_DESC]
      ) {{
        dimensions {{ {dimension} }}
        sum {{ {sum} }}
      }}
    }}
  }}
}}"#,
            limit = self.limit,
        )
    }
}

/// A since/until pair already formatted for the query's variable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub since: String,
    pub until: String,
}

/// Trailing window of calendar dates ending today (UTC).
pub fn daily_window(days: i64) -> Window {
    let now = Utc::now();
    Window {
        since: (now - Duration::days(days)).date_naive().to_string(),
        until: now.date_naive().to_string(),
    }
}

/// Trailing window of timestamps ending now (UTC).
pub fn hourly_window(days: i64) -> Window {
    let now = Utc::now();
    Window {
        since: (now - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true),
        until: now.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

/// The current UTC day only.
pub fn today_window() -> Window {
    let today = Utc::now().date_naive().to_string();
    Window {
        since: today.clone(),
        until: today,
    }
}

/// Variables object shared by all three queries.
pub fn variables(zone_id: &str, window: &Window) -> Value {
    json!({
        "zone": zone_id,
        "since": window.since,
        "until": window.until,
    })
}
