// Cloudflare GraphQL client: single-shot queries with bearer auth, a
// bounded timeout, and failure classification. Retries are the caller's
// concern and are intentionally absent.

pub mod decode;

pub use decode::{CountryEntry, DecodeError};

use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::models::{DailyPoint, HourlyPoint};
use crate::query::{self, QuerySpec, Window};

const PROBE_QUERY: &str = "query { viewer { zones(limit: 50) { zoneTag } } }";

/// Classified failure of a single remote call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized: token rejected (HTTP 401)")]
    Unauthorized,
    #[error("forbidden: token lacks required scope (HTTP 403)")]
    Forbidden,
    #[error("no data in response")]
    NoData,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("decode error: {0}")]
    Decode(DecodeError),
}

// The transport can succeed while the payload carries an error list; both
// fields must be inspected before the data is trusted.
#[derive(Debug, Deserialize)]
struct GqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GqlError>>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

pub struct CfClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CfClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    /// POST one query and classify the outcome. Returns the `data` payload
    /// on success.
    pub async fn execute(
        &self,
        query: &str,
        variables: Value,
        token: &str,
    ) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::Forbidden);
        }
        if !status.is_success() {
            return Err(ClientError::Transport(format!("unexpected HTTP status {status}")));
        }

        let body: GqlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if let Some(errors) = body.errors
            && let Some(first) = errors.first()
        {
            return Err(ClientError::Remote(first.message.clone()));
        }
        body.data
            .filter(|d| !d.is_null())
            .ok_or(ClientError::NoData)
    }

    async fn fetch(
        &self,
        spec: QuerySpec,
        zone_id: &str,
        window: &Window,
        token: &str,
    ) -> Result<Value, ClientError> {
        self.execute(&spec.document(), query::variables(zone_id, window), token)
            .await
    }

    /// Daily aggregates for one zone over `window`.
    pub async fn fetch_daily(
        &self,
        zone_id: &str,
        window: &Window,
        token: &str,
    ) -> Result<Vec<DailyPoint>, ClientError> {
        let data = self.fetch(query::DAILY, zone_id, window, token).await?;
        decode::decode_daily(&data).map_err(classify_decode)
    }

    /// Hourly aggregates for one zone over `window`.
    pub async fn fetch_hourly(
        &self,
        zone_id: &str,
        window: &Window,
        token: &str,
    ) -> Result<Vec<HourlyPoint>, ClientError> {
        let data = self.fetch(query::HOURLY, zone_id, window, token).await?;
        decode::decode_hourly(&data).map_err(classify_decode)
    }

    /// Raw per-record country entries for one zone over `window`.
    pub async fn fetch_geography(
        &self,
        zone_id: &str,
        window: &Window,
        token: &str,
    ) -> Result<Vec<CountryEntry>, ClientError> {
        let data = self.fetch(query::GEOGRAPHY, zone_id, window, token).await?;
        decode::decode_geography(&data).map_err(classify_decode)
    }

    /// Probe which zone tags a token can see at all (startup validation).
    pub async fn list_accessible_zones(&self, token: &str) -> Result<Vec<String>, ClientError> {
        let data = self.execute(PROBE_QUERY, json!({}), token).await?;
        decode::decode_zone_tags(&data).map_err(classify_decode)
    }
}

// An absent zone in a zone-filtered response is the empty-result shape,
// not a malformed one.
fn classify_decode(e: DecodeError) -> ClientError {
    match e {
        DecodeError::MissingZone => ClientError::NoData,
        other => ClientError::Decode(other),
    }
}
