// Shared test helpers: fake GraphQL endpoint and fixtures

use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use zonewatch::config::{Account, Zone};

/// Serve `responder` as a GraphQL endpoint on an ephemeral port and return
/// its URL. The responder receives the posted body and returns the
/// response body.
pub async fn spawn_remote<F>(responder: F) -> String
where
    F: Fn(Value) -> Value + Clone + Send + Sync + 'static,
{
    let app = Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| {
            let responder = responder.clone();
            async move { Json(responder(body)) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Endpoint answering every request with a fixed HTTP status and empty body.
#[allow(dead_code)]
pub async fn spawn_status_remote(status: axum::http::StatusCode) -> String {
    let app = Router::new().route("/", post(move || async move { status }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Route a request body to a canned response by inspecting the query text.
#[allow(dead_code)]
pub fn dispatch_by_shape(body: &Value, daily: Value, hourly: Value, geo: Value) -> Value {
    let query = body["query"].as_str().unwrap_or("");
    if query.contains("1hGroups") {
        hourly
    } else if query.contains("countryMap") {
        geo
    } else {
        daily
    }
}

#[allow(dead_code)]
pub fn daily_ok() -> Value {
    json!({
        "data": { "viewer": { "zones": [ { "httpRequests1dGroups": [
            {
                "dimensions": { "date": "2024-01-01" },
                "sum": {
                    "requests": 100,
                    "bytes": 2048,
                    "threats": 1,
                    "cachedRequests": 40,
                    "cachedBytes": 800
                }
            }
        ] } ] } }
    })
}

#[allow(dead_code)]
pub fn hourly_ok() -> Value {
    json!({
        "data": { "viewer": { "zones": [ { "httpRequests1hGroups": [
            {
                "dimensions": { "datetime": "2024-01-01T05:00:00Z" },
                "sum": {
                    "requests": 10,
                    "bytes": 512,
                    "threats": 0,
                    "cachedRequests": 4,
                    "cachedBytes": 128
                }
            }
        ] } ] } }
    })
}

#[allow(dead_code)]
pub fn geo_ok() -> Value {
    json!({
        "data": { "viewer": { "zones": [ { "httpRequests1dGroups": [
            { "sum": { "countryMap": [
                { "clientCountryName": "US", "requests": 10, "bytes": 100, "threats": 0 },
                { "clientCountryName": "DE", "requests": 5, "bytes": 50, "threats": 1 }
            ] } },
            { "sum": { "countryMap": [
                { "clientCountryName": "US", "requests": 20, "bytes": 200, "threats": 2 }
            ] } }
        ] } ] } }
    })
}

#[allow(dead_code)]
pub fn remote_error(message: &str) -> Value {
    json!({ "data": null, "errors": [ { "message": message } ] })
}

#[allow(dead_code)]
pub fn account(name: &str, token: &str, zones: &[(&str, &str)]) -> Account {
    Account {
        name: name.to_string(),
        token: token.to_string(),
        zones: zones
            .iter()
            .map(|(zone_id, domain)| Zone {
                zone_id: zone_id.to_string(),
                domain: domain.to_string(),
            })
            .collect(),
    }
}
