//! Health check endpoint

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use crate::error::Result;
use crate::stats::HubStats;

use super::routes::{json_response, text_response, ServerState};

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    /// RFC 3339 time the report was built
    pub timestamp: String,
    pub port: u16,
    pub environment: String,
    /// Viewers connected right now
    pub connections: usize,
    /// Records in the store
    pub records: usize,
    pub stats: HubStats,
}

/// Build a health report from the running hub
pub async fn report(state: &ServerState) -> Result<HealthReport> {
    let stats = state.hub.stats().await?;

    Ok(HealthReport {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        port: state.config.bind_addr.port(),
        environment: state.config.environment.clone(),
        connections: stats.live_sessions,
        records: stats.records,
        stats,
    })
}

async fn encode(state: &ServerState) -> Result<Bytes> {
    let report = report(state).await?;
    Ok(Bytes::from(serde_json::to_vec(&report)?))
}

/// Respond to a health check
///
/// A stopped hub turns into `503`.
pub async fn respond(state: &ServerState) -> Response<Full<Bytes>> {
    match encode(state).await {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            text_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
