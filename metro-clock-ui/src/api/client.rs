//! HTTP API Client
//!
//! Fetches the dashboard snapshot from the server that serves this page.

use gloo_net::http::Request;

use crate::model::Snapshot;

/// Summary endpoint, relative to the page origin
pub const SUMMARY_PATH: &str = "/v1/summary";

/// Fetch and decode one snapshot. Non-2xx statuses and undecodable bodies
/// are errors.
pub async fn fetch_summary() -> Result<Snapshot, String> {
    let response = Request::get(SUMMARY_PATH)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(format!(
            "Summary request failed: {} {}",
            response.status(),
            response.status_text()
        ));
    }

    response
        .json::<Snapshot>()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}
