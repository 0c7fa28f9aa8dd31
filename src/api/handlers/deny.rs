use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::api::AppState;
use crate::error::AppResult;

/// [GET] /api/v1/deny
pub async fn summary(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let deny = state.filter.snapshot();
    let report = &deny.report;

    Ok(Json(json!({
        "ranges": deny.ranges.len(),
        "covered_addresses": deny.ranges.covered_addresses(),
        "max_denied_addresses": deny.max_denied_addresses,
        "parsed": report.parsed,
        "redundant": report.redundant,
        "skipped": report.skipped,
        "truncated": report.truncated,
        "built_at": deny.built_at.to_rfc3339(),
    })))
}
