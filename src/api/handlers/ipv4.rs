use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::client_ip::resolve_client_address;
use crate::api::AppState;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub result_message: String,
    pub client_ip: String,
}

impl ResponseData {
    pub fn authorized(client_ip: impl ToString) -> Self {
        Self { result_message: "Allow".to_string(), client_ip: client_ip.to_string() }
    }

    pub fn unauthorized(client_ip: impl ToString) -> Self {
        Self { result_message: "Deny".to_string(), client_ip: client_ip.to_string() }
    }
}

/// [GET] /ipv4
///
/// 200 `Allow`, 403 `Deny`, or 400 when the resolved address is not a
/// dotted-quad IPv4 address.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> AppResult<(StatusCode, Json<ResponseData>)> {
    let client_ip = resolve_client_address(&headers, peer);

    match state.filter.has_auth(&client_ip) {
        Ok(true) => {
            state.metrics.inc_allowed();
            Ok((StatusCode::OK, Json(ResponseData::authorized(client_ip))))
        }
        Ok(false) => {
            state.metrics.inc_denied();
            tracing::debug!("Denied client {}", client_ip);
            Ok((StatusCode::FORBIDDEN, Json(ResponseData::unauthorized(client_ip))))
        }
        Err(e) => {
            state.metrics.inc_invalid();
            Err(e)
        }
    }
}
