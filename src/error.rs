use thiserror::Error;

/// Label returned in place of the client address when it fails validation.
pub const INVALID_IP_LABEL: &str = "Invalid IP";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// A deny-list entry or a client address does not match the IPv4/CIDR grammar.
    #[error("Invalid format: {0}")]
    Format(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::Json;
        use serde_json::json;

        let AppError::Format(detail) = &self;
        tracing::debug!("Rejected client address: {}", detail);
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "resultMessage": "Deny", "clientIp": INVALID_IP_LABEL })),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
