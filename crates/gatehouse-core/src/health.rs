use axum::http::StatusCode;

/// Handler for `GET /healthz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
