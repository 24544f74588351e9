//! HTTP error body shared by every handler.
//!
//! Failures are reported as `{"detail": "<message>"}` with the relevant
//! status code. Store errors are logged server-side and surfaced as an
//! opaque 500.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

pub type ApiError = (StatusCode, Json<ErrorDetail>);

pub fn error_detail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorDetail {
            detail: message.into(),
        }),
    )
}

pub fn internal_error(e: sea_orm::DbErr) -> ApiError {
    tracing::error!("database error: {}", e);
    error_detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}
