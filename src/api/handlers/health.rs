//! Health check handler

use axum::extract::State;
use axum::Json;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::{json, Value};

use crate::api::router::ApiState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health status")
    )
)]
pub async fn health(State(state): State<ApiState>) -> Json<Value> {
    let db_ok = state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1",
        ))
        .await
        .is_ok();

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": if db_ok { "up" } else { "down" },
    }))
}
