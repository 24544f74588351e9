//! Calculation history handlers, owner-isolated throughout.
//!
//! Reads of a calculation the caller does not own answer 404 with the same
//! body as a genuinely missing row, so record ids leak nothing about other
//! accounts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::dto::{CalculationCreate, CalculationRead};
use crate::api::error::{error_detail, internal_error, ApiError};
use crate::api::router::ApiState;
use crate::auth::guard::{self, Access};
use crate::auth::middleware::CurrentUser;
use crate::calc::{self, CalcError, Operation};
use crate::infrastructure::database::entities::calculation;

fn not_found() -> ApiError {
    error_detail(StatusCode::NOT_FOUND, "Calculation not found")
}

fn calc_error(e: CalcError) -> ApiError {
    error_detail(StatusCode::BAD_REQUEST, e.to_string())
}

/// Evaluate and persist a calculation for the given owner.
pub async fn record_calculation(
    state: &ApiState,
    owner_id: i64,
    a: f64,
    b: f64,
    operation: Operation,
) -> Result<calculation::Model, ApiError> {
    let result = calc::evaluate(a, b, operation).map_err(calc_error)?;

    calculation::ActiveModel {
        a: Set(a),
        b: Set(b),
        operation: Set(operation.as_str().to_string()),
        result: Set(result),
        created_at: Set(Utc::now()),
        user_id: Set(owner_id),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(internal_error)
}

/// Fetch a calculation the caller is allowed to see, or 404.
async fn owned_calculation(
    state: &ApiState,
    caller_id: i64,
    id: i64,
) -> Result<calculation::Model, ApiError> {
    let row = calculation::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(not_found)?;

    match guard::authorize(caller_id, row.user_id) {
        Access::Allowed => Ok(row),
        Access::Denied => Err(not_found()),
    }
}

#[utoipa::path(
    post,
    path = "/calculations",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    request_body = CalculationCreate,
    responses(
        (status = 201, description = "Calculation recorded", body = CalculationRead),
        (status = 400, description = "Undefined operation such as division by zero")
    )
)]
pub async fn create(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Json(request): Json<CalculationCreate>,
) -> Result<(StatusCode, Json<CalculationRead>), ApiError> {
    let row = record_calculation(&state, caller.id, request.a, request.b, request.operation).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    get,
    path = "/calculations",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's calculations, newest first", body = [CalculationRead])
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Result<Json<Vec<CalculationRead>>, ApiError> {
    let rows = calculation::Entity::find()
        .filter(calculation::Column::UserId.eq(caller.id))
        .order_by_desc(calculation::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/calculations/stats",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregate statistics over the caller's history")
    )
)]
pub async fn stats(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
) -> Result<Json<calc::stats::UserStats>, ApiError> {
    let rows = calculation::Entity::find()
        .filter(calculation::Column::UserId.eq(caller.id))
        .order_by_desc(calculation::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(Json(calc::stats::compute(&rows)))
}

#[utoipa::path(
    get,
    path = "/calculations/{id}",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The calculation", body = CalculationRead),
        (status = 404, description = "Not found")
    )
)]
pub async fn get(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<CalculationRead>, ApiError> {
    let row = owned_calculation(&state, caller.id, id).await?;
    Ok(Json(row.into()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculationUpdate {
    pub a: Option<f64>,
    pub b: Option<f64>,
    #[serde(rename = "type")]
    pub operation: Option<Operation>,
}

#[utoipa::path(
    put,
    path = "/calculations/{id}",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    request_body = CalculationUpdate,
    responses(
        (status = 200, description = "The updated calculation", body = CalculationRead),
        (status = 404, description = "Not found")
    )
)]
pub async fn update(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(request): Json<CalculationUpdate>,
) -> Result<Json<CalculationRead>, ApiError> {
    let row = owned_calculation(&state, caller.id, id).await?;

    let a = request.a.unwrap_or(row.a);
    let b = request.b.unwrap_or(row.b);
    let operation = match request.operation {
        Some(op) => op,
        None => Operation::parse(&row.operation).ok_or_else(|| {
            tracing::error!("stored calculation {} has unknown operation {:?}", row.id, row.operation);
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        })?,
    };
    let result = calc::evaluate(a, b, operation).map_err(calc_error)?;

    let mut active: calculation::ActiveModel = row.into();
    active.a = Set(a);
    active.b = Set(b);
    active.operation = Set(operation.as_str().to_string());
    active.result = Set(result);
    let updated = active.update(&state.db).await.map_err(internal_error)?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/calculations/{id}",
    tag = "Calculations",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete(
    State(state): State<ApiState>,
    Extension(CurrentUser(caller)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let row = owned_calculation(&state, caller.id, id).await?;

    calculation::Entity::delete_by_id(row.id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(StatusCode::NO_CONTENT)
}
