//! Legacy arithmetic endpoints.
//!
//! These predate accounts: anyone may call them. An authenticated caller
//! owns the resulting history row; anonymous requests attach to the reserved
//! anonymous account so every calculation still has an owner.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::dto::{CalcRequest, CalcResult, CalculationCreate, CalculationRead};
use crate::api::error::ApiError;
use crate::api::handlers::calculations::record_calculation;
use crate::api::router::ApiState;
use crate::auth::middleware::CurrentUser;
use crate::calc::Operation;

fn owner_id(state: &ApiState, caller: &Option<Extension<CurrentUser>>) -> i64 {
    match caller {
        Some(Extension(CurrentUser(account))) => account.id,
        None => state.anonymous_user_id,
    }
}

async fn run(
    state: ApiState,
    caller: Option<Extension<CurrentUser>>,
    request: CalcRequest,
    operation: Operation,
) -> Result<Json<CalcResult>, ApiError> {
    let owner = owner_id(&state, &caller);
    let row = record_calculation(&state, owner, request.x, request.y, operation).await?;
    Ok(Json(CalcResult {
        result: row.result,
        calculation_id: row.id,
    }))
}

#[utoipa::path(
    post,
    path = "/add",
    tag = "Arithmetic",
    request_body = CalcRequest,
    responses((status = 200, description = "Sum", body = CalcResult))
)]
pub async fn add(
    State(state): State<ApiState>,
    caller: Option<Extension<CurrentUser>>,
    Json(request): Json<CalcRequest>,
) -> Result<Json<CalcResult>, ApiError> {
    run(state, caller, request, Operation::Add).await
}

#[utoipa::path(
    post,
    path = "/subtract",
    tag = "Arithmetic",
    request_body = CalcRequest,
    responses((status = 200, description = "Difference", body = CalcResult))
)]
pub async fn subtract(
    State(state): State<ApiState>,
    caller: Option<Extension<CurrentUser>>,
    Json(request): Json<CalcRequest>,
) -> Result<Json<CalcResult>, ApiError> {
    run(state, caller, request, Operation::Subtract).await
}

#[utoipa::path(
    post,
    path = "/multiply",
    tag = "Arithmetic",
    request_body = CalcRequest,
    responses((status = 200, description = "Product", body = CalcResult))
)]
pub async fn multiply(
    State(state): State<ApiState>,
    caller: Option<Extension<CurrentUser>>,
    Json(request): Json<CalcRequest>,
) -> Result<Json<CalcResult>, ApiError> {
    run(state, caller, request, Operation::Multiply).await
}

#[utoipa::path(
    post,
    path = "/divide",
    tag = "Arithmetic",
    request_body = CalcRequest,
    responses(
        (status = 200, description = "Quotient", body = CalcResult),
        (status = 400, description = "Cannot divide by zero")
    )
)]
pub async fn divide(
    State(state): State<ApiState>,
    caller: Option<Extension<CurrentUser>>,
    Json(request): Json<CalcRequest>,
) -> Result<Json<CalcResult>, ApiError> {
    run(state, caller, request, Operation::Divide).await
}

#[utoipa::path(
    post,
    path = "/calculate",
    tag = "Arithmetic",
    request_body = CalculationCreate,
    responses(
        (status = 200, description = "Recorded calculation", body = CalculationRead),
        (status = 400, description = "Undefined operation such as division by zero")
    )
)]
pub async fn calculate(
    State(state): State<ApiState>,
    caller: Option<Extension<CurrentUser>>,
    Json(request): Json<CalculationCreate>,
) -> Result<Json<CalculationRead>, ApiError> {
    let owner = owner_id(&state, &caller);
    let row = record_calculation(&state, owner, request.a, request.b, request.operation).await?;
    Ok(Json(row.into()))
}
