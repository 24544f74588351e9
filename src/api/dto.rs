//! Request and response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::calc::Operation;
use crate::infrastructure::database::entities::{calculation, user};

// ── Users ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "must be 3 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "must be 6 to 72 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email, either resolves the same account.
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRead {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserRead {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserUpdateRequest {
    #[validate(length(min = 3, max = 50, message = "must be 3 to 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    #[validate(length(min = 6, max = 72, message = "must be 6 to 72 characters"))]
    pub new_password: String,
}

// ── Calculations ───────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculationCreate {
    pub a: f64,
    pub b: f64,
    #[serde(rename = "type")]
    pub operation: Operation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalculationRead {
    pub id: i64,
    pub a: f64,
    pub b: f64,
    #[serde(rename = "type")]
    pub operation: String,
    pub result: f64,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

impl From<calculation::Model> for CalculationRead {
    fn from(model: calculation::Model) -> Self {
        Self {
            id: model.id,
            a: model.a,
            b: model.b,
            operation: model.operation,
            result: model.result,
            timestamp: model.created_at,
            user_id: model.user_id,
        }
    }
}

// ── Legacy arithmetic ──────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalcRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalcResult {
    pub result: f64,
    pub calculation_id: i64,
}
