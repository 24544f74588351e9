//! Account handlers: registration, login, logout and profile management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};

use crate::api::dto::{
    LoginRequest, LoginResponse, PasswordChangeRequest, RegisterRequest, UserRead,
    UserUpdateRequest,
};
use crate::api::error::{error_detail, internal_error, ApiError};
use crate::api::router::ApiState;
use crate::api::validated_json::ValidatedJson;
use crate::auth::jwt::issue_token;
use crate::auth::middleware::{BearerToken, CurrentUser};
use crate::auth::password::{hash_password, verify_password};
use crate::infrastructure::database::entities::user;

fn hash_error(e: bcrypt::BcryptError) -> ApiError {
    tracing::error!("password hashing failed: {}", e);
    error_detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}

/// Map a write that raced a concurrent duplicate to 400.
///
/// The taken pre-checks give the friendly error in the common case, but two
/// concurrent requests can both pass them; the unique constraint is the
/// authority, so its violation gets the same 400 as the pre-check.
fn duplicate_or_internal(e: DbErr, message: &str) -> ApiError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            error_detail(StatusCode::BAD_REQUEST, message)
        }
        _ => internal_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserRead),
        (status = 400, description = "Username or email already registered")
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    let taken = user::Entity::find()
        .filter(
            user::Column::Username
                .eq(&request.username)
                .or(user::Column::Email.eq(&request.email)),
        )
        .one(&state.db)
        .await
        .map_err(internal_error)?;

    if taken.is_some() {
        return Err(error_detail(
            StatusCode::BAD_REQUEST,
            "Username or email already registered",
        ));
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        username: Set(request.username),
        email: Set(request.email),
        password_hash: Set(hash_password(&request.password).map_err(hash_error)?),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| duplicate_or_internal(e, "Username or email already registered"))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::error::ErrorDetail)
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // one message for unknown account and wrong password alike
    let invalid = || error_detail(StatusCode::UNAUTHORIZED, "Invalid credentials");

    let account = user::Entity::find()
        .filter(
            user::Column::Username
                .eq(&request.username_or_email)
                .or(user::Column::Email.eq(&request.username_or_email)),
        )
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &account.password_hash) {
        return Err(invalid());
    }

    let ttl = state.jwt.default_ttl();
    let token = issue_token(account.id, ttl, &state.jwt).map_err(|e| {
        tracing::error!("token issue failed: {}", e);
        error_detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    let now = Utc::now();
    state
        .sessions
        .record(&token, account.id, now, now + ttl)
        .await
        .map_err(internal_error)?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user_id: account.id,
    }))
}

#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session revoked"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<ApiState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.sessions.revoke(&token).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserRead),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(Extension(CurrentUser(account)): Extension<CurrentUser>) -> Json<UserRead> {
    Json(account.into())
}

#[utoipa::path(
    put,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "Updated account", body = UserRead),
        (status = 400, description = "Username or email already taken")
    )
)]
pub async fn update_me(
    State(state): State<ApiState>,
    Extension(CurrentUser(account)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<UserUpdateRequest>,
) -> Result<Json<UserRead>, ApiError> {
    if request.username.is_none() && request.email.is_none() {
        return Ok(Json(account.into()));
    }

    if let Some(username) = &request.username {
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Id.ne(account.id))
            .one(&state.db)
            .await
            .map_err(internal_error)?;
        if taken.is_some() {
            return Err(error_detail(
                StatusCode::BAD_REQUEST,
                "Username already taken",
            ));
        }
    }

    if let Some(email) = &request.email {
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::Id.ne(account.id))
            .one(&state.db)
            .await
            .map_err(internal_error)?;
        if taken.is_some() {
            return Err(error_detail(StatusCode::BAD_REQUEST, "Email already taken"));
        }
    }

    let mut active: user::ActiveModel = account.into();
    if let Some(username) = request.username {
        active.username = Set(username);
    }
    if let Some(email) = request.email {
        active.email = Set(email);
    }
    active.updated_at = Set(Utc::now());
    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| duplicate_or_internal(e, "Username or email already taken"))?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/users/me/password",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Invalid current password")
    )
)]
pub async fn change_password(
    State(state): State<ApiState>,
    Extension(CurrentUser(account)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<PasswordChangeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !verify_password(&request.current_password, &account.password_hash) {
        return Err(error_detail(
            StatusCode::UNAUTHORIZED,
            "Invalid current password",
        ));
    }

    let mut active: user::ActiveModel = account.into();
    active.password_hash = Set(hash_password(&request.new_password).map_err(hash_error)?);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await.map_err(internal_error)?;

    Ok(Json(serde_json::json!({ "message": "Password updated successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use sea_orm::DatabaseConnection;
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn account(username: &str, email: &str) -> user::ActiveModel {
        let now = Utc::now();
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set("x".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    // Both concurrent registrations pass the taken pre-check; the loser's
    // insert hits the unique constraint and must answer 400, not 500.
    #[tokio::test]
    async fn conflicting_insert_maps_to_bad_request() {
        let db = test_db().await;
        account("carol", "carol@example.com")
            .insert(&db)
            .await
            .unwrap();

        let err = account("carol", "other@example.com")
            .insert(&db)
            .await
            .unwrap_err();

        let (status, body) =
            duplicate_or_internal(err, "Username or email already registered");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0.detail.contains("already"));
    }

    #[tokio::test]
    async fn conflicting_update_maps_to_bad_request() {
        let db = test_db().await;
        account("carol", "carol@example.com")
            .insert(&db)
            .await
            .unwrap();
        let dave = account("dave", "dave@example.com")
            .insert(&db)
            .await
            .unwrap();

        let mut active: user::ActiveModel = dave.into();
        active.email = Set("carol@example.com".to_string());
        let err = active.update(&db).await.unwrap_err();

        let (status, body) = duplicate_or_internal(err, "Username or email already taken");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0.detail.contains("already"));
    }

    #[tokio::test]
    async fn other_store_errors_stay_internal() {
        let (status, _) = duplicate_or_internal(
            DbErr::Custom("connection lost".to_string()),
            "Username or email already registered",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
