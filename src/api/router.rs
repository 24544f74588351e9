//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt::JwtConfig;
use crate::auth::middleware::{optional_auth, require_auth, AuthState};
use crate::auth::session::SessionRegistry;

use super::handlers::{arithmetic, calculations, health, users};

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub db: DatabaseConnection,
    pub jwt: JwtConfig,
    pub sessions: SessionRegistry,
    /// Owner of record for calculations made without credentials.
    pub anonymous_user_id: i64,
}

impl ApiState {
    pub fn new(db: DatabaseConnection, jwt: JwtConfig, anonymous_user_id: i64) -> Self {
        let sessions = SessionRegistry::new(db.clone());
        Self {
            db,
            jwt,
            sessions,
            anonymous_user_id,
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Users
        users::register,
        users::login,
        users::logout,
        users::me,
        users::update_me,
        users::change_password,
        // Calculations
        calculations::create,
        calculations::list,
        calculations::stats,
        calculations::get,
        calculations::update,
        calculations::delete,
        // Arithmetic
        arithmetic::add,
        arithmetic::subtract,
        arithmetic::multiply,
        arithmetic::divide,
        arithmetic::calculate,
    ),
    components(
        schemas(
            crate::api::error::ErrorDetail,
            crate::api::dto::RegisterRequest,
            crate::api::dto::LoginRequest,
            crate::api::dto::LoginResponse,
            crate::api::dto::UserRead,
            crate::api::dto::UserUpdateRequest,
            crate::api::dto::PasswordChangeRequest,
            crate::api::dto::CalculationCreate,
            crate::api::dto::CalculationRead,
            crate::api::dto::CalcRequest,
            crate::api::dto::CalcResult,
            calculations::CalculationUpdate,
            crate::calc::Operation,
            crate::calc::stats::UserStats,
            crate::calc::stats::RecentCalculation,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Users", description = "Account registration, login (JWT), logout and profile management"),
        (name = "Calculations", description = "Per-account calculation history"),
        (name = "Arithmetic", description = "Legacy arithmetic endpoints, usable without an account"),
    ),
    info(
        title = "Calculation Service API",
        version = "1.0.0",
        description = "REST API for authenticated calculations with per-account history"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let auth_state = AuthState::new(state.db.clone(), state.jwt.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Account routes (public)
    let user_routes = Router::new()
        .route("/", post(users::register))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .with_state(state.clone());

    // Account routes (protected)
    let user_protected_routes = Router::new()
        .route("/logout", post(users::logout))
        .route("/me", get(users::me).put(users::update_me))
        .route("/me/password", post(users::change_password))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ))
        .with_state(state.clone());

    // Calculation history routes (protected)
    let calculation_routes = Router::new()
        .route("/", post(calculations::create).get(calculations::list))
        .route("/stats", get(calculations::stats))
        .route(
            "/{id}",
            get(calculations::get)
                .put(calculations::update)
                .delete(calculations::delete),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ))
        .with_state(state.clone());

    // Legacy arithmetic routes (auth optional)
    let arithmetic_routes = Router::new()
        .route("/add", post(arithmetic::add))
        .route("/subtract", post(arithmetic::subtract))
        .route("/multiply", post(arithmetic::multiply))
        .route("/divide", post(arithmetic::divide))
        .route("/calculate", post(arithmetic::calculate))
        .layer(middleware::from_fn_with_state(auth_state, optional_auth))
        .with_state(state.clone());

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health))
        .nest("/users", user_routes.merge(user_protected_routes))
        .nest("/calculations", calculation_routes)
        .merge(arithmetic_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
