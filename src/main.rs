//! Calculation service entry point.
//!
//! Reads configuration from TOML file (~/.config/calc-service/config.toml),
//! runs migrations and serves the HTTP API.

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use calc_service::api::{create_api_router, ApiState};
use calc_service::auth::anonymous::ensure_anonymous_user;
use calc_service::auth::jwt::JwtConfig;
use calc_service::config::{default_config_path, init_tracing, AppConfig};
use calc_service::infrastructure::database::migrator::Migrator;
use calc_service::infrastructure::init_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("CALC_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    };

    info!("Starting calculation service...");

    info!("Database: {}", config.database.url);

    let jwt = JwtConfig {
        secret: config.security.jwt_secret.clone(),
        expire_minutes: config.security.access_token_expire_minutes,
    };
    info!(
        "Access tokens expire after {} minutes",
        jwt.expire_minutes
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }

    let anonymous_user_id = ensure_anonymous_user(&db).await?;
    info!("Anonymous account ready (id {})", anonymous_user_id);

    // ── HTTP server ────────────────────────────────────────────
    let router = create_api_router(ApiState::new(db, jwt, anonymous_user_id));

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);
    info!("Swagger UI at http://{}/docs", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received");
    }
}
