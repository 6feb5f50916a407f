//! DealFlow Platform Server
//!
//! Production server for the deal-pipeline REST APIs:
//! - Auth APIs: login, refresh-token rotation, logout
//! - Deal APIs: CRUD, notes, admin value management
//! - Admin APIs: users, audit logs
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DF_API_PORT` | `8080` | HTTP API port |
//! | `DF_METRICS_PORT` | `9090` | Metrics/health port |
//! | `DF_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `DF_MONGO_DB` | `dealflow` | MongoDB database name |
//! | `DF_JWT_SECRET` | dev default | HS256 signing secret |
//! | `DF_JWT_ISSUER` | `dealflow` | JWT issuer claim |
//! | `DF_ACCESS_TOKEN_TTL_SECS` | `900` | Access token TTL |
//! | `DF_REFRESH_TOKEN_TTL_SECS` | `604800` | Refresh token validity (7 days) |
//! | `DF_DEV_MODE` | `false` | Seed development data on startup |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Extension, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use df_platform::api::{
    audit_logs_router, auth_router, deals_router, users_router, AppState, AuditLogsState,
    AuthApiState, DealsState, PlatformApiDoc, UsersState,
};
use df_platform::repository::{
    ensure_indexes, AuditLogRepository, DealRepository, RefreshTokenRepository, UserRepository,
};
use df_platform::seed::DevDataSeeder;
use df_platform::service::{
    AuditService, AuthConfig, AuthService, DealService, PasswordService, RefreshTokenLedger,
    SessionService, UserService,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting DealFlow Platform Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("DF_API_PORT", 8080);
    let metrics_port: u16 = env_or_parse("DF_METRICS_PORT", 9090);
    let mongo_url = env_or("DF_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("DF_MONGO_DB", "dealflow");

    let default_auth = AuthConfig::default();
    let auth_config = AuthConfig {
        secret_key: match std::env::var("DF_JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                warn!("DF_JWT_SECRET not set, using development default");
                default_auth.secret_key.clone()
            }
        },
        issuer: env_or("DF_JWT_ISSUER", &default_auth.issuer),
        access_token_expiry_secs: env_or_parse(
            "DF_ACCESS_TOKEN_TTL_SECS",
            default_auth.access_token_expiry_secs,
        ),
        refresh_token_expiry_secs: env_or_parse(
            "DF_REFRESH_TOKEN_TTL_SECS",
            default_auth.refresh_token_expiry_secs,
        ),
    };

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);
    ensure_indexes(&db).await?;

    // Repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let refresh_token_repo = Arc::new(RefreshTokenRepository::new(&db));
    let deal_repo = Arc::new(DealRepository::new(&db));
    let audit_log_repo = Arc::new(AuditLogRepository::new(&db));
    info!("Repositories initialized");

    // Services
    let refresh_ttl = auth_config.refresh_token_expiry_secs;
    let auth_service = Arc::new(AuthService::new(auth_config));
    let password_service = Arc::new(PasswordService::default());
    let ledger = Arc::new(
        RefreshTokenLedger::new(refresh_token_repo.clone()).with_validity_secs(refresh_ttl),
    );
    let audit_service = Arc::new(AuditService::new(audit_log_repo.clone()));
    let session_service = Arc::new(
        SessionService::new(
            user_repo.clone(),
            password_service.clone(),
            auth_service.clone(),
            ledger,
        )
        .with_audit(audit_service.clone()),
    );
    let user_service = Arc::new(UserService::new(user_repo.clone(), password_service));
    let deal_service = Arc::new(DealService::new(deal_repo));
    info!("Services initialized");

    // Seed development data if in dev mode
    let dev_mode = std::env::var("DF_DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if dev_mode {
        let seeder = DevDataSeeder::new(user_service.clone(), deal_service.clone());
        if let Err(e) = seeder.seed().await {
            warn!("Dev data seeding skipped (data may already exist): {}", e);
        }
    }

    // Shared auth state for the Authenticated extractor
    let app_state = AppState {
        auth_service,
        users: user_repo,
    };

    let auth_state = AuthApiState {
        sessions: session_service,
    };
    let users_state = UsersState {
        user_service,
        audit_service: Some(audit_service.clone()),
    };
    let deals_state = DealsState {
        deal_service,
        audit_service: Some(audit_service),
    };
    let audit_logs_state = AuditLogsState {
        audit_log_store: audit_log_repo,
    };

    let app = Router::new()
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/users", users_router(users_state))
        .nest("/api/deals", deals_router(deals_state))
        .nest("/api/audit-logs", audit_logs_router(audit_logs_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", PlatformApiDoc::openapi()))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        axum::serve(api_listener, app).await.unwrap();
    });

    // Start metrics server
    let metrics_addr = format!("0.0.0.0:{}", metrics_port);
    info!("Metrics server listening on http://{}/metrics", metrics_addr);

    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    let metrics_listener = TcpListener::bind(&metrics_addr).await?;
    let metrics_task = tokio::spawn(async move {
        axum::serve(metrics_listener, metrics_app).await.unwrap();
    });

    info!("DealFlow Platform Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();
    metrics_task.abort();

    info!("DealFlow Platform Server shutdown complete");
    Ok(())
}

async fn metrics_handler() -> &'static str {
    "# HELP df_platform_up Platform is up\n# TYPE df_platform_up gauge\ndf_platform_up 1\n"
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
