use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trail_service::{
    AllowListRoleAssigner, AppConfig, AppState, HttpIdentityVerifier, PostgresRepository,
    RepositoryState, TokenIssuer,
    config::Env,
    create_router,
    identity::VerifierState,
};

/// main
///
/// The asynchronous entry point, responsible for initializing all core
/// components: configuration, logging, database, the token issuer, and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trail_service=debug,tower_http=info,axum=trace".into());

    // 3. Initialize logging based on environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for human readability during development.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Token Issuer Assembly
    // External verifier (with explicit timeout) plus the configured admin
    // allow-list behind the role-assignment strategy.
    let verifier = Arc::new(HttpIdentityVerifier::new(&config)) as VerifierState;
    let roles = Arc::new(AllowListRoleAssigner::new(&config.admin_emails));
    let issuer = Arc::new(TokenIssuer::new(verifier, roles, config.clone()));

    // 6. Unified State Assembly
    let app_state = AppState {
        repo,
        issuer,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:8000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:8000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:8000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
