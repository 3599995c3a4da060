use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod policy;
pub mod repository;

// Module for routing segregation (Public, Read, Mutation).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the binary entry point (main.rs).
pub use config::AppConfig;
pub use identity::{AllowListRoleAssigner, HttpIdentityVerifier, TokenIssuer};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the service.
/// It aggregates all handler paths and data schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all handler functions here for documentation generation.
    paths(
        handlers::login, handlers::list_trails, handlers::get_trail,
        handlers::create_trail, handlers::update_trail, handlers::delete_trail,
        handlers::list_points, handlers::add_point, handlers::update_point,
        handlers::delete_point, handlers::list_features, handlers::list_trail_logs
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Trail, models::LocationPoint, models::Feature, models::TrailLog,
            models::CreateTrailRequest, models::UpdateTrailRequest,
            models::CreatePointRequest, models::UpdatePointRequest,
            models::LoginRequest, models::LoginResponse,
            auth::Role, error::ErrorBody,
        )
    ),
    tags(
        (name = "trail-service", description = "Hiking Trail Service API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across every request task.
/// The auth core only depends on `config` (signing secret) and `issuer`; the
/// repository is the thin resource collaborator behind the gate.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts store access behind the trait object.
    pub repo: RepositoryState,
    /// Token Issuer: external verification plus local signing.
    pub issuer: Arc<TokenIssuer>,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations let components selectively pull what they need from
// the shared AppState rather than receiving the whole state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(app_state: &AppState) -> Arc<TokenIssuer> {
        app_state.issuer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, binds the auth gate to each protected
/// router tier with its role policy, applies global middleware, and registers
/// the application state.
///
/// Role sets are bound here at registration time against the central tables
/// in `policy.rs`; handlers never carry their own role rules.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no gate.
        .merge(public::public_routes())
        // Read routes: Admin and User.
        .merge(
            authenticated::read_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                |state: State<AppState>, request: Request, next: Next| {
                    auth::authorize(state, policy::TRAIL_READ, request, next)
                },
            )),
        )
        // Mutating routes: Admin only.
        .merge(
            admin::mutation_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                |state: State<AppState>, request: Request, next: Next| {
                    auth::authorize(state, policy::TRAIL_MUTATE, request, next)
                },
            )),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique id for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span correlated by the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes TraceLayer span creation: pulls the `x-request-id` header (if
/// present) into the structured logging metadata alongside method and URI, so
/// every log line for one request, including the auth gate's rejection
/// reasons, shares a correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
