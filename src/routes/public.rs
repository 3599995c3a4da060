use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session token. Everything else in the service
/// sits behind the auth gate; this module is deliberately tiny.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // The token-issuance gateway: credentials go out to the external
        // verifier, a signed session token comes back. This is the only
        // endpoint that ever sees a password.
        .route("/login", post(handlers::login))
}
