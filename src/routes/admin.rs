use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Mutation Router Module
///
/// Every endpoint that changes the store. The whole router is wrapped in the
/// auth gate with `policy::TRAIL_MUTATE` in `create_router`, so only Admin
/// sessions reach these handlers; a User token is rejected with 403 before any
/// handler logic runs.
pub fn mutation_routes() -> Router<AppState> {
    Router::new()
        // POST /trails
        // Creates a trail (201) and records an audit row for the creator.
        // Duplicate names answer 406.
        .route("/trails", post(handlers::create_trail))
        // PUT/DELETE /trails/{id}
        // Partial update and delete. Delete applies the explicit cascade to
        // the trail's points, feature links and audit rows.
        .route(
            "/trails/{id}",
            put(handlers::update_trail).delete(handlers::delete_trail),
        )
        // POST /trails/{id}/points
        .route("/trails/{id}/points", post(handlers::add_point))
        // PUT/DELETE /trails/{id}/points/{point_id}
        // Points are always addressed through their trail so an id can never
        // be reached via the wrong parent.
        .route(
            "/trails/{id}/points/{point_id}",
            put(handlers::update_point).delete(handlers::delete_point),
        )
}
