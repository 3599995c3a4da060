use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Read Router Module
///
/// Every read-only resource endpoint. The whole router is wrapped in the auth
/// gate with `policy::TRAIL_READ` in `create_router`, so each handler here can
/// assume a validated Admin or User session and never re-checks roles itself.
pub fn read_routes() -> Router<AppState> {
    Router::new()
        // GET /trails
        // Lists all trails; an empty store answers 200 with an empty list.
        .route("/trails", get(handlers::list_trails))
        // GET /trails/{id}
        .route("/trails/{id}", get(handlers::get_trail))
        // GET /trails/{id}/points
        // A trail's location points in route order; 404 for unknown trails.
        .route("/trails/{id}/points", get(handlers::list_points))
        // GET /features
        // The feature catalogue (read-only; features are seeded out of band).
        .route("/features", get(handlers::list_features))
        // GET /logs
        // Audit rows recording who created which trail.
        .route("/logs", get(handlers::list_trail_logs))
}
