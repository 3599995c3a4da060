use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::CurrentUser,
    error::ApiError,
    models::{
        CreatePointRequest, CreateTrailRequest, Feature, LocationPoint, LoginRequest,
        LoginResponse, Trail, TrailLog, UpdatePointRequest, UpdateTrailRequest,
    },
};

// --- Validation Helpers ---

/// Range checks shared by point creation and update. Malformed coordinates are
/// a client error, not a database constraint violation.
fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ApiError> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::Validation("latitude out of range".to_string()));
        }
    }
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::Validation("longitude out of range".to_string()));
        }
    }
    Ok(())
}

// --- Handlers ---

/// login
///
/// [Public Route] Exchanges credentials for a signed session token.
///
/// The heavy lifting happens in the Token Issuer: external verification,
/// identity mapping, and signing. This handler only validates the payload
/// shape and translates the outcome to HTTP.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
        (status = 500, description = "Malformed verifier response", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let issued = state.issuer.issue(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        token: issued.token,
        role: issued.role,
    }))
}

/// list_trails
///
/// [Read Route] Lists every trail. An empty system yields an empty list, not a 404.
#[utoipa::path(
    get,
    path = "/trails",
    responses((status = 200, description = "All trails", body = [Trail]))
)]
pub async fn list_trails(State(state): State<AppState>) -> Json<Vec<Trail>> {
    Json(state.repo.list_trails().await)
}

/// get_trail
///
/// [Read Route] Retrieves a single trail by ID.
#[utoipa::path(
    get,
    path = "/trails/{id}",
    params(("id" = i32, Path, description = "Trail ID")),
    responses(
        (status = 200, description = "Found", body = Trail),
        (status = 404, description = "Unknown trail", body = crate::error::ErrorBody)
    )
)]
pub async fn get_trail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Trail>, ApiError> {
    match state.repo.get_trail(id).await {
        Some(trail) => Ok(Json(trail)),
        None => Err(ApiError::NotFound),
    }
}

/// create_trail
///
/// [Mutating Route] Creates a trail and records an audit log row attributing it
/// to the authenticated subject.
///
/// *Uniqueness*: a name collision answers 406, matching the duplicate-resource
/// contract rather than a generic conflict.
#[utoipa::path(
    post,
    path = "/trails",
    request_body = CreateTrailRequest,
    responses(
        (status = 201, description = "Created", body = Trail),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 406, description = "Trail name already exists", body = crate::error::ErrorBody)
    )
)]
pub async fn create_trail(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateTrailRequest>,
) -> Result<(StatusCode, Json<Trail>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    if state.repo.get_trail_by_name(&payload.name).await.is_some() {
        return Err(ApiError::Duplicate(payload.name));
    }

    let trail = state
        .repo
        .create_trail(payload)
        .await
        .ok_or(ApiError::Internal)?;

    state.repo.record_trail_log(trail.id, &user.subject).await;

    Ok((StatusCode::CREATED, Json(trail)))
}

/// update_trail
///
/// [Mutating Route] Partially updates a trail; absent fields keep their values.
#[utoipa::path(
    put,
    path = "/trails/{id}",
    params(("id" = i32, Path, description = "Trail ID")),
    request_body = UpdateTrailRequest,
    responses(
        (status = 200, description = "Updated", body = Trail),
        (status = 404, description = "Unknown trail", body = crate::error::ErrorBody),
        (status = 406, description = "Trail name already exists", body = crate::error::ErrorBody)
    )
)]
pub async fn update_trail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTrailRequest>,
) -> Result<Json<Trail>, ApiError> {
    // A rename must not collide with another trail's name.
    if let Some(name) = &payload.name {
        if let Some(existing) = state.repo.get_trail_by_name(name).await {
            if existing.id != id {
                return Err(ApiError::Duplicate(name.clone()));
            }
        }
    }

    match state.repo.update_trail(id, payload).await {
        Some(trail) => Ok(Json(trail)),
        None => Err(ApiError::NotFound),
    }
}

/// delete_trail
///
/// [Mutating Route] Deletes a trail and, by the explicit cascade rule, its
/// location points, feature links and audit rows.
#[utoipa::path(
    delete,
    path = "/trails/{id}",
    params(("id" = i32, Path, description = "Trail ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown trail", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_trail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_trail(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_points
///
/// [Read Route] Lists a trail's location points in route order. The trail must
/// exist; an unknown trail is a 404 even though the point list itself may be empty.
#[utoipa::path(
    get,
    path = "/trails/{id}/points",
    params(("id" = i32, Path, description = "Trail ID")),
    responses(
        (status = 200, description = "Ordered points", body = [LocationPoint]),
        (status = 404, description = "Unknown trail", body = crate::error::ErrorBody)
    )
)]
pub async fn list_points(
    State(state): State<AppState>,
    Path(trail_id): Path<i32>,
) -> Result<Json<Vec<LocationPoint>>, ApiError> {
    if state.repo.get_trail(trail_id).await.is_none() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(state.repo.list_points(trail_id).await))
}

/// add_point
///
/// [Mutating Route] Appends a location point to an existing trail.
#[utoipa::path(
    post,
    path = "/trails/{id}/points",
    params(("id" = i32, Path, description = "Trail ID")),
    request_body = CreatePointRequest,
    responses(
        (status = 201, description = "Created", body = LocationPoint),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown trail", body = crate::error::ErrorBody)
    )
)]
pub async fn add_point(
    State(state): State<AppState>,
    Path(trail_id): Path<i32>,
    Json(payload): Json<CreatePointRequest>,
) -> Result<(StatusCode, Json<LocationPoint>), ApiError> {
    check_coordinates(Some(payload.latitude), Some(payload.longitude))?;
    if payload.ordinal < 1 {
        return Err(ApiError::Validation("ordinal must be positive".to_string()));
    }

    if state.repo.get_trail(trail_id).await.is_none() {
        return Err(ApiError::NotFound);
    }

    let point = state
        .repo
        .add_point(trail_id, payload)
        .await
        .ok_or(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(point)))
}

/// update_point
///
/// [Mutating Route] Partially updates a point, addressed through its trail.
#[utoipa::path(
    put,
    path = "/trails/{id}/points/{point_id}",
    params(
        ("id" = i32, Path, description = "Trail ID"),
        ("point_id" = i32, Path, description = "Location point ID")
    ),
    request_body = UpdatePointRequest,
    responses(
        (status = 200, description = "Updated", body = LocationPoint),
        (status = 400, description = "Validation failure", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown trail or point", body = crate::error::ErrorBody)
    )
)]
pub async fn update_point(
    State(state): State<AppState>,
    Path((trail_id, point_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdatePointRequest>,
) -> Result<Json<LocationPoint>, ApiError> {
    check_coordinates(payload.latitude, payload.longitude)?;
    if matches!(payload.ordinal, Some(o) if o < 1) {
        return Err(ApiError::Validation("ordinal must be positive".to_string()));
    }

    match state.repo.update_point(trail_id, point_id, payload).await {
        Some(point) => Ok(Json(point)),
        None => Err(ApiError::NotFound),
    }
}

/// delete_point
///
/// [Mutating Route] Removes a single point from a trail.
#[utoipa::path(
    delete,
    path = "/trails/{id}/points/{point_id}",
    params(
        ("id" = i32, Path, description = "Trail ID"),
        ("point_id" = i32, Path, description = "Location point ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown trail or point", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_point(
    State(state): State<AppState>,
    Path((trail_id, point_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_point(trail_id, point_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_features
///
/// [Read Route] Lists the catalogue of named trail features.
#[utoipa::path(
    get,
    path = "/features",
    responses((status = 200, description = "All features", body = [Feature]))
)]
pub async fn list_features(State(state): State<AppState>) -> Json<Vec<Feature>> {
    Json(state.repo.list_features().await)
}

/// list_trail_logs
///
/// [Read Route] Lists the audit rows recorded for trail creations, newest first.
#[utoipa::path(
    get,
    path = "/logs",
    responses((status = 200, description = "Audit log", body = [TrailLog]))
)]
pub async fn list_trail_logs(State(state): State<AppState>) -> Json<Vec<TrailLog>> {
    Json(state.repo.list_trail_logs().await)
}
