use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::auth::Role;

// --- Core Application Schemas (Mapped to Database) ---

/// Trail
///
/// A hiking trail record from the `trails` table. Trail names are unique;
/// a collision on create is reported as a duplicate-resource error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Trail {
    pub id: i32,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub difficulty: String,
    pub location: String,
    pub length_km: f64,
    pub elevation_gain: f64,
    pub route_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// LocationPoint
///
/// One geographic point on a trail. Points belong to exactly one trail and
/// carry an `ordinal` giving their position along the route; deleting the
/// trail removes its points as an explicit application-level cascade.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct LocationPoint {
    pub id: i32,
    pub trail_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    /// 1-based position of this point along the trail.
    pub ordinal: i32,
}

/// Feature
///
/// A named trail attribute (e.g. "Waterfall") from the `features` table,
/// linked to trails through the `trail_features` join table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Feature {
    pub id: i32,
    pub name: String,
}

/// TrailLog
///
/// An audit row recorded when a trail is created, attributing the change to
/// the session subject that performed it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct TrailLog {
    pub id: i64,
    pub trail_id: i32,
    pub added_by: String,
    pub logged_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---
//
// All payloads use container-level `serde(default)`: a missing field arrives as
// its Default value and is caught by explicit validation with a 400, instead of
// surfacing as a deserializer rejection.

/// LoginRequest
///
/// Credentials for POST /login. Transient: forwarded to the external verifier
/// and discarded, never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// The issued session token and the role it carries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// CreateTrailRequest
///
/// Input payload for POST /trails.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct CreateTrailRequest {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub difficulty: String,
    pub location: String,
    pub length_km: f64,
    pub elevation_gain: f64,
    pub route_type: String,
}

/// UpdateTrailRequest
///
/// Partial update payload for PUT /trails/{id}. `Option<T>` fields plus
/// `skip_serializing_if` keep the JSON minimal and let the repository apply
/// a COALESCE-based partial update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct UpdateTrailRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_km: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_type: Option<String>,
}

/// CreatePointRequest
///
/// Input payload for POST /trails/{id}/points. Coordinates are range-checked
/// before insertion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct CreatePointRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub ordinal: i32,
}

/// UpdatePointRequest
///
/// Partial update payload for PUT /trails/{id}/points/{point_id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct UpdatePointRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i32>,
}
