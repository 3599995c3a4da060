use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::{
    CreatePointRequest, CreateTrailRequest, Feature, LocationPoint, Trail, TrailLog,
    UpdatePointRequest, UpdateTrailRequest,
};

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers only
/// see this trait, never the concrete store, which keeps the resource layer the
/// thin collaborator it is meant to be and lets tests substitute an in-memory
/// implementation.
///
/// **Send + Sync + async_trait** are required so the trait object
/// (`Arc<dyn Repository>`) can be shared across axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Trails ---
    async fn list_trails(&self) -> Vec<Trail>;
    async fn get_trail(&self, id: i32) -> Option<Trail>;
    // Uniqueness probe used by the duplicate-name check on create.
    async fn get_trail_by_name(&self, name: &str) -> Option<Trail>;
    async fn create_trail(&self, req: CreateTrailRequest) -> Option<Trail>;
    // Partial update via COALESCE; None means the trail does not exist.
    async fn update_trail(&self, id: i32, req: UpdateTrailRequest) -> Option<Trail>;
    // Explicit application-level cascade: points, feature links and logs go
    // with the trail, in one transaction.
    async fn delete_trail(&self, id: i32) -> bool;

    // --- Location Points ---
    async fn list_points(&self, trail_id: i32) -> Vec<LocationPoint>;
    async fn add_point(&self, trail_id: i32, req: CreatePointRequest) -> Option<LocationPoint>;
    async fn update_point(
        &self,
        trail_id: i32,
        point_id: i32,
        req: UpdatePointRequest,
    ) -> Option<LocationPoint>;
    async fn delete_point(&self, trail_id: i32, point_id: i32) -> bool;

    // --- Features & Audit ---
    async fn list_features(&self) -> Vec<Feature>;
    async fn list_trail_logs(&self) -> Vec<TrailLog>;
    // Best-effort audit row; failures are logged, never surfaced to the client.
    async fn record_trail_log(&self, trail_id: i32, added_by: &str);
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TRAIL_COLUMNS: &str = "id, name, summary, description, difficulty, location, \
     length_km, elevation_gain, route_type, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_trails(&self) -> Vec<Trail> {
        let sql = format!("SELECT {TRAIL_COLUMNS} FROM trails ORDER BY name ASC");
        match sqlx::query_as::<_, Trail>(&sql).fetch_all(&self.pool).await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("list_trails error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_trail(&self, id: i32) -> Option<Trail> {
        let sql = format!("SELECT {TRAIL_COLUMNS} FROM trails WHERE id = $1");
        sqlx::query_as::<_, Trail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_trail error: {:?}", e);
                None
            })
    }

    async fn get_trail_by_name(&self, name: &str) -> Option<Trail> {
        let sql = format!("SELECT {TRAIL_COLUMNS} FROM trails WHERE name = $1");
        sqlx::query_as::<_, Trail>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_trail_by_name error: {:?}", e);
                None
            })
    }

    async fn create_trail(&self, req: CreateTrailRequest) -> Option<Trail> {
        let sql = format!(
            "INSERT INTO trails \
                 (name, summary, description, difficulty, location, length_km, \
                  elevation_gain, route_type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) \
             RETURNING {TRAIL_COLUMNS}"
        );
        sqlx::query_as::<_, Trail>(&sql)
            .bind(req.name)
            .bind(req.summary)
            .bind(req.description)
            .bind(req.difficulty)
            .bind(req.location)
            .bind(req.length_km)
            .bind(req.elevation_gain)
            .bind(req.route_type)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("create_trail error: {:?}", e);
                None
            })
    }

    /// Partial update: COALESCE only overwrites the columns present in `req`.
    async fn update_trail(&self, id: i32, req: UpdateTrailRequest) -> Option<Trail> {
        let sql = format!(
            "UPDATE trails \
             SET name = COALESCE($2, name), \
                 summary = COALESCE($3, summary), \
                 description = COALESCE($4, description), \
                 difficulty = COALESCE($5, difficulty), \
                 location = COALESCE($6, location), \
                 length_km = COALESCE($7, length_km), \
                 elevation_gain = COALESCE($8, elevation_gain), \
                 route_type = COALESCE($9, route_type), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TRAIL_COLUMNS}"
        );
        sqlx::query_as::<_, Trail>(&sql)
            .bind(id)
            .bind(req.name)
            .bind(req.summary)
            .bind(req.description)
            .bind(req.difficulty)
            .bind(req.location)
            .bind(req.length_km)
            .bind(req.elevation_gain)
            .bind(req.route_type)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_trail error: {:?}", e);
                None
            })
    }

    /// delete_trail
    ///
    /// The cascade rule lives here, not in the schema: dependent rows are
    /// removed explicitly inside one transaction so the behavior is visible in
    /// application code and an interrupted delete leaves nothing half-removed.
    async fn delete_trail(&self, id: i32) -> bool {
        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!("delete_trail begin error: {:?}", e);
                return false;
            }
        };

        let steps = [
            "DELETE FROM location_points WHERE trail_id = $1",
            "DELETE FROM trail_features WHERE trail_id = $1",
            "DELETE FROM trail_logs WHERE trail_id = $1",
        ];
        for sql in steps {
            if let Err(e) = sqlx::query(sql).bind(id).execute(&mut *tx).await {
                tracing::error!("delete_trail cascade error: {:?}", e);
                return false;
            }
        }

        let deleted = match sqlx::query("DELETE FROM trails WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_trail error: {:?}", e);
                return false;
            }
        };

        match tx.commit().await {
            Ok(()) => deleted,
            Err(e) => {
                tracing::error!("delete_trail commit error: {:?}", e);
                false
            }
        }
    }

    async fn list_points(&self, trail_id: i32) -> Vec<LocationPoint> {
        match sqlx::query_as::<_, LocationPoint>(
            "SELECT id, trail_id, latitude, longitude, ordinal \
             FROM location_points WHERE trail_id = $1 ORDER BY ordinal ASC",
        )
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("list_points error: {:?}", e);
                vec![]
            }
        }
    }

    async fn add_point(&self, trail_id: i32, req: CreatePointRequest) -> Option<LocationPoint> {
        sqlx::query_as::<_, LocationPoint>(
            "INSERT INTO location_points (trail_id, latitude, longitude, ordinal) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, trail_id, latitude, longitude, ordinal",
        )
        .bind(trail_id)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.ordinal)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("add_point error: {:?}", e);
            None
        })
    }

    /// Point updates are scoped to the (trail, point) pair so a point id can
    /// never be addressed through the wrong trail.
    async fn update_point(
        &self,
        trail_id: i32,
        point_id: i32,
        req: UpdatePointRequest,
    ) -> Option<LocationPoint> {
        sqlx::query_as::<_, LocationPoint>(
            "UPDATE location_points \
             SET latitude = COALESCE($3, latitude), \
                 longitude = COALESCE($4, longitude), \
                 ordinal = COALESCE($5, ordinal) \
             WHERE id = $2 AND trail_id = $1 \
             RETURNING id, trail_id, latitude, longitude, ordinal",
        )
        .bind(trail_id)
        .bind(point_id)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.ordinal)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_point error: {:?}", e);
            None
        })
    }

    async fn delete_point(&self, trail_id: i32, point_id: i32) -> bool {
        match sqlx::query("DELETE FROM location_points WHERE id = $2 AND trail_id = $1")
            .bind(trail_id)
            .bind(point_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_point error: {:?}", e);
                false
            }
        }
    }

    async fn list_features(&self) -> Vec<Feature> {
        match sqlx::query_as::<_, Feature>("SELECT id, name FROM features ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
        {
            Ok(f) => f,
            Err(e) => {
                tracing::error!("list_features error: {:?}", e);
                vec![]
            }
        }
    }

    async fn list_trail_logs(&self) -> Vec<TrailLog> {
        match sqlx::query_as::<_, TrailLog>(
            "SELECT id, trail_id, added_by, logged_at \
             FROM trail_logs ORDER BY logged_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("list_trail_logs error: {:?}", e);
                vec![]
            }
        }
    }

    async fn record_trail_log(&self, trail_id: i32, added_by: &str) {
        if let Err(e) = sqlx::query(
            "INSERT INTO trail_logs (trail_id, added_by, logged_at) VALUES ($1, $2, NOW())",
        )
        .bind(trail_id)
        .bind(added_by)
        .execute(&self.pool)
        .await
        {
            tracing::error!("record_trail_log error: {:?}", e);
        }
    }
}
