use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{AppState, config::AppConfig, error::ApiError, policy};

/// Role
///
/// The two roles recognised by the service. The role travels inside the session
/// token and is the sole input to the authorization decision; there is no
/// per-user permission storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    User,
}

/// Claims
///
/// Represents the payload structure inside a session token (JWT). These claims
/// are signed with the server's secret and validated on every protected request.
/// The token itself is the entire session record: nothing is held server-side,
/// and only the `exp` timestamp ends a session.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user identifier derived at login (the verifier's id, or the
    /// submitted email when the verifier answered with a bare acknowledgment).
    pub subject: String,
    /// The role assigned at issuance. Promotions or demotions only take effect
    /// on the next login.
    pub role: Role,
    /// Issued At: timestamp (seconds) when the token was created.
    pub iat: usize,
    /// Expiration Time: timestamp (seconds) after which the token must not be
    /// accepted.
    pub exp: usize,
}

/// CurrentUser
///
/// The resolved identity of an authenticated request. The auth gate inserts this
/// into the request extensions, so every downstream handler receives it as
/// request-scoped context rather than reading any shared state.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub subject: String,
    pub role: Role,
}

/// verify_bearer
///
/// The token-validation half of the auth gate, kept free of any axum routing
/// types so it can be exercised directly in tests.
///
/// 1. Extract the Authorization header and require the `Bearer ` scheme prefix.
/// 2. Verify the HS256 signature and the expiry claim against the server secret.
/// 3. Surface the three failure modes (missing, expired, invalid) distinctly;
///    all answer 401 but are logged with their real reason.
pub fn verify_bearer(headers: &HeaderMap, config: &AppConfig) -> Result<CurrentUser, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("authorization header missing");
            ApiError::MissingToken
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("authorization header lacks Bearer scheme");
        ApiError::MissingToken
    })?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::default();
    // Ensure expiration time validation is always active.
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        // Expired and invalid tokens answer identically, but the operator needs
        // to tell a stale client from a forged token in the logs.
        match e.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::warn!("rejected expired session token");
                ApiError::TokenExpired
            }
            kind => {
                tracing::warn!(?kind, "rejected invalid session token");
                ApiError::InvalidToken
            }
        }
    })?;

    Ok(CurrentUser {
        subject: token_data.claims.subject,
        role: token_data.claims.role,
    })
}

/// authorize
///
/// The auth gate middleware. Every protected route is wrapped in this function
/// with its required-role set bound at route-registration time (see
/// `create_router`), so no handler ever re-derives role rules on its own.
///
/// Token presence, validity, and role membership are the only checks; the gate
/// is stateless per request. On success the resolved `CurrentUser` is forwarded
/// to the handler through the request extensions. On failure the request is
/// short-circuited before any handler logic runs.
pub async fn authorize(
    State(state): State<AppState>,
    allowed: &'static [Role],
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = verify_bearer(request.headers(), &state.config)?;

    if !policy::permits(allowed, user.role) {
        tracing::warn!(
            subject = %user.subject,
            role = ?user.role,
            required = ?allowed,
            "role not permitted for this operation"
        );
        return Err(ApiError::Forbidden);
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
