use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// ApiError
///
/// The complete failure taxonomy of the service. Every handler and the auth gate
/// return this type, so the mapping from failure to HTTP status lives in exactly
/// one place. Responses carry a short machine-readable reason string and never
/// include stack traces, upstream bodies, or secrets.
///
/// The three token failures (Missing/Invalid/Expired) deliberately share the same
/// response body: a client holding a bad token learns nothing about *why* it is
/// bad. The distinct reason is logged at the auth gate instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The external verifier rejected the submitted credentials (non-2xx answer).
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The verifier answered 2xx but the body fit neither known response shape,
    /// or no subject could be derived from it.
    #[error("malformed identity response")]
    MalformedIdentityResponse,
    /// The verifier could not be reached at all (transport error or timeout).
    /// Surfaced as a server error, never retried, never a default role.
    #[error("identity verifier unreachable")]
    VerifierUnreachable,
    /// No Authorization header, or one without the Bearer scheme prefix.
    #[error("authorization token is missing")]
    MissingToken,
    /// Signature check or claim decoding failed.
    #[error("invalid token")]
    InvalidToken,
    /// The token was once valid but its expiry timestamp has passed.
    #[error("token has expired")]
    TokenExpired,
    /// The authenticated role is not a member of the endpoint's policy set.
    #[error("insufficient permissions")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    /// A request body failed application validation (missing or out-of-range field).
    #[error("validation failed: {0}")]
    Validation(String),
    /// A uniqueness rule was violated, e.g. a trail name collision.
    #[error("duplicate resource: {0}")]
    Duplicate(String),
    #[error("internal error")]
    Internal,
}

/// ErrorBody
///
/// The uniform JSON error envelope: `{"error": "<reason>"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// The machine-readable reason string placed in the response body.
    fn reason(&self) -> &'static str {
        match self {
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::MalformedIdentityResponse => "malformed_identity_response",
            ApiError::VerifierUnreachable => "identity_verifier_unreachable",
            // Uniform body for all token failures; logs carry the distinction.
            ApiError::MissingToken | ApiError::InvalidToken | ApiError::TokenExpired => {
                "unauthorized"
            }
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Duplicate(_) => "duplicate_resource",
            ApiError::Internal => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::NOT_ACCEPTABLE,
            ApiError::MalformedIdentityResponse
            | ApiError::VerifierUnreachable
            | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.reason().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
