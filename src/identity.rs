use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::{Claims, Role},
    config::AppConfig,
    error::ApiError,
};

/// IdentityVerifier Contract
///
/// Abstracts the external identity provider that actually checks credentials.
/// The real implementation talks HTTP; tests substitute a scripted mock. The
/// trait hands back the raw JSON body on success because the upstream response
/// shape is not uniform; interpreting it is the Token Issuer's job.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Forwards the credentials and returns the verifier's 2xx response body.
    ///
    /// Failure mapping is part of the contract:
    /// - non-success status → `InvalidCredentials`
    /// - transport error or timeout → `VerifierUnreachable`
    /// - unparseable body → `MalformedIdentityResponse`
    ///
    /// No variant is ever retried automatically: a login is user-initiated, so
    /// a failure is surfaced immediately rather than silently re-attempted.
    async fn verify(&self, email: &str, password: &str) -> Result<serde_json::Value, ApiError>;
}

/// The shared trait-object form stored in the Token Issuer.
pub type VerifierState = Arc<dyn IdentityVerifier>;

/// HttpIdentityVerifier
///
/// The production implementation: a single POST carrying `{email, password}`
/// to the configured endpoint, with an explicit per-request timeout so a hung
/// verifier cannot pin the login task. Credentials exist only for the duration
/// of this call and are never logged or persisted.
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpIdentityVerifier {
    pub fn new(config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.verifier_timeout)
            .build()
            .expect("FATAL: failed to construct HTTP client for identity verifier");
        Self {
            client,
            url: config.verifier_url.clone(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "identity verifier unreachable");
                ApiError::VerifierUnreachable
            })?;

        if !response.status().is_success() {
            tracing::info!(status = %response.status(), "verifier rejected credentials");
            return Err(ApiError::InvalidCredentials);
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            tracing::error!(error = %e, "verifier returned a non-JSON body");
            ApiError::MalformedIdentityResponse
        })
    }
}

/// RoleAssigner Strategy
///
/// Decides the role for identities the verifier confirmed but did not classify
/// (the acknowledgment response shape carries no role field). Kept behind a
/// trait so the mapping source can change without touching the issuer.
pub trait RoleAssigner: Send + Sync {
    fn assign(&self, email: &str) -> Role;
}

/// AllowListRoleAssigner
///
/// Grants Admin to a configured set of email addresses and User to everyone
/// else. The list comes from `AppConfig::admin_emails`, never from code.
//
// TODO: retire this fallback once the upstream verifier includes a role field
// in its acknowledgment responses; product has been asked to clarify.
pub struct AllowListRoleAssigner {
    admins: Vec<String>,
}

impl AllowListRoleAssigner {
    pub fn new(admins: &[String]) -> Self {
        Self {
            admins: admins.to_vec(),
        }
    }
}

impl RoleAssigner for AllowListRoleAssigner {
    fn assign(&self, email: &str) -> Role {
        if self.admins.iter().any(|a| a == email) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// VerifierPayload
///
/// The two response shapes the external verifier is known to produce. The
/// untagged representation lets serde pick whichever fits; anything that fits
/// neither is a malformed identity response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VerifierPayload {
    /// A structured record with an identifier and, sometimes, a role.
    Record {
        #[serde(default, alias = "user_id")]
        id: Option<String>,
        #[serde(default)]
        role: Option<Role>,
    },
    /// A list-like acknowledgment, e.g. `["Verified", "True"]`, confirming the
    /// credentials without naming the identity.
    Acknowledgment(Vec<String>),
}

/// IssuedToken
///
/// The outcome of a successful login: the signed token plus the role it
/// carries, both returned to the client.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub role: Role,
}

/// TokenIssuer
///
/// Exchanges externally-verified credentials for a locally-signed session
/// token. Purely a computation over the verifier's answer: nothing is
/// persisted, and issuing two tokens for the same identity in the same second
/// yields two independently valid tokens.
pub struct TokenIssuer {
    verifier: VerifierState,
    roles: Arc<dyn RoleAssigner>,
    config: AppConfig,
}

impl TokenIssuer {
    pub fn new(verifier: VerifierState, roles: Arc<dyn RoleAssigner>, config: AppConfig) -> Self {
        Self {
            verifier,
            roles,
            config,
        }
    }

    /// issue
    ///
    /// 1. Forward the credentials to the external verifier.
    /// 2. Derive a subject and role from whichever response shape came back:
    ///    a structured record supplies both (role defaulting to User); a bare
    ///    acknowledgment falls back to the submitted email as subject with the
    ///    role taken from the assigner strategy.
    /// 3. Sign claims with issued-at = now and expiry = now + configured TTL.
    pub async fn issue(&self, email: &str, password: &str) -> Result<IssuedToken, ApiError> {
        let body = self.verifier.verify(email, password).await?;

        let (subject, role) = match serde_json::from_value::<VerifierPayload>(body) {
            Ok(VerifierPayload::Record { id, role }) => {
                let subject = id.ok_or_else(|| {
                    tracing::error!("verifier record is missing a user identifier");
                    ApiError::MalformedIdentityResponse
                })?;
                (subject, role.unwrap_or(Role::User))
            }
            Ok(VerifierPayload::Acknowledgment(items)) => {
                // The acknowledgment must actually assert a successful check.
                let verified = items.iter().any(|s| s == "Verified")
                    && items.iter().any(|s| s == "True");
                if !verified {
                    tracing::error!("verifier acknowledgment did not confirm the credentials");
                    return Err(ApiError::MalformedIdentityResponse);
                }
                (email.to_string(), self.roles.assign(email))
            }
            Err(e) => {
                tracing::error!(error = %e, "verifier response fits no known shape");
                return Err(ApiError::MalformedIdentityResponse);
            }
        };

        let now = Utc::now();
        let expires = now + Duration::minutes(self.config.token_ttl_minutes);
        let claims = Claims {
            subject,
            role,
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let token = encode(&Header::default(), &claims, &key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            ApiError::Internal
        })?;

        tracing::info!(subject = %claims.subject, role = ?role, "session token issued");
        Ok(IssuedToken { token, role })
    }
}
