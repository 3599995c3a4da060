use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use trail_service::{
    AllowListRoleAssigner, AppConfig, TokenIssuer,
    auth::{Claims, Role, verify_bearer},
    error::ApiError,
    identity::{IdentityVerifier, VerifierState},
};

// --- Mock Verifier ---

/// Scripted stand-in for the external identity verifier: each instance plays
/// back one predetermined outcome.
enum Script {
    Body(serde_json::Value),
    Reject,
    Unreachable,
}

struct MockVerifier {
    script: Script,
}

#[async_trait]
impl IdentityVerifier for MockVerifier {
    async fn verify(&self, _email: &str, _password: &str) -> Result<serde_json::Value, ApiError> {
        match &self.script {
            Script::Body(v) => Ok(v.clone()),
            Script::Reject => Err(ApiError::InvalidCredentials),
            Script::Unreachable => Err(ApiError::VerifierUnreachable),
        }
    }
}

// --- Helpers ---

fn build_issuer(script: Script) -> (TokenIssuer, AppConfig) {
    let config = AppConfig::default();
    let verifier = Arc::new(MockVerifier { script }) as VerifierState;
    let roles = Arc::new(AllowListRoleAssigner::new(&config.admin_emails));
    (
        TokenIssuer::new(verifier, roles, config.clone()),
        config,
    )
}

fn decode_claims(token: &str, config: &AppConfig) -> Claims {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .expect("issued token should decode")
        .claims
}

// --- Structured Record Responses ---

#[tokio::test]
async fn record_response_uses_its_identifier_and_role() {
    let (issuer, config) = build_issuer(Script::Body(serde_json::json!({
        "id": "user-42",
        "role": "Admin"
    })));

    let issued = issuer.issue("someone@example.com", "pw").await.unwrap();
    assert_eq!(issued.role, Role::Admin);

    let claims = decode_claims(&issued.token, &config);
    assert_eq!(claims.subject, "user-42");
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn record_response_defaults_role_to_user() {
    let (issuer, config) = build_issuer(Script::Body(serde_json::json!({
        "user_id": "user-7"
    })));

    let issued = issuer.issue("someone@example.com", "pw").await.unwrap();
    assert_eq!(issued.role, Role::User);
    assert_eq!(decode_claims(&issued.token, &config).subject, "user-7");
}

#[tokio::test]
async fn record_without_identifier_is_malformed() {
    let (issuer, _) = build_issuer(Script::Body(serde_json::json!({ "role": "User" })));

    let err = issuer.issue("someone@example.com", "pw").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedIdentityResponse));
}

// --- Acknowledgment Responses ---

#[tokio::test]
async fn acknowledgment_with_allow_listed_email_yields_admin() {
    let (issuer, config) =
        build_issuer(Script::Body(serde_json::json!(["Verified", "True"])));

    let issued = issuer.issue("jackadmin@plymouth.ac.uk", "x").await.unwrap();
    assert_eq!(issued.role, Role::Admin);

    // The submitted email becomes the subject when the verifier names nobody.
    let claims = decode_claims(&issued.token, &config);
    assert_eq!(claims.subject, "jackadmin@plymouth.ac.uk");
}

#[tokio::test]
async fn acknowledgment_with_other_email_yields_user() {
    let (issuer, _) = build_issuer(Script::Body(serde_json::json!(["Verified", "True"])));

    let issued = issuer.issue("walker@plymouth.ac.uk", "x").await.unwrap();
    assert_eq!(issued.role, Role::User);
}

#[tokio::test]
async fn unconfirmed_acknowledgment_is_malformed() {
    let (issuer, _) = build_issuer(Script::Body(serde_json::json!(["Nope"])));

    let err = issuer.issue("walker@plymouth.ac.uk", "x").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedIdentityResponse));
}

#[tokio::test]
async fn unrecognizable_body_is_malformed() {
    let (issuer, _) = build_issuer(Script::Body(serde_json::json!("just a string")));

    let err = issuer.issue("walker@plymouth.ac.uk", "x").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedIdentityResponse));
}

// --- Failure Propagation ---

#[tokio::test]
async fn rejected_credentials_propagate() {
    let (issuer, _) = build_issuer(Script::Reject);

    let err = issuer.issue("walker@plymouth.ac.uk", "bad").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
}

#[tokio::test]
async fn unreachable_verifier_propagates_without_default_role() {
    let (issuer, _) = build_issuer(Script::Unreachable);

    let err = issuer.issue("walker@plymouth.ac.uk", "pw").await.unwrap_err();
    assert!(matches!(err, ApiError::VerifierUnreachable));
}

// --- Issued Tokens at the Gate ---

#[tokio::test]
async fn issued_token_validates_at_the_gate() {
    let (issuer, config) = build_issuer(Script::Body(serde_json::json!(["Verified", "True"])));
    let issued = issuer.issue("jackadmin@plymouth.ac.uk", "x").await.unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", issued.token)).unwrap(),
    );

    let user = verify_bearer(&headers, &config).expect("fresh token should pass the gate");
    assert_eq!(user.subject, "jackadmin@plymouth.ac.uk");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn tokens_issued_in_the_same_second_are_independently_valid() {
    let (issuer, config) = build_issuer(Script::Body(serde_json::json!(["Verified", "True"])));

    let first = issuer.issue("walker@plymouth.ac.uk", "x").await.unwrap();
    let second = issuer.issue("walker@plymouth.ac.uk", "x").await.unwrap();

    // No shared session state exists, so neither issuance can corrupt the other.
    let a = decode_claims(&first.token, &config);
    let b = decode_claims(&second.token, &config);
    assert_eq!(a.subject, b.subject);
    assert_eq!(a.role, Role::User);
    assert_eq!(b.role, Role::User);
}
