use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use trail_service::{
    AppConfig,
    auth::{Claims, Role, verify_bearer},
    error::ApiError,
};

// --- Helpers ---

fn create_token(subject: &str, role: Role, exp_offset_secs: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        subject: subject.to_string(),
        role,
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

// --- Tests ---

#[test]
fn valid_token_resolves_subject_and_role() {
    let config = AppConfig::default();
    let token = create_token("walker@plymouth.ac.uk", Role::User, 3600, &config.jwt_secret);

    let user = verify_bearer(&bearer_headers(&token), &config).unwrap();
    assert_eq!(user.subject, "walker@plymouth.ac.uk");
    assert_eq!(user.role, Role::User);
}

#[test]
fn missing_header_fails_before_any_role_check() {
    let config = AppConfig::default();

    let err = verify_bearer(&HeaderMap::new(), &config).unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[test]
fn non_bearer_scheme_counts_as_missing() {
    let config = AppConfig::default();
    let token = create_token("walker@plymouth.ac.uk", Role::User, 3600, &config.jwt_secret);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Token {token}")).unwrap(),
    );

    let err = verify_bearer(&headers, &config).unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
}

#[test]
fn expired_token_fails_as_expired_regardless_of_role() {
    let config = AppConfig::default();
    // Well past the decoder's default leeway.
    for role in [Role::Admin, Role::User] {
        let token = create_token("walker@plymouth.ac.uk", role, -3600, &config.jwt_secret);
        let err = verify_bearer(&bearer_headers(&token), &config).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }
}

#[test]
fn garbage_token_is_invalid_not_expired() {
    let config = AppConfig::default();

    let err = verify_bearer(&bearer_headers("not.a.jwt"), &config).unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[test]
fn token_signed_with_wrong_secret_is_invalid() {
    let config = AppConfig::default();
    let token = create_token("walker@plymouth.ac.uk", Role::Admin, 3600, "some-other-secret");

    let err = verify_bearer(&bearer_headers(&token), &config).unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[test]
fn tampered_token_is_invalid() {
    let config = AppConfig::default();
    let mut token = create_token("walker@plymouth.ac.uk", Role::User, 3600, &config.jwt_secret);
    // Flip a character in the signature segment.
    let flipped = if token.ends_with('A') { 'B' } else { 'A' };
    token.pop();
    token.push(flipped);

    let err = verify_bearer(&bearer_headers(&token), &config).unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}
