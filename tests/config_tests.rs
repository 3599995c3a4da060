use serial_test::serial;
use std::env;
use std::time::Duration;
use trail_service::AppConfig;
use trail_service::config::Env;

const ALL_VARS: &[&str] = &[
    "APP_ENV",
    "DATABASE_URL",
    "JWT_SECRET",
    "VERIFIER_URL",
    "TOKEN_TTL_MINUTES",
    "VERIFIER_TIMEOUT_SECS",
    "ADMIN_EMAILS",
];

/// Runs `f` against a clean slate of environment variables, restoring nothing
/// afterwards: every test sets exactly what it needs. Must be combined with
/// #[serial] because the process environment is global.
fn with_clean_env(vars: &[(&str, &str)], f: impl FnOnce()) {
    unsafe {
        for var in ALL_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }
    f();
}

#[test]
#[serial]
fn local_load_falls_back_to_development_defaults() {
    with_clean_env(&[("DATABASE_URL", "postgres://localhost/trails")], || {
        let config = AppConfig::load();
        assert_eq!(config.env, Env::Local);
        assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");
        assert_eq!(
            config.verifier_url,
            "https://web.socem.plymouth.ac.uk/COMP2001/auth/api/users"
        );
        assert_eq!(config.token_ttl_minutes, 60);
        assert_eq!(config.verifier_timeout, Duration::from_secs(10));
        assert_eq!(config.admin_emails, vec!["jackadmin@plymouth.ac.uk"]);
    });
}

#[test]
#[serial]
fn explicit_values_override_the_defaults() {
    with_clean_env(
        &[
            ("DATABASE_URL", "postgres://localhost/trails"),
            ("JWT_SECRET", "another-secret"),
            ("VERIFIER_URL", "http://127.0.0.1:9999/verify"),
            ("TOKEN_TTL_MINUTES", "15"),
            ("VERIFIER_TIMEOUT_SECS", "3"),
            ("ADMIN_EMAILS", "a@example.com, b@example.com ,"),
        ],
        || {
            let config = AppConfig::load();
            assert_eq!(config.jwt_secret, "another-secret");
            assert_eq!(config.verifier_url, "http://127.0.0.1:9999/verify");
            assert_eq!(config.token_ttl_minutes, 15);
            assert_eq!(config.verifier_timeout, Duration::from_secs(3));
            // Whitespace and empty entries in the list are dropped.
            assert_eq!(config.admin_emails, vec!["a@example.com", "b@example.com"]);
        },
    );
}

#[test]
#[serial]
#[should_panic(expected = "JWT_SECRET must be set in production")]
fn production_without_a_signing_secret_refuses_to_start() {
    with_clean_env(
        &[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/trails"),
            ("VERIFIER_URL", "http://127.0.0.1:9999/verify"),
        ],
        || {
            let _ = AppConfig::load();
        },
    );
}

#[test]
#[serial]
#[should_panic(expected = "DATABASE_URL required")]
fn missing_database_url_refuses_to_start() {
    with_clean_env(&[], || {
        let _ = AppConfig::load();
    });
}

#[test]
#[serial]
fn production_has_no_implicit_admins() {
    with_clean_env(
        &[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/trails"),
            ("JWT_SECRET", "prod-secret"),
            ("VERIFIER_URL", "http://127.0.0.1:9999/verify"),
        ],
        || {
            let config = AppConfig::load();
            assert_eq!(config.env, Env::Production);
            assert!(config.admin_emails.is_empty());
        },
    );
}
