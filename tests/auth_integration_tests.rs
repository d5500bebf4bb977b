mod common;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Request, StatusCode, header, request::Parts},
};
use common::test_app;
use job_portal::{
    AppConfig, AppError, AppState, MemoryRepository,
    auth::{AuthUser, Claims, issue_token},
    models::UserRole,
    repository::RepositoryState,
    storage::{MockStorageService, StorageState},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Helpers ---

fn state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()) as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    }
}

fn parts_with(auth_header: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/api/auth/profile");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(()).unwrap().into_parts().0
}

fn token_expiring_in(user_id: Uuid, secret: &str, offset_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let claims = Claims {
        sub: user_id,
        iat: (now - 3600) as usize,
        exp: (now + offset_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn extract(state: &AppState, auth_header: Option<&str>) -> Result<AuthUser, AppError> {
    let mut parts = parts_with(auth_header);
    <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, state).await
}

// --- Extractor ---

#[tokio::test]
async fn missing_or_malformed_header_is_missing_token() {
    let state = state();
    for header in [None, Some("Token abc"), Some("Bearer "), Some("Basic dXNlcjpwYXNz")] {
        let err = extract(&state, header).await.unwrap_err();
        assert!(matches!(err, AppError::MissingToken), "{header:?}");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn bad_signature_is_forbidden() {
    let state = state();
    let token = token_expiring_in(Uuid::new_v4(), "some-other-secret", 3600);
    let err = extract(&state, Some(&format!("Bearer {token}")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TokenInvalid));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Invalid token");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let state = state();
    let token = token_expiring_in(Uuid::new_v4(), &state.config.jwt_secret, -5);
    let err = extract(&state, Some(&format!("Bearer {token}")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TokenExpired));
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Token expired");
}

#[tokio::test]
async fn valid_token_for_deleted_user_is_not_found() {
    let state = state();
    let token = issue_token(Uuid::new_v4(), &state.config).unwrap();
    let err = extract(&state, Some(&format!("Bearer {token}")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("User")));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn optional_extractor_turns_every_failure_into_a_guest() {
    let state = state();
    let expired = token_expiring_in(Uuid::new_v4(), &state.config.jwt_secret, -5);
    for header in [None, Some("Bearer garbage".to_string()), Some(format!("Bearer {expired}"))] {
        let mut parts = parts_with(header.as_deref());
        let resolved =
            <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
        assert!(resolved.is_none(), "{header:?}");
    }
}

// --- Through the router ---

#[tokio::test]
async fn protected_routes_render_auth_errors_in_the_envelope() {
    let app = test_app();

    let (status, body) = app.get("/api/auth/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Access token required");

    let (status, body) = app.get("/api/auth/profile", Some("garbage")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid token");

    let (status, _) = app.get("/api/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_gate_names_the_required_role() {
    let app = test_app();
    let (recruiter, _) = app.register_recruiter("rick@example.com", "Acme").await;

    let (status, body) = app.get("/api/cv/my", Some(&recruiter)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Job seeker role required.");

    let (status, body) = app.get("/api/admin/users", Some(&recruiter)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admin role required.");
}

#[tokio::test]
async fn role_change_takes_effect_on_the_next_request() {
    let app = test_app();
    let (admin, _) = app.seed_admin("admin@example.com").await;
    let (seeker, seeker_id) = app.register_seeker("jane@example.com").await;

    let (status, _) = app.get("/api/jobs/my-jobs", Some(&seeker)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &format!("/api/admin/users/{seeker_id}/role"),
            Some(&admin),
            serde_json::json!({ "role": UserRole::Recruiter.as_str() }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "recruiter");

    // The same token now resolves to a recruiter.
    let (status, _) = app.get("/api/jobs/my-jobs", Some(&seeker)).await;
    assert_eq!(status, StatusCode::OK);
}
