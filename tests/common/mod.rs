#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use job_portal::{
    AppConfig, AppState, MemoryRepository, create_router,
    auth::{hash_password, issue_token},
    models::{NewUser, UserRole},
    repository::{Repository, RepositoryState},
    storage::{MockStorageService, StorageState},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";
pub const SEEKER_DOB: &str = "1995-06-15";

/// TestApp
///
/// The full router over an in-memory repository and mock storage. Requests go through
/// `oneshot`, so no socket is opened.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub config: AppConfig,
}

pub fn test_app() -> TestApp {
    test_app_with_storage(MockStorageService::new())
}

pub fn test_app_with_storage(storage: MockStorageService) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let config = AppConfig::default();
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        config: config.clone(),
    };
    TestApp {
        router: create_router(state),
        repo,
        config,
    }
}

/// An ISO timestamp `days` from now, for application deadlines.
pub fn days_from_now(days: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339()
}

impl TestApp {
    /// Sends one request and returns the status with the body parsed as JSON
    /// (`Value::Null` for an empty or non-JSON body).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    // --- Seeding ---

    /// Registers a job seeker through the API. Returns `(token, user id)`.
    pub async fn register_seeker(&self, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": "Jane Seeker",
                    "email": email,
                    "password": PASSWORD,
                    "phone": "0851234567",
                    "role": "job_seeker",
                    "dateOfBirth": SEEKER_DOB,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seeker registration: {body}");
        credentials(&body)
    }

    /// Registers a recruiter through the API. Returns `(token, user id)`.
    pub async fn register_recruiter(&self, email: &str, company: &str) -> (String, Uuid) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": "Rick Recruiter",
                    "email": email,
                    "password": PASSWORD,
                    "phone": "0869876543",
                    "role": "recruiter",
                    "company": company,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "recruiter registration: {body}");
        credentials(&body)
    }

    /// Admins cannot self-register, so they are written straight to the repository.
    pub async fn seed_admin(&self, email: &str) -> (String, Uuid) {
        let user = self
            .repo
            .create_user(NewUser {
                name: "Ada Admin".to_string(),
                email: email.to_string(),
                password_hash: hash_password(PASSWORD, self.config.bcrypt_cost).unwrap(),
                phone: String::new(),
                role: UserRole::Admin,
                date_of_birth: None,
                company: None,
                company_description: String::new(),
                website: String::new(),
            })
            .await
            .unwrap();
        (issue_token(user.id, &self.config).unwrap(), user.id)
    }

    /// Posts a job as `token`. `overrides` is merged over a valid default body.
    pub async fn create_job(&self, token: &str, overrides: Value) -> Value {
        let mut body = json!({
            "title": "Backend Engineer",
            "location": "Limerick",
            "salary": 50000,
            "description": "Build APIs",
            "requirements": ["Rust", "SQL"],
            "type": "full-time",
            "remote": false,
            "experience": "mid",
            "applicationDeadline": days_from_now(30),
        });
        if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        let (status, response) = self.post("/api/jobs", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "job creation: {response}");
        response["data"].clone()
    }

    pub async fn apply(&self, token: &str, job_id: &str) -> (StatusCode, Value) {
        self.post(
            "/api/applications/apply",
            Some(token),
            json!({ "jobId": job_id, "coverLetter": "Keen to join" }),
        )
        .await
    }
}

fn credentials(body: &Value) -> (String, Uuid) {
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}
