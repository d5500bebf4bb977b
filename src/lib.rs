use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Routing split by access level (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document generated from the `#[utoipa::path]` handlers and the `ToSchema`
/// models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register, handlers::auth::login, handlers::auth::get_profile,
        handlers::auth::update_profile, handlers::auth::change_password,
        handlers::jobs::list_jobs, handlers::jobs::get_job, handlers::jobs::create_job,
        handlers::jobs::update_job, handlers::jobs::delete_job, handlers::jobs::my_jobs,
        handlers::jobs::job_applications,
        handlers::applications::apply, handlers::applications::my_applications,
        handlers::applications::received_applications, handlers::applications::update_status,
        handlers::cvs::list_my_cvs, handlers::cvs::create_cv, handlers::cvs::update_cv,
        handlers::cvs::delete_cv,
        handlers::contact::submit_contact, handlers::contact::list_contacts,
        handlers::contact::update_contact_status,
        handlers::uploads::get_resume_upload_url,
        handlers::admin::get_dashboard, handlers::admin::list_users,
        handlers::admin::update_user_role, handlers::admin::delete_user,
        handlers::admin::list_all_jobs, handlers::admin::delete_any_job,
        handlers::admin::list_all_applications,
    ),
    components(
        schemas(
            models::PageMeta,
            models::UserRole, models::UserProfile, models::JobSeekerProfile,
            models::RecruiterProfile, models::AdminProfile, models::ExperienceEntry,
            models::EducationEntry, models::ApplicantSummary, models::RegisterRequest,
            models::LoginRequest, models::AuthResponse, models::UpdateProfileRequest,
            models::ChangePasswordRequest, models::UpdateRoleRequest,
            models::Job, models::JobType, models::ExperienceLevel, models::JobStatus,
            models::AgeLimit, models::AgeLimitInput, models::SalaryInput,
            models::CreateJobRequest, models::UpdateJobRequest, models::JobDetails,
            models::RecruiterJob, models::JobSummary,
            models::Application, models::ApplicationStatus, models::ApplicationView,
            models::ApplyRequest, models::UpdateStatusRequest, models::JobApplicant,
            models::JobApplications,
            models::Cv, models::CvTemplate, models::CvData, models::CvLink, models::CvProject,
            models::CvInput,
            models::ContactMessage, models::ContactStatus, models::ContactRequest,
            models::ContactReceipt, models::UpdateContactStatusRequest,
            models::DashboardStats, models::PresignedUrlRequest, models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "job-portal", description = "Job Portal API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared state handed to every handler: persistence, object storage and the
/// loaded configuration. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Object storage for resume uploads.
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated and admin routers. Extracting `AuthUser` runs the full
/// token check, so a failure short-circuits with the extractor's `AppError` before the
/// handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the API under `/api`, the health probe, Swagger UI, and the global
/// observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let api = Router::new()
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes().route_layer(auth_layer.clone()))
        .nest("/admin", admin::admin_routes().route_layer(auth_layer));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by `SetRequestIdLayer`
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
