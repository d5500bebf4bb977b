use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`, so a request without a valid token
/// never reaches a handler. Ownership checks (a recruiter's own jobs, a job seeker's
/// own CVs) are enforced in the repository queries.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile ---
        .route(
            "/auth/profile",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
        .route("/auth/change-password", put(handlers::auth::change_password))
        // --- Recruiter job management ---
        .route("/jobs", post(handlers::jobs::create_job))
        // Static segment, matched before `/jobs/{id}`.
        .route("/jobs/my-jobs", get(handlers::jobs::my_jobs))
        .route(
            "/jobs/{id}",
            put(handlers::jobs::update_job).delete(handlers::jobs::delete_job),
        )
        .route(
            "/jobs/{id}/applications",
            get(handlers::jobs::job_applications),
        )
        // --- Applications ---
        .route("/applications/apply", post(handlers::applications::apply))
        .route(
            "/applications/my-applications",
            get(handlers::applications::my_applications),
        )
        .route(
            "/applications/received-applications",
            get(handlers::applications::received_applications),
        )
        .route(
            "/applications/{id}/status",
            put(handlers::applications::update_status),
        )
        // --- CV builder ---
        .route("/cv/my", get(handlers::cvs::list_my_cvs))
        .route("/cv", post(handlers::cvs::create_cv))
        .route(
            "/cv/{id}",
            put(handlers::cvs::update_cv).delete(handlers::cvs::delete_cv),
        )
        // --- Media ---
        // POST /upload/resume
        // Presigned PUT URL, valid for 10 minutes, for a PDF or Word resume.
        .route("/upload/resume", post(handlers::uploads::get_resume_upload_url))
        // --- Support inbox (admin) ---
        .route("/contact", get(handlers::contact::list_contacts))
        .route(
            "/contact/{id}/status",
            put(handlers::contact::update_contact_status),
        )
}
