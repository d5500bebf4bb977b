use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Admin Router Module
///
/// Moderation and oversight endpoints, nested under `/admin`. The router is wrapped in
/// `auth_middleware`; every handler then requires `role = admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::admin::get_dashboard))
        // --- Users ---
        // GET /admin/users?role=&search=&page=&limit=
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/role", put(handlers::admin::update_user_role))
        // Cascades to the user's CVs, applications and, for recruiters, jobs.
        .route("/users/{id}", delete(handlers::admin::delete_user))
        // --- Jobs ---
        .route("/jobs", get(handlers::admin::list_all_jobs))
        .route("/jobs/{id}", delete(handlers::admin::delete_any_job))
        // --- Applications ---
        .route(
            "/applications",
            get(handlers::admin::list_all_applications),
        )
}
