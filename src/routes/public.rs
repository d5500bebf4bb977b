use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call without a token. Mounted under `/api`.
///
/// `POST /contact` lives here too: it accepts an optional token to tag the sender's
/// role, but never requires one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // --- Auth ---
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // --- Job board ---
        // GET /jobs?sort=&minSalary=&maxSalary=&page=&limit=
        // Active postings only.
        .route("/jobs", get(handlers::jobs::list_jobs))
        .route("/jobs/{id}", get(handlers::jobs::get_job))
        // --- Support ---
        .route("/contact", post(handlers::contact::submit_contact))
}
