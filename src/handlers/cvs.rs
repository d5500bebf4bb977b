use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::{Json, Path},
    models::{ApiResponse, Cv, CvInput, UserRole},
};

/// list_my_cvs
///
/// [Job Seeker Route] The caller's CVs, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/cv/my",
    responses((status = 200, description = "Own CVs", body = [Cv]))
)]
pub async fn list_my_cvs(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Cv>>>> {
    auth.require_role(UserRole::JobSeeker)?;
    let cvs = state.repo.list_cvs(auth.id).await?;
    Ok(Json(ApiResponse::ok(cvs)))
}

/// create_cv
///
/// [Job Seeker Route] Stores a new CV. Marking it default clears the flag on the
/// caller's other CVs.
#[utoipa::path(
    post,
    path = "/api/cv",
    request_body = CvInput,
    responses((status = 201, description = "Created", body = Cv))
)]
pub async fn create_cv(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CvInput>,
) -> Result<(StatusCode, Json<ApiResponse<Cv>>)> {
    auth.require_role(UserRole::JobSeeker)?;
    let cv = state.repo.create_cv(auth.id, payload).await?;
    tracing::debug!(cv_id = %cv.id, user_id = %auth.id, "cv created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(cv, "CV saved successfully")),
    ))
}

/// update_cv
#[utoipa::path(
    put,
    path = "/api/cv/{id}",
    params(("id" = Uuid, Path, description = "CV ID")),
    request_body = CvInput,
    responses(
        (status = 200, description = "Updated", body = Cv),
        (status = 404, description = "CV not found")
    )
)]
pub async fn update_cv(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CvInput>,
) -> Result<Json<ApiResponse<Cv>>> {
    auth.require_role(UserRole::JobSeeker)?;
    let cv = state
        .repo
        .update_cv(id, auth.id, payload)
        .await?
        .ok_or(AppError::NotFound("CV"))?;
    Ok(Json(ApiResponse::with_message(cv, "CV updated successfully")))
}

/// delete_cv
#[utoipa::path(
    delete,
    path = "/api/cv/{id}",
    params(("id" = Uuid, Path, description = "CV ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "CV not found")
    )
)]
pub async fn delete_cv(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    auth.require_role(UserRole::JobSeeker)?;
    if !state.repo.delete_cv(id, auth.id).await? {
        return Err(AppError::NotFound("CV"));
    }
    Ok(Json(ApiResponse::message_only("CV deleted successfully")))
}
