use axum::extract::State;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::Json,
    models::{
        ApiResponse, PresignedUrlRequest, PresignedUrlResponse, RESUME_CONTENT_TYPES, UserRole,
    },
    storage::resume_key,
};

/// get_resume_upload_url
///
/// [Job Seeker Route] Signs a short-lived PUT URL so the client uploads its resume
/// straight to object storage. The URL is bound to the declared content type, and the
/// object key is scoped to the caller. The returned key goes in the profile's `resume`.
#[utoipa::path(
    post,
    path = "/api/upload/resume",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Presigned URL", body = PresignedUrlResponse),
        (status = 400, description = "Unsupported file type"),
        (status = 403, description = "Not a job seeker")
    )
)]
pub async fn get_resume_upload_url(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<Json<ApiResponse<PresignedUrlResponse>>> {
    auth.require_role(UserRole::JobSeeker)?;

    let file_type = payload.file_type.trim();
    if !RESUME_CONTENT_TYPES.contains(&file_type) {
        return Err(AppError::validation(
            "Only PDF and Word documents are allowed",
        ));
    }

    let key = resume_key(auth.id, payload.filename.trim());
    let upload_url = state
        .storage
        .presign_upload(&key, file_type)
        .await
        .inspect_err(|e| tracing::error!(user_id = %auth.id, error = %e, "presign failed"))?;

    Ok(Json(ApiResponse::ok(PresignedUrlResponse {
        upload_url,
        resource_key: key,
    })))
}
