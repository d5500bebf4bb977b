use std::collections::HashMap;

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use super::today;
use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::{Json, Path},
    models::{
        ApiResponse, ApplicantSummary, Application, ApplicationStatus, ApplicationView,
        ApplyRequest, JobSummary, NewApplication, UpdateStatusRequest, UserRole,
    },
    repository::RepositoryState,
};

/// Joins each application with its job and, when `with_applicant` is set, the applicant.
/// References that no longer resolve come back as `None`.
pub(crate) async fn enrich(
    repo: &RepositoryState,
    applications: Vec<Application>,
    with_applicant: bool,
) -> Result<Vec<ApplicationView>> {
    let job_ids: Vec<Uuid> = applications.iter().map(|a| a.job_id).collect();
    let jobs: HashMap<Uuid, JobSummary> = repo
        .get_jobs(&job_ids)
        .await?
        .iter()
        .map(|job| (job.id, JobSummary::from(job)))
        .collect();

    let applicants: HashMap<Uuid, ApplicantSummary> = if with_applicant {
        let seeker_ids: Vec<Uuid> = applications.iter().map(|a| a.job_seeker_id).collect();
        let today = today();
        repo.get_users(&seeker_ids)
            .await?
            .iter()
            .map(|user| (user.id, ApplicantSummary::from_user(user, today)))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(applications
        .into_iter()
        .map(|application| ApplicationView {
            job: jobs.get(&application.job_id).cloned(),
            applicant: applicants.get(&application.job_seeker_id).cloned(),
            application,
        })
        .collect())
}

/// apply
///
/// [Job Seeker Route] Applies to a job. The application's recruiter is copied from the
/// job's owner. A second application to the same job is rejected with 409.
#[utoipa::path(
    post,
    path = "/api/applications/apply",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationView),
        (status = 403, description = "Not a job seeker"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already applied")
    )
)]
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationView>>)> {
    auth.require_role(UserRole::JobSeeker)?;

    let job = state
        .repo
        .get_job(payload.job_id)
        .await?
        .ok_or(AppError::NotFound("Job"))?;

    let application = state
        .repo
        .create_application(NewApplication {
            job_id: job.id,
            job_seeker_id: auth.id,
            recruiter_id: job.recruiter_id,
            cover_letter: payload.cover_letter.unwrap_or_default().trim().to_string(),
        })
        .await?;

    tracing::info!(
        application_id = %application.id,
        job_id = %job.id,
        job_seeker_id = %auth.id,
        "application submitted"
    );

    let view = ApplicationView {
        application,
        job: Some(JobSummary::from(&job)),
        applicant: None,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            view,
            "Application submitted successfully",
        )),
    ))
}

/// my_applications
///
/// [Job Seeker Route] The caller's applications, newest first, each with its job.
#[utoipa::path(
    get,
    path = "/api/applications/my-applications",
    responses((status = 200, description = "Own applications", body = [ApplicationView]))
)]
pub async fn my_applications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ApplicationView>>>> {
    auth.require_role(UserRole::JobSeeker)?;

    let applications = state.repo.list_seeker_applications(auth.id).await?;
    let views = enrich(&state.repo, applications, false).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// received_applications
///
/// [Recruiter Route] Applications to any of the caller's jobs, newest first, each with
/// its job and applicant.
#[utoipa::path(
    get,
    path = "/api/applications/received-applications",
    responses((status = 200, description = "Received applications", body = [ApplicationView]))
)]
pub async fn received_applications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ApplicationView>>>> {
    auth.require_role(UserRole::Recruiter)?;

    let applications = state.repo.list_recruiter_applications(auth.id).await?;
    let views = enrich(&state.repo, applications, true).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// update_status
///
/// [Recruiter Route] Moves an application to any status. Only the recruiter the
/// application was made to may do so; anyone else gets the same 404 as a missing id.
#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated", body = ApplicationView),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Application not found or not addressed to the caller")
    )
)]
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ApplicationView>>> {
    auth.require_role(UserRole::Recruiter)?;
    let status: ApplicationStatus = payload.status.parse()?;

    let application = state
        .repo
        .update_application_status(id, auth.id, status)
        .await?
        .ok_or(AppError::NotFoundOrForbidden("Application"))?;

    tracing::info!(application_id = %id, status = status.as_str(), "application status updated");

    let view = enrich(&state.repo, vec![application], true)
        .await?
        .pop()
        .ok_or(AppError::NotFound("Application"))?;
    Ok(Json(ApiResponse::with_message(
        view,
        "Application status updated successfully",
    )))
}
