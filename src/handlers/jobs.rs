use std::collections::HashMap;

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use super::today;
use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::{Json, Path, Query},
    models::{
        ApiResponse, ApplicantSummary, CreateJobRequest, Job, JobApplicant, JobApplications,
        JobDetails, JobFilter, JobListQuery, RecruiterJob, UpdateJobRequest, UserRole, non_blank,
    },
};

/// list_jobs
///
/// [Public Route] Active postings, filtered by numeric salary bounds, sorted and paginated.
/// Jobs with a free-text salary never match a salary bound.
#[utoipa::path(
    get,
    path = "/api/jobs",
    params(JobListQuery),
    responses((status = 200, description = "Page of active jobs", body = [Job]))
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<ApiResponse<Vec<Job>>>> {
    let filter = JobFilter::from(query);
    let (jobs, total) = state.repo.list_jobs(&filter).await?;
    Ok(Json(ApiResponse::paged(jobs, filter.meta(total))))
}

/// get_job
///
/// [Public Route] One job with its `isExpired` flag. No ownership check.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = JobDetails),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobDetails>>> {
    let job = state
        .repo
        .get_job(id)
        .await?
        .ok_or(AppError::NotFound("Job"))?;
    Ok(Json(ApiResponse::ok(JobDetails::new(job, Utc::now()))))
}

/// create_job
///
/// [Recruiter Route] Publishes a posting. The company is taken from the recruiter's
/// profile; the deadline must be in the future and the age window valid.
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Created", body = Job),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not a recruiter")
    )
)]
pub async fn create_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>)> {
    auth.require_role(UserRole::Recruiter)?;

    let company = non_blank(auth.user.company.as_deref()).ok_or_else(|| {
        AppError::validation("Add a company name to your profile before posting jobs")
    })?;
    let input = payload.into_new_job(auth.id, company, Utc::now())?;
    let job = state.repo.create_job(input).await?;

    tracing::info!(job_id = %job.id, recruiter_id = %auth.id, "job created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(job, "Job created successfully")),
    ))
}

/// update_job
///
/// [Recruiter Route] Partial update of one of the caller's own jobs. A job that does not
/// exist and a job owned by someone else give the same 404.
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated", body = Job),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Job not found or not owned by the caller")
    )
)]
pub async fn update_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<Json<ApiResponse<Job>>> {
    auth.require_role(UserRole::Recruiter)?;

    let current = state
        .repo
        .get_owned_job(id, auth.id)
        .await?
        .ok_or(AppError::NotFoundOrForbidden("Job"))?;
    let changes = payload.into_changes(&current, Utc::now())?;

    let job = state
        .repo
        .update_job(id, auth.id, &changes)
        .await?
        .ok_or(AppError::NotFoundOrForbidden("Job"))?;

    tracing::info!(job_id = %job.id, "job updated");
    Ok(Json(ApiResponse::with_message(job, "Job updated successfully")))
}

/// delete_job
///
/// [Recruiter Route] Deletes one of the caller's jobs together with all its applications.
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Job not found or not owned by the caller")
    )
)]
pub async fn delete_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    auth.require_role(UserRole::Recruiter)?;

    if !state.repo.delete_job(id, Some(auth.id)).await? {
        return Err(AppError::NotFoundOrForbidden("Job"));
    }
    Ok(Json(ApiResponse::message_only("Job deleted successfully")))
}

/// my_jobs
///
/// [Recruiter Route] The caller's postings, newest first, with application counts.
#[utoipa::path(
    get,
    path = "/api/jobs/my-jobs",
    responses((status = 200, description = "Own jobs", body = [RecruiterJob]))
)]
pub async fn my_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecruiterJob>>>> {
    auth.require_role(UserRole::Recruiter)?;

    let now = Utc::now();
    let jobs = state
        .repo
        .list_recruiter_jobs(auth.id)
        .await?
        .into_iter()
        .map(|(job, applications_count)| RecruiterJob {
            is_expired: job.is_expired(now),
            job,
            applications_count,
        })
        .collect();
    Ok(Json(ApiResponse::ok(jobs)))
}

/// job_applications
///
/// [Recruiter Route] Applicants of one of the caller's jobs. Each row carries the
/// applicant's derived age and whether it falls inside the job's age window.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job and its applications", body = JobApplications),
        (status = 404, description = "Job not found or not owned by the caller")
    )
)]
pub async fn job_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobApplications>>> {
    auth.require_role(UserRole::Recruiter)?;

    let job = state
        .repo
        .get_owned_job(id, auth.id)
        .await?
        .ok_or(AppError::NotFoundOrForbidden("Job"))?;

    let applications = state.repo.list_job_applications(job.id).await?;
    let seeker_ids: Vec<Uuid> = applications.iter().map(|a| a.job_seeker_id).collect();
    let today = today();
    let applicants: HashMap<Uuid, ApplicantSummary> = state
        .repo
        .get_users(&seeker_ids)
        .await?
        .iter()
        .map(|u| (u.id, ApplicantSummary::from_user(u, today)))
        .collect();

    let applications = applications
        .into_iter()
        .map(|application| {
            let applicant = applicants.get(&application.job_seeker_id).cloned();
            let age_eligible = applicant
                .as_ref()
                .and_then(|a| a.age)
                .map(|age| job.age_limit.is_eligible(age));
            JobApplicant {
                application,
                applicant,
                age_eligible,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(JobApplications {
        job: JobDetails::new(job, Utc::now()),
        applications,
    })))
}
