use axum::extract::State;
use uuid::Uuid;

use super::{applications::enrich, today};
use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    extract::{Json, Path, Query},
    models::{
        AdminApplicationQuery, AdminJobFilter, AdminJobQuery, ApiResponse, ApplicationFilter,
        ApplicationView, DashboardStats, Job, UpdateRoleRequest, UserFilter, UserListQuery,
        UserProfile, UserRole,
    },
};

/// get_dashboard
///
/// [Admin Route] Platform-wide counters for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>> {
    auth.require_role(UserRole::Admin)?;
    let stats = state.repo.get_stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

// --- Users ---

/// list_users
///
/// [Admin Route] Every account, newest first. `search` matches name or email without
/// regard to case.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserListQuery),
    responses((status = 200, description = "Page of users", body = [UserProfile]))
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>> {
    auth.require_role(UserRole::Admin)?;
    let filter = UserFilter::try_from(query)?;
    let (users, total) = state.repo.list_users(&filter).await?;

    let today = today();
    let profiles = users
        .iter()
        .map(|user| UserProfile::from_user(user, today))
        .collect();
    Ok(Json(ApiResponse::paged(profiles, filter.page.meta(total))))
}

/// update_user_role
///
/// [Admin Route] Reassigns any account to any role, admin included. An admin cannot
/// change their own role.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 400, description = "Invalid role or own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    auth.require_role(UserRole::Admin)?;
    let role: UserRole = payload.role.parse()?;
    if id == auth.id {
        return Err(AppError::validation("You cannot change your own role"));
    }

    let user = state
        .repo
        .set_user_role(id, role)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    tracing::info!(user_id = %id, role = role.as_str(), admin_id = %auth.id, "user role changed");
    Ok(Json(ApiResponse::with_message(
        UserProfile::from_user(&user, today()),
        "User role updated successfully",
    )))
}

/// delete_user
///
/// [Admin Route] Removes an account and everything hanging off it: the user's CVs and
/// applications, and for a recruiter their jobs and the applications to those jobs.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    auth.require_role(UserRole::Admin)?;
    if id == auth.id {
        return Err(AppError::validation("You cannot delete your own account"));
    }
    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound("User"));
    }

    tracing::info!(user_id = %id, admin_id = %auth.id, "user deleted");
    Ok(Json(ApiResponse::message_only("User deleted successfully")))
}

// --- Jobs ---

/// list_all_jobs
///
/// [Admin Route] Jobs of any status, newest first, with optional status filter and a
/// case-insensitive search over title and company.
#[utoipa::path(
    get,
    path = "/api/admin/jobs",
    params(AdminJobQuery),
    responses((status = 200, description = "Page of jobs", body = [Job]))
)]
pub async fn list_all_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminJobQuery>,
) -> Result<Json<ApiResponse<Vec<Job>>>> {
    auth.require_role(UserRole::Admin)?;
    let filter = AdminJobFilter::try_from(query)?;
    let (jobs, total) = state.repo.list_all_jobs(&filter).await?;
    Ok(Json(ApiResponse::paged(jobs, filter.page.meta(total))))
}

/// delete_any_job
///
/// [Admin Route] Deletes any job regardless of owner, with its applications.
#[utoipa::path(
    delete,
    path = "/api/admin/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Job not found")
    )
)]
pub async fn delete_any_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    auth.require_role(UserRole::Admin)?;
    if !state.repo.delete_job(id, None).await? {
        return Err(AppError::NotFound("Job"));
    }

    tracing::info!(job_id = %id, admin_id = %auth.id, "job deleted by admin");
    Ok(Json(ApiResponse::message_only("Job deleted successfully")))
}

// --- Applications ---

/// list_all_applications
#[utoipa::path(
    get,
    path = "/api/admin/applications",
    params(AdminApplicationQuery),
    responses((status = 200, description = "Page of applications", body = [ApplicationView]))
)]
pub async fn list_all_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminApplicationQuery>,
) -> Result<Json<ApiResponse<Vec<ApplicationView>>>> {
    auth.require_role(UserRole::Admin)?;
    let filter = ApplicationFilter::try_from(query)?;
    let (applications, total) = state.repo.list_all_applications(&filter).await?;
    let views = enrich(&state.repo, applications, true).await?;
    Ok(Json(ApiResponse::paged(views, filter.page.meta(total))))
}
