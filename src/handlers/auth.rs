use axum::{extract::State, http::StatusCode};
use validator::Validate;

use super::today;
use crate::{
    AppState,
    auth::{AuthUser, hash_password, issue_token, verify_password},
    error::{AppError, Result},
    extract::Json,
    models::{
        ApiResponse, AuthResponse, ChangePasswordRequest, LoginRequest, NewUser,
        RegisterRequest, UpdateProfileRequest, UserProfile, UserRole, non_blank,
        normalize_email, validate_job_seeker_dob,
    },
    repository::DUPLICATE_EMAIL,
};

const INVALID_LOGIN: &str = "Invalid email or password";

/// register
///
/// [Public Route] Creates a job seeker or recruiter account and signs the caller in.
///
/// Job seekers must give a date of birth putting them between 16 and 100 years old;
/// recruiters must give a company name. `admin` cannot be self-assigned.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    payload.email = normalize_email(&payload.email);
    payload.name = payload.name.trim().to_string();
    payload.validate()?;

    let role: UserRole = payload
        .role
        .parse::<UserRole>()
        .ok()
        .filter(UserRole::is_self_registerable)
        .ok_or_else(|| AppError::validation("Role must be either job_seeker or recruiter"))?;

    let company = non_blank(payload.company.as_deref());
    match role {
        UserRole::Recruiter if company.is_none() => {
            return Err(AppError::validation(
                "Company name is required for recruiters",
            ));
        }
        UserRole::JobSeeker => {
            let dob = payload.date_of_birth.ok_or_else(|| {
                AppError::validation("Date of birth is required for job seekers")
            })?;
            validate_job_seeker_dob(dob, today())?;
        }
        _ => {}
    }

    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
    }

    let is_recruiter = role == UserRole::Recruiter;
    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash: hash_password(&payload.password, state.config.bcrypt_cost)?,
            phone: payload.phone.trim().to_string(),
            role,
            date_of_birth: payload.date_of_birth.filter(|_| !is_recruiter),
            company: company.filter(|_| is_recruiter),
            company_description: payload
                .company_description
                .filter(|_| is_recruiter)
                .unwrap_or_default(),
            website: payload.website.filter(|_| is_recruiter).unwrap_or_default(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    let token = issue_token(user.id, &state.config)?;
    let body = AuthResponse {
        user: UserProfile::from_user(&user, today()),
        token,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(body, "User registered successfully")),
    ))
}

/// login
///
/// [Public Route] Exchanges email and password for a bearer token. An unknown email and a
/// wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let user = state
        .repo
        .get_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or(AppError::InvalidCredentials(INVALID_LOGIN))?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, "login rejected");
        return Err(AppError::InvalidCredentials(INVALID_LOGIN));
    }

    let token = issue_token(user.id, &state.config)?;
    let body = AuthResponse {
        user: UserProfile::from_user(&user, today()),
        token,
    };
    Ok(Json(ApiResponse::with_message(body, "Login successful")))
}

/// get_profile
///
/// [Authenticated Route] The caller's own profile, shaped by role.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing token")
    )
)]
pub async fn get_profile(auth: AuthUser) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::ok(UserProfile::from_user(&auth.user, today())))
}

/// update_profile
///
/// [Authenticated Route] Partial profile update. Fields belonging to another role are
/// ignored, and the role itself cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    let changes = payload.for_role(auth.role);
    changes.validate_for(auth.role, today())?;

    let user = state
        .repo
        .update_profile(auth.id, &changes)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    Ok(Json(ApiResponse::with_message(
        UserProfile::from_user(&user, today()),
        "Profile updated successfully",
    )))
}

/// change_password
///
/// [Authenticated Route] Replaces the caller's password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too short or unchanged"),
        (status = 401, description = "Current password incorrect")
    )
)]
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    payload.validate()?;
    if payload.new_password == payload.current_password {
        return Err(AppError::validation(
            "New password must be different from the current password",
        ));
    }
    if !verify_password(&payload.current_password, &auth.user.password_hash) {
        return Err(AppError::InvalidCredentials(
            "Current password is incorrect",
        ));
    }

    let hash = hash_password(&payload.new_password, state.config.bcrypt_cost)?;
    if !state.repo.update_password(auth.id, &hash).await? {
        return Err(AppError::NotFound("User"));
    }

    tracing::info!(user_id = %auth.id, "password changed");
    Ok(Json(ApiResponse::message_only("Password changed successfully")))
}
