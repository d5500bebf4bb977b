use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

pub const MIN_JOB_SEEKER_AGE: i32 = 16;
pub const MAX_JOB_SEEKER_AGE: i32 = 100;

// --- Roles ---

/// UserRole
///
/// The RBAC field. `Admin` cannot be chosen at registration; admin accounts are created
/// by role reassignment or seeded directly in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UserRole {
    JobSeeker,
    Recruiter,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "job_seeker",
            UserRole::Recruiter => "recruiter",
            UserRole::Admin => "admin",
        }
    }

    /// Human label used in role-guard messages.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::JobSeeker => "Job seeker",
            UserRole::Recruiter => "Recruiter",
            UserRole::Admin => "Admin",
        }
    }

    pub fn is_self_registerable(&self) -> bool {
        matches!(self, UserRole::JobSeeker | UserRole::Recruiter)
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim() {
            "job_seeker" => Ok(UserRole::JobSeeker),
            "recruiter" => Ok(UserRole::Recruiter),
            "admin" => Ok(UserRole::Admin),
            _ => Err(AppError::validation("Invalid role")),
        }
    }
}

// --- Profile sub-records ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub present: bool,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gpa: String,
}

// --- Persisted record ---

/// User
///
/// Canonical account record from the `users` table. Carries the password hash, so it is
/// never serialized; every response goes through `UserProfile` instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Stored lowercased and trimmed, unique.
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    pub role: UserRole,

    // Job seeker fields.
    pub date_of_birth: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub expertise: Vec<String>,
    pub hobbies: Vec<String>,
    pub experience: String,
    pub education: String,
    #[sqlx(json)]
    pub experience_entries: Vec<ExperienceEntry>,
    #[sqlx(json)]
    pub education_entries: Vec<EducationEntry>,
    pub resume: String,

    // Recruiter fields.
    pub company: Option<String>,
    pub company_description: String,
    pub website: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh record from the registration input. Role-irrelevant fields stay empty.
    pub fn new(input: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            phone: input.phone,
            address: String::new(),
            role: input.role,
            date_of_birth: input.date_of_birth,
            skills: Vec::new(),
            expertise: Vec::new(),
            hobbies: Vec::new(),
            experience: String::new(),
            education: String::new(),
            experience_entries: Vec::new(),
            education_entries: Vec::new(),
            resume: String::new(),
            company: input.company,
            company_description: input.company_description,
            website: input.website,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.date_of_birth.map(|dob| age_on(dob, today))
    }

    /// Applies a role-filtered profile update in place.
    pub fn apply_profile(&mut self, changes: &UpdateProfileRequest, now: DateTime<Utc>) {
        if let Some(v) = &changes.name {
            self.name = v.clone();
        }
        if let Some(v) = &changes.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &changes.address {
            self.address = v.clone();
        }
        if let Some(v) = changes.date_of_birth {
            self.date_of_birth = Some(v);
        }
        if let Some(v) = &changes.skills {
            self.skills = v.clone();
        }
        if let Some(v) = &changes.expertise {
            self.expertise = v.clone();
        }
        if let Some(v) = &changes.hobbies {
            self.hobbies = v.clone();
        }
        if let Some(v) = &changes.experience {
            self.experience = v.clone();
        }
        if let Some(v) = &changes.education {
            self.education = v.clone();
        }
        if let Some(v) = &changes.experience_entries {
            self.experience_entries = v.clone();
        }
        if let Some(v) = &changes.education_entries {
            self.education_entries = v.clone();
        }
        if let Some(v) = &changes.resume {
            self.resume = v.clone();
        }
        if let Some(v) = &changes.company {
            self.company = Some(v.clone());
        }
        if let Some(v) = &changes.company_description {
            self.company_description = v.clone();
        }
        if let Some(v) = &changes.website {
            self.website = v.clone();
        }
        self.updated_at = now;
    }
}

/// Whole years between `dob` and `today`, one less when this year's birthday is still ahead.
/// A Feb 29 birthday counts as reached on Mar 1 in non-leap years.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

pub fn validate_job_seeker_dob(dob: NaiveDate, today: NaiveDate) -> Result<()> {
    let age = age_on(dob, today);
    if !(MIN_JOB_SEEKER_AGE..=MAX_JOB_SEEKER_AGE).contains(&age) {
        return Err(AppError::validation(format!(
            "Job seekers must be between {MIN_JOB_SEEKER_AGE} and {MAX_JOB_SEEKER_AGE} years old"
        )));
    }
    Ok(())
}

/// NewUser
///
/// Validated registration data handed to the repository. The email is already normalised
/// and the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub role: UserRole,
    pub date_of_birth: Option<NaiveDate>,
    pub company: Option<String>,
    pub company_description: String,
    pub website: String,
}

// --- Public views ---

/// UserProfile
///
/// The public view of a user, shaped by role. Serialized with a `role` tag so clients can
/// switch on it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
#[ts(export)]
pub enum UserProfile {
    JobSeeker(JobSeekerProfile),
    Recruiter(RecruiterProfile),
    Admin(AdminProfile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobSeekerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: Option<NaiveDate>,
    // Derived on read, never stored.
    pub age: Option<i32>,
    pub skills: Vec<String>,
    pub expertise: Vec<String>,
    pub hobbies: Vec<String>,
    pub experience: String,
    pub education: String,
    pub experience_entries: Vec<ExperienceEntry>,
    pub education_entries: Vec<EducationEntry>,
    pub resume: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecruiterProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub company_description: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_user(user: &User, today: NaiveDate) -> Self {
        match user.role {
            UserRole::JobSeeker => UserProfile::JobSeeker(JobSeekerProfile {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                address: user.address.clone(),
                date_of_birth: user.date_of_birth,
                age: user.age_on(today),
                skills: user.skills.clone(),
                expertise: user.expertise.clone(),
                hobbies: user.hobbies.clone(),
                experience: user.experience.clone(),
                education: user.education.clone(),
                experience_entries: user.experience_entries.clone(),
                education_entries: user.education_entries.clone(),
                resume: user.resume.clone(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            }),
            UserRole::Recruiter => UserProfile::Recruiter(RecruiterProfile {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                address: user.address.clone(),
                company: user.company.clone().unwrap_or_default(),
                company_description: user.company_description.clone(),
                website: user.website.clone(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            }),
            UserRole::Admin => UserProfile::Admin(AdminProfile {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                address: user.address.clone(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            UserProfile::JobSeeker(p) => p.id,
            UserProfile::Recruiter(p) => p.id,
            UserProfile::Admin(p) => p.id,
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            UserProfile::JobSeeker(_) => UserRole::JobSeeker,
            UserProfile::Recruiter(_) => UserRole::Recruiter,
            UserProfile::Admin(_) => UserRole::Admin,
        }
    }
}

/// ApplicantSummary
///
/// What a recruiter sees of a job seeker who applied to one of their postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub resume: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
}

impl ApplicantSummary {
    pub fn from_user(user: &User, today: NaiveDate) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            resume: user.resume.clone(),
            skills: user.skills.clone(),
            experience: user.experience.clone(),
            education: user.education.clone(),
            date_of_birth: user.date_of_birth,
            age: user.age_on(today),
        }
    }
}

// --- Request payloads ---

/// RegisterRequest
///
/// Input payload for POST /api/auth/register. `role` is kept as a raw string so an
/// unknown value reports a validation error instead of a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[schema(example = "job_seeker")]
    pub role: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// AuthResponse
///
/// Returned by register and login: the caller's profile and a freshly signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// UpdateProfileRequest
///
/// Input payload for PUT /api/auth/profile. Absent fields are left unchanged. Fields that
/// do not belong to the caller's role are dropped by `for_role`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
    pub expertise: Option<Vec<String>>,
    pub hobbies: Option<Vec<String>>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub experience_entries: Option<Vec<ExperienceEntry>>,
    pub education_entries: Option<Vec<EducationEntry>>,
    pub resume: Option<String>,
    pub company: Option<String>,
    pub company_description: Option<String>,
    pub website: Option<String>,
}

impl UpdateProfileRequest {
    pub fn for_role(mut self, role: UserRole) -> Self {
        if role != UserRole::JobSeeker {
            self.date_of_birth = None;
            self.skills = None;
            self.expertise = None;
            self.hobbies = None;
            self.experience = None;
            self.education = None;
            self.experience_entries = None;
            self.education_entries = None;
            self.resume = None;
        }
        if role != UserRole::Recruiter {
            self.company = None;
            self.company_description = None;
            self.website = None;
        }
        self
    }

    pub fn validate_for(&self, role: UserRole, today: NaiveDate) -> Result<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(AppError::validation("Name cannot be empty"));
        }
        if role == UserRole::JobSeeker {
            if let Some(dob) = self.date_of_birth {
                validate_job_seeker_dob(dob, today)?;
            }
        }
        if role == UserRole::Recruiter && matches!(&self.company, Some(c) if c.trim().is_empty())
        {
            return Err(AppError::validation("Company name is required for recruiters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    #[schema(example = "recruiter")]
    pub role: String,
}
