use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{Page, filter_value};
use super::job::{JobDetails, JobSummary};
use super::user::ApplicantSummary;
use crate::error::{AppError, Result};

/// ApplicationStatus
///
/// Recruiters may move an application between any two statuses; there is no terminal state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == raw.trim())
            .ok_or_else(|| AppError::validation("Invalid status"))
    }
}

/// Application
///
/// One job seeker's application to one job, from the `applications` table.
/// Unique per `(job_id, job_seeker_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    // Copied from the job's owner when the application is created.
    pub recruiter_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(input: NewApplication, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: input.job_id,
            job_seeker_id: input.job_seeker_id,
            recruiter_id: input.recruiter_id,
            status: ApplicationStatus::Pending,
            cover_letter: input.cover_letter,
            applied_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub job_seeker_id: Uuid,
    pub recruiter_id: Uuid,
    pub cover_letter: String,
}

// --- Request payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// `status` is a raw string so an unknown value is reported as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateStatusRequest {
    #[schema(example = "shortlisted")]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminApplicationQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub page: Page,
}

impl TryFrom<AdminApplicationQuery> for ApplicationFilter {
    type Error = AppError;

    fn try_from(q: AdminApplicationQuery) -> Result<Self> {
        Ok(Self {
            status: filter_value(q.status.as_deref())
                .map(str::parse::<ApplicationStatus>)
                .transpose()?,
            page: Page::new(q.page, q.limit),
        })
    }
}

// --- Response shapes ---

/// ApplicationView
///
/// An application enriched with the job it targets and, for recruiter and admin views,
/// the applicant. Missing references (a job deleted mid-request) are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub applicant: Option<ApplicantSummary>,
}

/// JobApplicant
///
/// One row of a recruiter's per-job applicant list. `ageEligible` is `null` when the
/// applicant has no date of birth on file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobApplicant {
    #[serde(flatten)]
    pub application: Application,
    pub applicant: Option<ApplicantSummary>,
    pub age_eligible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobApplications {
    pub job: JobDetails,
    pub applications: Vec<JobApplicant>,
}
