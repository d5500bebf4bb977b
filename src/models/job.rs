use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::{Page, PageMeta, filter_value, non_blank};
use crate::error::{AppError, Result};

pub const MIN_AGE_LIMIT: i32 = 16;
pub const MAX_AGE_LIMIT: i32 = 100;
pub const DEFAULT_AGE_MIN: i32 = 18;
pub const DEFAULT_AGE_MAX: i32 = 65;

// --- Enumerations ---

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "job_type")]
#[ts(export)]
pub enum JobType {
    #[default]
    #[serde(rename = "full-time")]
    #[sqlx(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    #[sqlx(rename = "part-time")]
    PartTime,
    #[serde(rename = "contract")]
    #[sqlx(rename = "contract")]
    Contract,
    #[serde(rename = "internship")]
    #[sqlx(rename = "internship")]
    Internship,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "experience_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Mid,
    Senior,
    Lead,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
    Draft,
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim() {
            "active" => Ok(JobStatus::Active),
            "closed" => Ok(JobStatus::Closed),
            "draft" => Ok(JobStatus::Draft),
            _ => Err(AppError::validation("Invalid job status")),
        }
    }
}

// --- Age limit ---

/// AgeLimit
///
/// Inclusive age window a posting accepts. Persisted as the `age_min`/`age_max` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[ts(export)]
pub struct AgeLimit {
    #[sqlx(rename = "age_min")]
    pub min: i32,
    #[sqlx(rename = "age_max")]
    pub max: i32,
}

impl Default for AgeLimit {
    fn default() -> Self {
        Self {
            min: DEFAULT_AGE_MIN,
            max: DEFAULT_AGE_MAX,
        }
    }
}

impl AgeLimit {
    pub fn validate(&self) -> Result<()> {
        if self.min < MIN_AGE_LIMIT {
            return Err(AppError::validation(format!(
                "Minimum age must be at least {MIN_AGE_LIMIT}"
            )));
        }
        if self.max > MAX_AGE_LIMIT {
            return Err(AppError::validation(format!(
                "Maximum age cannot exceed {MAX_AGE_LIMIT}"
            )));
        }
        if self.min >= self.max {
            return Err(AppError::validation(
                "Minimum age must be less than maximum age",
            ));
        }
        Ok(())
    }

    pub fn is_eligible(&self, age: i32) -> bool {
        self.min <= age && age <= self.max
    }
}

/// Partial age window from client input. Missing bounds fall back to `base`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct AgeLimitInput {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl AgeLimitInput {
    pub fn resolve(&self, base: AgeLimit) -> AgeLimit {
        AgeLimit {
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
        }
    }
}

// --- Salary ---

/// SalaryInput
///
/// Clients send either a number or a free-text label ("Competitive", "50000").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum SalaryInput {
    Amount(i64),
    Text(String),
}

impl SalaryInput {
    /// Display text plus the numeric amount used for filtering and sorting.
    pub fn normalize(&self) -> (String, Option<i64>) {
        match self {
            SalaryInput::Amount(n) => (n.to_string(), Some(*n).filter(|n| *n >= 0)),
            SalaryInput::Text(text) => {
                let text = text.trim().to_string();
                let amount = parse_salary_amount(&text);
                (text, amount)
            }
        }
    }
}

/// Numeric salaries only. Free text such as "50k" or "Negotiable" yields `None`.
pub fn parse_salary_amount(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

// --- Persisted record ---

/// Job
///
/// A posting from the `jobs` table, owned by exactly one recruiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Job {
    pub id: Uuid,
    // FK to users.id (owner).
    pub recruiter_id: Uuid,
    pub title: String,
    // Copied from the recruiter's profile at creation.
    pub company: String,
    pub location: String,
    pub salary: String,
    pub salary_amount: Option<i64>,
    pub description: String,
    pub requirements: Vec<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub remote: bool,
    pub experience: ExperienceLevel,
    pub application_deadline: DateTime<Utc>,
    #[sqlx(flatten)]
    pub age_limit: AgeLimit,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(input: NewJob, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recruiter_id: input.recruiter_id,
            title: input.title,
            company: input.company,
            location: input.location,
            salary: input.salary,
            salary_amount: input.salary_amount,
            description: input.description,
            requirements: input.requirements,
            job_type: input.job_type,
            remote: input.remote,
            experience: input.experience,
            application_deadline: input.application_deadline,
            age_limit: input.age_limit,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.application_deadline
    }

    pub fn apply_changes(&mut self, changes: &JobChanges, now: DateTime<Utc>) {
        if let Some(v) = &changes.title {
            self.title = v.clone();
        }
        if let Some(v) = &changes.location {
            self.location = v.clone();
        }
        if let Some((text, amount)) = &changes.salary {
            self.salary = text.clone();
            self.salary_amount = *amount;
        }
        if let Some(v) = &changes.description {
            self.description = v.clone();
        }
        if let Some(v) = &changes.requirements {
            self.requirements = v.clone();
        }
        if let Some(v) = changes.job_type {
            self.job_type = v;
        }
        if let Some(v) = changes.remote {
            self.remote = v;
        }
        if let Some(v) = changes.experience {
            self.experience = v;
        }
        if let Some(v) = changes.application_deadline {
            self.application_deadline = v;
        }
        if let Some(v) = changes.age_limit {
            self.age_limit = v;
        }
        if let Some(v) = changes.status {
            self.status = v;
        }
        self.updated_at = now;
    }
}

/// NewJob
///
/// Validated creation data. `company` comes from the recruiter, never from the client.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub recruiter_id: Uuid,
    pub company: String,
    pub title: String,
    pub location: String,
    pub salary: String,
    pub salary_amount: Option<i64>,
    pub description: String,
    pub requirements: Vec<String>,
    pub job_type: JobType,
    pub remote: bool,
    pub experience: ExperienceLevel,
    pub application_deadline: DateTime<Utc>,
    pub age_limit: AgeLimit,
    pub status: JobStatus,
}

/// JobChanges
///
/// Validated partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub salary: Option<(String, Option<i64>)>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub job_type: Option<JobType>,
    pub remote: Option<bool>,
    pub experience: Option<ExperienceLevel>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub age_limit: Option<AgeLimit>,
    pub status: Option<JobStatus>,
}

fn validate_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if deadline <= now {
        return Err(AppError::validation(
            "Application deadline must be in the future",
        ));
    }
    Ok(())
}

// --- Request payloads ---

/// CreateJobRequest
///
/// Input payload for POST /api/jobs. Any `company` sent by the client is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Job title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[serde(default)]
    pub salary: Option<SalaryInput>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub experience: ExperienceLevel,
    pub application_deadline: DateTime<Utc>,
    #[serde(default)]
    pub age_limit: Option<AgeLimitInput>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

impl CreateJobRequest {
    pub fn into_new_job(
        self,
        recruiter_id: Uuid,
        company: String,
        now: DateTime<Utc>,
    ) -> Result<NewJob> {
        self.validate()?;
        if self.title.trim().is_empty() || self.location.trim().is_empty() {
            return Err(AppError::validation("Title and location are required"));
        }
        validate_deadline(self.application_deadline, now)?;
        let age_limit = self
            .age_limit
            .unwrap_or_default()
            .resolve(AgeLimit::default());
        age_limit.validate()?;

        let (salary, salary_amount) = self
            .salary
            .as_ref()
            .map(SalaryInput::normalize)
            .unwrap_or_default();

        Ok(NewJob {
            recruiter_id,
            company,
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            salary,
            salary_amount,
            description: self.description,
            requirements: clean_requirements(self.requirements),
            job_type: self.job_type,
            remote: self.remote,
            experience: self.experience,
            application_deadline: self.application_deadline,
            age_limit,
            status: self.status.unwrap_or_default(),
        })
    }
}

/// UpdateJobRequest
///
/// Input payload for PUT /api/jobs/{id}. Only present fields are validated and written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    pub salary: Option<SalaryInput>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub remote: Option<bool>,
    pub experience: Option<ExperienceLevel>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub age_limit: Option<AgeLimitInput>,
    pub status: Option<JobStatus>,
}

impl UpdateJobRequest {
    /// Validates against the job being edited, so a half-specified age window is checked
    /// together with the stored bound it leaves in place.
    pub fn into_changes(self, current: &Job, now: DateTime<Utc>) -> Result<JobChanges> {
        if let Some(deadline) = self.application_deadline {
            validate_deadline(deadline, now)?;
        }
        let age_limit = match self.age_limit {
            Some(input) => {
                let resolved = input.resolve(current.age_limit);
                resolved.validate()?;
                Some(resolved)
            }
            None => None,
        };
        let title = match self.title {
            Some(t) => Some(
                non_blank(Some(t.as_str()))
                    .ok_or_else(|| AppError::validation("Job title is required"))?,
            ),
            None => None,
        };
        let location = match self.location {
            Some(l) => Some(
                non_blank(Some(l.as_str()))
                    .ok_or_else(|| AppError::validation("Location is required"))?,
            ),
            None => None,
        };

        Ok(JobChanges {
            title,
            location,
            salary: self.salary.as_ref().map(SalaryInput::normalize),
            description: self.description,
            requirements: self.requirements.map(clean_requirements),
            job_type: self.job_type,
            remote: self.remote,
            experience: self.experience,
            application_deadline: self.application_deadline,
            age_limit,
            status: self.status,
        })
    }
}

fn clean_requirements(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

// --- Listing ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobSort {
    #[default]
    Newest,
    SalaryAsc,
    SalaryDesc,
}

impl JobSort {
    /// Unknown values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("salary_asc") => JobSort::SalaryAsc,
            Some("salary_desc") => JobSort::SalaryDesc,
            _ => JobSort::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobSort::Newest => "newest",
            JobSort::SalaryAsc => "salary_asc",
            JobSort::SalaryDesc => "salary_desc",
        }
    }
}

/// JobListQuery
///
/// Query string of GET /api/jobs.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct JobListQuery {
    /// `newest` (default), `salary_asc` or `salary_desc`.
    pub sort: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// JobFilter
///
/// Normalised public listing filter. Only active postings are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub sort: JobSort,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub page: Page,
}

impl From<JobListQuery> for JobFilter {
    fn from(q: JobListQuery) -> Self {
        Self {
            sort: JobSort::parse(q.sort.as_deref()),
            min_salary: q.min_salary,
            max_salary: q.max_salary,
            page: Page::new(q.page, q.limit),
        }
    }
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if job.status != JobStatus::Active {
            return false;
        }
        if self.min_salary.is_none() && self.max_salary.is_none() {
            return true;
        }
        match job.salary_amount {
            Some(amount) => {
                self.min_salary.is_none_or(|min| amount >= min)
                    && self.max_salary.is_none_or(|max| amount <= max)
            }
            None => false,
        }
    }

    /// Orders in place. Jobs without a numeric salary sort last for both salary orders.
    /// Ties fall back to newest first, then to the id, so paging is stable.
    pub fn sort(&self, jobs: &mut [Job]) {
        use std::cmp::Reverse;
        match self.sort {
            JobSort::Newest => jobs.sort_by_key(|j| (Reverse(j.created_at), Reverse(j.id))),
            JobSort::SalaryAsc => jobs.sort_by_key(|j| {
                (
                    j.salary_amount.is_none(),
                    j.salary_amount,
                    Reverse(j.created_at),
                    Reverse(j.id),
                )
            }),
            JobSort::SalaryDesc => jobs.sort_by_key(|j| {
                (
                    j.salary_amount.is_none(),
                    Reverse(j.salary_amount),
                    Reverse(j.created_at),
                    Reverse(j.id),
                )
            }),
        }
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            sort: Some(self.sort.as_str().to_string()),
            ..self.page.meta(total)
        }
    }
}

/// Admin listing: any status, optional text search over title and company.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminJobQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminJobFilter {
    pub status: Option<JobStatus>,
    pub search: Option<String>,
    pub page: Page,
}

impl TryFrom<AdminJobQuery> for AdminJobFilter {
    type Error = AppError;

    fn try_from(q: AdminJobQuery) -> Result<Self> {
        Ok(Self {
            status: filter_value(q.status.as_deref())
                .map(str::parse::<JobStatus>)
                .transpose()?,
            search: non_blank(q.search.as_deref()),
            page: Page::new(q.page, q.limit),
        })
    }
}

impl AdminJobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if self.status.is_some_and(|s| s != job.status) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                job.title.to_lowercase().contains(&term)
                    || job.company.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

// --- Response shapes ---

/// JobDetails
///
/// A job with its derived expiry flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub is_expired: bool,
}

impl JobDetails {
    pub fn new(job: Job, now: DateTime<Utc>) -> Self {
        let is_expired = job.is_expired(now);
        Self { job, is_expired }
    }
}

/// RecruiterJob
///
/// A recruiter's own posting with its current number of applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecruiterJob {
    #[serde(flatten)]
    pub job: Job,
    pub is_expired: bool,
    pub applications_count: i64,
}

/// JobSummary
///
/// Compact job reference embedded in application listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    pub application_deadline: DateTime<Utc>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            job_type: job.job_type,
            status: job.status,
            application_deadline: job.application_deadline,
        }
    }
}
