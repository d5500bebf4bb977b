use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AdminJobFilter, Application, ApplicationFilter, ApplicationStatus, ContactFilter,
    ContactMessage, ContactStatus, Cv, CvInput, DashboardStats, Job, JobChanges, JobFilter,
    NewApplication, NewContactMessage, NewJob, NewUser, UpdateProfileRequest, User, UserFilter,
    UserRole,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

pub const DUPLICATE_EMAIL: &str = "User already exists with this email";
pub const DUPLICATE_APPLICATION: &str = "You have already applied for this job";

/// Repository Trait
///
/// The persistence contract every handler talks to. Lookups return `Ok(None)` on a miss;
/// `Err` is reserved for store failures and uniqueness conflicts.
///
/// Methods taking an owner id fold ownership into the lookup predicate: a record owned by
/// someone else is reported exactly like a missing one.
///
/// Multi-step writes (cascade deletes, "clear other default CVs then save") are atomic in
/// every implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Fails with `Conflict(DUPLICATE_EMAIL)` when the normalised email is taken.
    async fn create_user(&self, input: NewUser) -> Result<User>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &UpdateProfileRequest,
    ) -> Result<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool>;
    /// Newest first, with the total count before paging.
    async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)>;
    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>>;
    /// Removes the user with their CVs, their jobs, and every application they sent,
    /// received, or that targets one of their jobs.
    async fn delete_user(&self, id: Uuid) -> Result<bool>;

    // --- Jobs ---
    /// Public listing: active jobs only.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64)>;
    async fn list_all_jobs(&self, filter: &AdminJobFilter) -> Result<(Vec<Job>, i64)>;
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>>;
    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>>;
    async fn get_owned_job(&self, id: Uuid, recruiter_id: Uuid) -> Result<Option<Job>>;
    /// The recruiter's jobs, newest first, each with its application count.
    async fn list_recruiter_jobs(&self, recruiter_id: Uuid) -> Result<Vec<(Job, i64)>>;
    async fn create_job(&self, input: NewJob) -> Result<Job>;
    async fn update_job(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>>;
    /// Deletes the job and all its applications. With `owner` set, only a job owned by
    /// that recruiter matches; `None` is the admin override.
    async fn delete_job(&self, id: Uuid, owner: Option<Uuid>) -> Result<bool>;

    // --- Applications ---
    /// Fails with `Conflict(DUPLICATE_APPLICATION)` for a repeated (job, job seeker) pair.
    async fn create_application(&self, input: NewApplication) -> Result<Application>;
    async fn list_seeker_applications(&self, job_seeker_id: Uuid) -> Result<Vec<Application>>;
    async fn list_recruiter_applications(&self, recruiter_id: Uuid) -> Result<Vec<Application>>;
    async fn list_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>>;
    async fn update_application_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>>;
    async fn list_all_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(Vec<Application>, i64)>;

    // --- CVs ---
    /// Most recently updated first.
    async fn list_cvs(&self, user_id: Uuid) -> Result<Vec<Cv>>;
    async fn create_cv(&self, user_id: Uuid, input: CvInput) -> Result<Cv>;
    async fn update_cv(&self, id: Uuid, user_id: Uuid, input: CvInput) -> Result<Option<Cv>>;
    async fn delete_cv(&self, id: Uuid, user_id: Uuid) -> Result<bool>;

    // --- Contact ---
    async fn create_contact(&self, input: NewContactMessage) -> Result<ContactMessage>;
    async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<ContactMessage>, i64)>;
    async fn set_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<ContactMessage>>;

    // --- Admin ---
    async fn get_stats(&self) -> Result<DashboardStats>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
