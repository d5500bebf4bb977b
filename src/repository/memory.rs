use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DUPLICATE_APPLICATION, DUPLICATE_EMAIL, Repository};
use crate::error::{AppError, Result};
use crate::models::{
    AdminJobFilter, Application, ApplicationFilter, ApplicationStatus, ContactFilter,
    ContactMessage, ContactStatus, Cv, CvInput, DashboardStats, Job, JobChanges, JobFilter,
    JobStatus, NewApplication, NewContactMessage, NewJob, NewUser, UpdateProfileRequest, User,
    UserFilter, UserRole,
};

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    cvs: HashMap<Uuid, Cv>,
    contacts: HashMap<Uuid, ContactMessage>,
}

impl Store {
    fn clear_default_cvs(&mut self, user_id: Uuid, except: Option<Uuid>) {
        for cv in self.cvs.values_mut() {
            if cv.user_id == user_id && Some(cv.id) != except {
                cv.is_default = false;
            }
        }
    }

    fn remove_applications_where(&mut self, pred: impl Fn(&Application) -> bool) -> usize {
        let before = self.applications.len();
        self.applications.retain(|_, a| !pred(a));
        before - self.applications.len()
    }
}

/// MemoryRepository
///
/// In-process implementation of `Repository` with the same observable semantics as the
/// Postgres one. A single lock guards every collection, so each call, cascades included,
/// is atomic. Used by the test suites and for running the API without a database.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Descending by timestamp, ties broken by descending id to match the Postgres ordering.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- USERS ---

    async fn create_user(&self, input: NewUser) -> Result<User> {
        let mut store = self.store.write().await;
        if store
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        let user = User::new(input, Utc::now());
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.users.get(id).cloned()).collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &UpdateProfileRequest,
    ) -> Result<Option<User>> {
        let mut store = self.store.write().await;
        Ok(store.users.get_mut(&id).map(|user| {
            user.apply_profile(changes, Utc::now());
            user.clone()
        }))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(match store.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
        let store = self.store.read().await;
        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok((filter.page.slice(&users), users.len() as i64))
    }

    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>> {
        let mut store = self.store.write().await;
        Ok(store.users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut store = self.store.write().await;
        if store.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned_jobs: Vec<Uuid> = store
            .jobs
            .values()
            .filter(|j| j.recruiter_id == id)
            .map(|j| j.id)
            .collect();
        let applications = store.remove_applications_where(|a| {
            a.job_seeker_id == id || a.recruiter_id == id || owned_jobs.contains(&a.job_id)
        });
        store.jobs.retain(|_, j| j.recruiter_id != id);
        store.cvs.retain(|_, cv| cv.user_id != id);

        tracing::info!(
            user_id = %id,
            jobs = owned_jobs.len(),
            applications,
            "user deleted with cascade"
        );
        Ok(true)
    }

    // --- JOBS ---

    async fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64)> {
        let store = self.store.read().await;
        let mut jobs: Vec<Job> = store
            .jobs
            .values()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        filter.sort(&mut jobs);
        Ok((filter.page.slice(&jobs), jobs.len() as i64))
    }

    async fn list_all_jobs(&self, filter: &AdminJobFilter) -> Result<(Vec<Job>, i64)> {
        let store = self.store.read().await;
        let mut jobs: Vec<Job> = store
            .jobs
            .values()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        newest_first(&mut jobs, |j| (j.created_at, j.id));
        Ok((filter.page.slice(&jobs), jobs.len() as i64))
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.store.read().await.jobs.get(&id).cloned())
    }

    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.jobs.get(id).cloned()).collect())
    }

    async fn get_owned_job(&self, id: Uuid, recruiter_id: Uuid) -> Result<Option<Job>> {
        let store = self.store.read().await;
        Ok(store
            .jobs
            .get(&id)
            .filter(|j| j.recruiter_id == recruiter_id)
            .cloned())
    }

    async fn list_recruiter_jobs(&self, recruiter_id: Uuid) -> Result<Vec<(Job, i64)>> {
        let store = self.store.read().await;
        let mut jobs: Vec<(Job, i64)> = store
            .jobs
            .values()
            .filter(|j| j.recruiter_id == recruiter_id)
            .map(|j| {
                let count = store
                    .applications
                    .values()
                    .filter(|a| a.job_id == j.id)
                    .count();
                (j.clone(), count as i64)
            })
            .collect();
        newest_first(&mut jobs, |(j, _)| (j.created_at, j.id));
        Ok(jobs)
    }

    async fn create_job(&self, input: NewJob) -> Result<Job> {
        let job = Job::new(input, Utc::now());
        self.store.write().await.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update_job(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>> {
        let mut store = self.store.write().await;
        Ok(store
            .jobs
            .get_mut(&id)
            .filter(|j| j.recruiter_id == recruiter_id)
            .map(|job| {
                job.apply_changes(changes, Utc::now());
                job.clone()
            }))
    }

    async fn delete_job(&self, id: Uuid, owner: Option<Uuid>) -> Result<bool> {
        let mut store = self.store.write().await;
        let matches = store
            .jobs
            .get(&id)
            .is_some_and(|j| owner.is_none_or(|o| o == j.recruiter_id));
        if !matches {
            return Ok(false);
        }
        store.jobs.remove(&id);
        let applications = store.remove_applications_where(|a| a.job_id == id);

        tracing::info!(job_id = %id, applications, "job deleted with cascade");
        Ok(true)
    }

    // --- APPLICATIONS ---

    async fn create_application(&self, input: NewApplication) -> Result<Application> {
        let mut store = self.store.write().await;
        if store
            .applications
            .values()
            .any(|a| a.job_id == input.job_id && a.job_seeker_id == input.job_seeker_id)
        {
            return Err(AppError::Conflict(DUPLICATE_APPLICATION.to_string()));
        }
        let application = Application::new(input, Utc::now());
        store
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    async fn list_seeker_applications(&self, job_seeker_id: Uuid) -> Result<Vec<Application>> {
        let store = self.store.read().await;
        let mut items: Vec<Application> = store
            .applications
            .values()
            .filter(|a| a.job_seeker_id == job_seeker_id)
            .cloned()
            .collect();
        newest_first(&mut items, |a| (a.applied_at, a.id));
        Ok(items)
    }

    async fn list_recruiter_applications(&self, recruiter_id: Uuid) -> Result<Vec<Application>> {
        let store = self.store.read().await;
        let mut items: Vec<Application> = store
            .applications
            .values()
            .filter(|a| a.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        newest_first(&mut items, |a| (a.applied_at, a.id));
        Ok(items)
    }

    async fn list_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let store = self.store.read().await;
        let mut items: Vec<Application> = store
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        newest_first(&mut items, |a| (a.applied_at, a.id));
        Ok(items)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let mut store = self.store.write().await;
        Ok(store
            .applications
            .get_mut(&id)
            .filter(|a| a.recruiter_id == recruiter_id)
            .map(|application| {
                application.status = status;
                application.updated_at = Utc::now();
                application.clone()
            }))
    }

    async fn list_all_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(Vec<Application>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<Application> = store
            .applications
            .values()
            .filter(|a| filter.status.is_none_or(|s| s == a.status))
            .cloned()
            .collect();
        newest_first(&mut items, |a| (a.applied_at, a.id));
        Ok((filter.page.slice(&items), items.len() as i64))
    }

    // --- CVS ---

    async fn list_cvs(&self, user_id: Uuid) -> Result<Vec<Cv>> {
        let store = self.store.read().await;
        let mut cvs: Vec<Cv> = store
            .cvs
            .values()
            .filter(|cv| cv.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut cvs, |cv| (cv.updated_at, cv.id));
        Ok(cvs)
    }

    async fn create_cv(&self, user_id: Uuid, input: CvInput) -> Result<Cv> {
        let mut store = self.store.write().await;
        if input.wants_default() {
            store.clear_default_cvs(user_id, None);
        }
        let cv = Cv::new(user_id, input, Utc::now());
        store.cvs.insert(cv.id, cv.clone());
        Ok(cv)
    }

    async fn update_cv(&self, id: Uuid, user_id: Uuid, input: CvInput) -> Result<Option<Cv>> {
        let mut store = self.store.write().await;
        if !store.cvs.get(&id).is_some_and(|cv| cv.user_id == user_id) {
            return Ok(None);
        }
        if input.wants_default() {
            store.clear_default_cvs(user_id, Some(id));
        }
        Ok(store.cvs.get_mut(&id).map(|cv| {
            cv.apply(input, Utc::now());
            cv.clone()
        }))
    }

    async fn delete_cv(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut store = self.store.write().await;
        if !store.cvs.get(&id).is_some_and(|cv| cv.user_id == user_id) {
            return Ok(false);
        }
        store.cvs.remove(&id);
        Ok(true)
    }

    // --- CONTACT ---

    async fn create_contact(&self, input: NewContactMessage) -> Result<ContactMessage> {
        let message = ContactMessage::new(input, Utc::now());
        self.store
            .write()
            .await
            .contacts
            .insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<ContactMessage>, i64)> {
        let store = self.store.read().await;
        let mut items: Vec<ContactMessage> = store
            .contacts
            .values()
            .filter(|m| filter.status.is_none_or(|s| s == m.status))
            .cloned()
            .collect();
        newest_first(&mut items, |m| (m.created_at, m.id));
        Ok((filter.page.slice(&items), items.len() as i64))
    }

    async fn set_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<ContactMessage>> {
        let mut store = self.store.write().await;
        Ok(store.contacts.get_mut(&id).map(|message| {
            message.status = status;
            message.updated_at = Utc::now();
            message.clone()
        }))
    }

    // --- ADMIN ---

    async fn get_stats(&self) -> Result<DashboardStats> {
        let store = self.store.read().await;
        let count_role = |role: UserRole| store.users.values().filter(|u| u.role == role).count();
        Ok(DashboardStats {
            total_users: store.users.len() as i64,
            total_job_seekers: count_role(UserRole::JobSeeker) as i64,
            total_recruiters: count_role(UserRole::Recruiter) as i64,
            total_admins: count_role(UserRole::Admin) as i64,
            total_jobs: store.jobs.len() as i64,
            active_jobs: store
                .jobs
                .values()
                .filter(|j| j.status == JobStatus::Active)
                .count() as i64,
            total_applications: store.applications.len() as i64,
            new_contact_messages: store
                .contacts
                .values()
                .filter(|m| m.status == ContactStatus::New)
                .count() as i64,
        })
    }
}
