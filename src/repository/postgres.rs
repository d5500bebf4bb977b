use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use super::{DUPLICATE_APPLICATION, DUPLICATE_EMAIL, Repository};
use crate::error::{AppError, Result};
use crate::models::{
    AdminJobFilter, Application, ApplicationFilter, ApplicationStatus, ContactFilter,
    ContactMessage, ContactStatus, Cv, CvInput, DEFAULT_CV_TITLE, DashboardStats, Job,
    JobChanges, JobFilter, JobSort, NewApplication, NewContactMessage, NewJob, NewUser,
    UpdateProfileRequest, User, UserFilter, UserRole,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, address, role, \
    date_of_birth, skills, expertise, hobbies, experience, education, \
    experience_entries, education_entries, resume, company, company_description, website, \
    created_at, updated_at";

const JOB_COLUMNS: &str = "id, recruiter_id, title, company, location, salary, salary_amount, \
    description, requirements, job_type, remote, experience, application_deadline, \
    age_min, age_max, status, created_at, updated_at";

const APPLICATION_COLUMNS: &str =
    "id, job_id, job_seeker_id, recruiter_id, status, cover_letter, applied_at, updated_at";

const CV_COLUMNS: &str = "id, user_id, title, template, data, is_default, created_at, updated_at";

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, subject, message, user_type, status, created_at, updated_at";

#[derive(FromRow)]
struct JobWithCount {
    #[sqlx(flatten)]
    job: Job,
    applications_count: i64,
}

/// Maps a unique violation to a domain conflict with `message`; other errors convert as usual.
fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::from(err),
    }
}

/// `%term%` for `ILIKE ... ESCAPE '\'`, with the term's own wildcards matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, limit: i64, offset: i64) {
    builder.push(" LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);
}

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by a Postgres pool. All queries
/// are runtime-checked; dynamic filters are assembled with `QueryBuilder` and bound
/// parameters only.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_job_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
        builder.push(" WHERE status = 'active'");
        if let Some(min) = filter.min_salary {
            builder.push(" AND salary_amount >= ");
            builder.push_bind(min);
        }
        if let Some(max) = filter.max_salary {
            builder.push(" AND salary_amount <= ");
            builder.push_bind(max);
        }
    }

    fn push_admin_job_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AdminJobFilter) {
        builder.push(" WHERE TRUE");
        if let Some(status) = filter.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(term) = &filter.search {
            let pattern = contains_pattern(term);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR company ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\')");
        }
    }

    fn push_user_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
        builder.push(" WHERE TRUE");
        if let Some(role) = filter.role {
            builder.push(" AND role = ");
            builder.push_bind(role);
        }
        if let Some(term) = &filter.search {
            let pattern = contains_pattern(term);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR email ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\')");
        }
    }

    async fn count(&self, mut builder: QueryBuilder<'_, Postgres>) -> Result<i64> {
        Ok(builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn create_user(&self, input: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, phone, role, date_of_birth, \
             company, company_description, website) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(input.role)
            .bind(input.date_of_birth)
            .bind(&input.company)
            .bind(&input.company_description)
            .bind(&input.website)
            .fetch_one(&self.pool)
            .await
            .map_err(conflict_on_unique(DUPLICATE_EMAIL))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    /// update_profile
    ///
    /// Partial update: every parameter is `COALESCE`d with the stored column, so `None`
    /// leaves that column untouched.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &UpdateProfileRequest,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                date_of_birth = COALESCE($5, date_of_birth),
                skills = COALESCE($6, skills),
                expertise = COALESCE($7, expertise),
                hobbies = COALESCE($8, hobbies),
                experience = COALESCE($9, experience),
                education = COALESCE($10, education),
                experience_entries = COALESCE($11, experience_entries),
                education_entries = COALESCE($12, education_entries),
                resume = COALESCE($13, resume),
                company = COALESCE($14, company),
                company_description = COALESCE($15, company_description),
                website = COALESCE($16, website),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.phone)
            .bind(&changes.address)
            .bind(changes.date_of_birth)
            .bind(&changes.skills)
            .bind(&changes.expertise)
            .bind(&changes.hobbies)
            .bind(&changes.experience)
            .bind(&changes.education)
            .bind(changes.experience_entries.as_ref().map(Json))
            .bind(changes.education_entries.as_ref().map(Json))
            .bind(&changes.resume)
            .bind(&changes.company)
            .bind(&changes.company_description)
            .bind(&changes.website)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<User>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
        Self::push_user_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        Self::push_user_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut builder, filter.page.limit, filter.page.offset());
        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;
        Ok((users, total))
    }

    async fn set_user_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// delete_user
    ///
    /// One transaction: dependent applications, jobs and CVs go first, then the user.
    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let applications = sqlx::query(
            "DELETE FROM applications \
             WHERE job_seeker_id = $1 OR recruiter_id = $1 \
                OR job_id IN (SELECT id FROM jobs WHERE recruiter_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let jobs = sqlx::query("DELETE FROM jobs WHERE recruiter_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cvs WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let user = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if user.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;

        tracing::info!(
            user_id = %id,
            jobs = jobs.rows_affected(),
            applications = applications.rows_affected(),
            "user deleted with cascade"
        );
        Ok(true)
    }

    // --- JOBS ---

    /// list_jobs
    ///
    /// Salary bounds and salary ordering use `salary_amount`; rows without one are excluded
    /// by the bounds and sorted last.
    async fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        Self::push_job_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        Self::push_job_filter(&mut builder, filter);
        builder.push(match filter.sort {
            JobSort::Newest => " ORDER BY created_at DESC, id DESC",
            JobSort::SalaryAsc => " ORDER BY salary_amount ASC NULLS LAST, created_at DESC, id DESC",
            JobSort::SalaryDesc => " ORDER BY salary_amount DESC NULLS LAST, created_at DESC, id DESC",
        });
        push_page(&mut builder, filter.page.limit, filter.page.offset());

        let jobs = builder
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await?;
        Ok((jobs, total))
    }

    async fn list_all_jobs(&self, filter: &AdminJobFilter) -> Result<(Vec<Job>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        Self::push_admin_job_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut builder = QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        Self::push_admin_job_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut builder, filter.page.limit, filter.page.offset());

        let jobs = builder
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await?;
        Ok((jobs, total))
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_jobs(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_owned_job(&self, id: Uuid, recruiter_id: Uuid) -> Result<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND recruiter_id = $2");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(recruiter_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_recruiter_jobs(&self, recruiter_id: Uuid) -> Result<Vec<(Job, i64)>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS}, \
             (SELECT COUNT(*) FROM applications a WHERE a.job_id = jobs.id) AS applications_count \
             FROM jobs WHERE recruiter_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, JobWithCount>(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.job, row.applications_count))
            .collect())
    }

    async fn create_job(&self, input: NewJob) -> Result<Job> {
        let sql = format!(
            "INSERT INTO jobs (id, recruiter_id, title, company, location, salary, salary_amount, \
             description, requirements, job_type, remote, experience, application_deadline, \
             age_min, age_max, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {JOB_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.recruiter_id)
            .bind(&input.title)
            .bind(&input.company)
            .bind(&input.location)
            .bind(&input.salary)
            .bind(input.salary_amount)
            .bind(&input.description)
            .bind(&input.requirements)
            .bind(input.job_type)
            .bind(input.remote)
            .bind(input.experience)
            .bind(input.application_deadline)
            .bind(input.age_limit.min)
            .bind(input.age_limit.max)
            .bind(input.status)
            .fetch_one(&self.pool)
            .await?)
    }

    /// update_job
    ///
    /// Owner-scoped partial update. `salary` and `salary_amount` change together: when a
    /// new salary is sent, its numeric amount replaces the stored one even if it is `NULL`.
    async fn update_job(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        changes: &JobChanges,
    ) -> Result<Option<Job>> {
        let sql = format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($3, title),
                location = COALESCE($4, location),
                salary = COALESCE($5, salary),
                salary_amount = CASE WHEN $5 IS NULL THEN salary_amount ELSE $6 END,
                description = COALESCE($7, description),
                requirements = COALESCE($8, requirements),
                job_type = COALESCE($9, job_type),
                remote = COALESCE($10, remote),
                experience = COALESCE($11, experience),
                application_deadline = COALESCE($12, application_deadline),
                age_min = COALESCE($13, age_min),
                age_max = COALESCE($14, age_max),
                status = COALESCE($15, status),
                updated_at = NOW()
            WHERE id = $1 AND recruiter_id = $2
            RETURNING {JOB_COLUMNS}
            "#
        );
        let (salary, salary_amount) = match &changes.salary {
            Some((text, amount)) => (Some(text.as_str()), *amount),
            None => (None, None),
        };
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .bind(recruiter_id)
            .bind(&changes.title)
            .bind(&changes.location)
            .bind(salary)
            .bind(salary_amount)
            .bind(&changes.description)
            .bind(&changes.requirements)
            .bind(changes.job_type)
            .bind(changes.remote)
            .bind(changes.experience)
            .bind(changes.application_deadline)
            .bind(changes.age_limit.map(|a| a.min))
            .bind(changes.age_limit.map(|a| a.max))
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// delete_job
    ///
    /// The ownership check, the application cascade and the job delete share one
    /// transaction, so no dangling applications survive a failure half way.
    async fn delete_job(&self, id: Uuid, owner: Option<Uuid>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM jobs WHERE id = $1 AND ($2::uuid IS NULL OR recruiter_id = $2) \
             FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        if found.is_none() {
            return Ok(false);
        }

        let applications = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            job_id = %id,
            applications = applications.rows_affected(),
            "job deleted with cascade"
        );
        Ok(true)
    }

    // --- APPLICATIONS ---

    async fn create_application(&self, input: NewApplication) -> Result<Application> {
        let sql = format!(
            "INSERT INTO applications (id, job_id, job_seeker_id, recruiter_id, cover_letter) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.job_id)
            .bind(input.job_seeker_id)
            .bind(input.recruiter_id)
            .bind(&input.cover_letter)
            .fetch_one(&self.pool)
            .await
            .map_err(conflict_on_unique(DUPLICATE_APPLICATION))
    }

    async fn list_seeker_applications(&self, job_seeker_id: Uuid) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE job_seeker_id = $1 ORDER BY applied_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(job_seeker_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_recruiter_applications(&self, recruiter_id: Uuid) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE recruiter_id = $1 ORDER BY applied_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(recruiter_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE job_id = $1 ORDER BY applied_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        recruiter_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let sql = format!(
            "UPDATE applications SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND recruiter_id = $2 RETURNING {APPLICATION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .bind(recruiter_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_all_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<(Vec<Application>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM applications");
        let mut builder =
            QueryBuilder::new(format!("SELECT {APPLICATION_COLUMNS} FROM applications"));
        if let Some(status) = filter.status {
            count.push(" WHERE status = ");
            count.push_bind(status);
            builder.push(" WHERE status = ");
            builder.push_bind(status);
        }
        let total = self.count(count).await?;

        builder.push(" ORDER BY applied_at DESC, id DESC");
        push_page(&mut builder, filter.page.limit, filter.page.offset());
        let applications = builder
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?;
        Ok((applications, total))
    }

    // --- CVS ---

    async fn list_cvs(&self, user_id: Uuid) -> Result<Vec<Cv>> {
        let sql = format!(
            "SELECT {CV_COLUMNS} FROM cvs WHERE user_id = $1 ORDER BY updated_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Cv>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// create_cv
    ///
    /// Clearing the owner's other defaults and inserting share one transaction.
    async fn create_cv(&self, user_id: Uuid, input: CvInput) -> Result<Cv> {
        let mut tx = self.pool.begin().await?;

        if input.wants_default() {
            sqlx::query("UPDATE cvs SET is_default = FALSE WHERE user_id = $1 AND is_default")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            "INSERT INTO cvs (id, user_id, title, template, data, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CV_COLUMNS}"
        );
        let title = input
            .title_update()
            .unwrap_or_else(|| DEFAULT_CV_TITLE.to_string());
        let cv = sqlx::query_as::<_, Cv>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(title)
            .bind(input.template.unwrap_or_default())
            .bind(Json(input.data.unwrap_or_default()))
            .bind(input.is_default.unwrap_or(false))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cv)
    }

    async fn update_cv(&self, id: Uuid, user_id: Uuid, input: CvInput) -> Result<Option<Cv>> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM cvs WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Ok(None);
        }

        if input.wants_default() {
            sqlx::query(
                "UPDATE cvs SET is_default = FALSE WHERE user_id = $1 AND id <> $2 AND is_default",
            )
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            UPDATE cvs
            SET title = COALESCE($3, title),
                template = COALESCE($4, template),
                data = COALESCE($5, data),
                is_default = COALESCE($6, is_default),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CV_COLUMNS}
            "#
        );
        let cv = sqlx::query_as::<_, Cv>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(input.title_update())
            .bind(input.template)
            .bind(input.data.map(Json))
            .bind(input.is_default)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(cv))
    }

    async fn delete_cv(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- CONTACT ---

    async fn create_contact(&self, input: NewContactMessage) -> Result<ContactMessage> {
        let sql = format!(
            "INSERT INTO contact_messages (id, name, email, phone, subject, message, user_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ContactMessage>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(input.user_type)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<ContactMessage>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM contact_messages");
        let mut builder =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contact_messages"));
        if let Some(status) = filter.status {
            count.push(" WHERE status = ");
            count.push_bind(status);
            builder.push(" WHERE status = ");
            builder.push_bind(status);
        }
        let total = self.count(count).await?;

        builder.push(" ORDER BY created_at DESC, id DESC");
        push_page(&mut builder, filter.page.limit, filter.page.offset());
        let messages = builder
            .build_query_as::<ContactMessage>()
            .fetch_all(&self.pool)
            .await?;
        Ok((messages, total))
    }

    async fn set_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<Option<ContactMessage>> {
        let sql = format!(
            "UPDATE contact_messages SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ContactMessage>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- ADMIN ---

    async fn get_stats(&self) -> Result<DashboardStats> {
        Ok(sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'job_seeker') AS total_job_seekers,
                (SELECT COUNT(*) FROM users WHERE role = 'recruiter') AS total_recruiters,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS total_admins,
                (SELECT COUNT(*) FROM jobs) AS total_jobs,
                (SELECT COUNT(*) FROM jobs WHERE status = 'active') AS active_jobs,
                (SELECT COUNT(*) FROM applications) AS total_applications,
                (SELECT COUNT(*) FROM contact_messages WHERE status = 'new') AS new_contact_messages
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }
}
