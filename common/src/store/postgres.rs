// PostgreSQL store implementations
//
// Matching queries use position(lower(..) in lower(..)) rather than
// ILIKE so wildcard characters inside requirement strings still match
// literally, the same contract as the in-process predicate.

use crate::db::DbPool;
use crate::errors::StoreError;
use crate::models::{Application, ApplicationStatus, Company, Job, Profile, User};
use crate::recommendations;
use crate::store::{ApplicationStore, CompanyStore, JobStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

/// User store backed by PostgreSQL
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, full_name, email, role, skills, bio,
                job_recommendations, search_history, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.to_string())
        .bind(&user.profile.skills)
        .bind(&user.profile.bio)
        .bind(&user.job_recommendations)
        .bind(&user.search_history)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, role, skills, bio,
                   job_recommendations, search_history, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, role, skills, bio,
                   job_recommendations, search_history, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_with_empty_skills(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, role, skills, bio,
                   job_recommendations, search_history, created_at, updated_at
            FROM users
            WHERE cardinality(skills) = 0
            ORDER BY created_at
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, requirements), fields(requirement_count = requirements.len()))]
    async fn find_matching_requirements(
        &self,
        requirements: &[String],
    ) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.full_name, u.email, u.role, u.skills, u.bio,
                   u.job_recommendations, u.search_history, u.created_at, u.updated_at
            FROM users u
            WHERE EXISTS (
                SELECT 1
                FROM unnest(u.skills) AS skill,
                     unnest($1::text[]) AS requirement
                WHERE position(lower(requirement) in lower(skill)) > 0
            )
            ORDER BY u.created_at
            "#,
        )
        .bind(requirements)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, user))]
    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2,
                email = $3,
                role = $4,
                skills = $5,
                bio = $6,
                job_recommendations = $7,
                search_history = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.to_string())
        .bind(&user.profile.skills)
        .bind(&user.profile.bio)
        .bind(&user.job_recommendations)
        .bind(&user.search_history)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "User not found: {}",
                user.id
            )));
        }

        tracing::debug!(user_id = %user.id, "User saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_search(&self, id: Uuid, raw_query: &str) -> Result<bool, StoreError> {
        let entry = recommendations::normalize_query(raw_query);
        if entry.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET search_history = array_append(search_history, $2),
                updated_at = $3
            WHERE id = $1
              AND NOT ($2 = ANY(search_history))
            "#,
        )
        .bind(id)
        .bind(&entry)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            // Either the entry was already present or the user is unknown
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(id)
                    .fetch_one(self.pool.pool())
                    .await?;
            if !exists {
                return Err(StoreError::NotFound(format!("User not found: {}", id)));
            }
            return Ok(false);
        }

        tracing::debug!(user_id = %id, query = %entry, "Search entry recorded");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn clear_search_history(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET search_history = '{}',
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("User not found: {}", id)));
        }

        tracing::info!(user_id = %id, "Search history cleared");
        Ok(())
    }
}

/// Job store backed by PostgreSQL
#[derive(Clone)]
pub struct PgJobStore {
    pool: DbPool,
}

impl PgJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job))]
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, description, requirements, salary, location,
                job_type, experience_level, company_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(job.salary)
        .bind(&job.location)
        .bind(&job.job_type)
        .bind(job.experience_level)
        .bind(job.company_id)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(job_id = %job.id, title = %job.title, "Job created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT j.id, j.title, j.description, j.requirements, j.salary,
                   j.location, j.job_type, j.experience_level, j.company_id,
                   ARRAY(
                       SELECT a.id FROM applications a
                       WHERE a.job_id = j.id
                       ORDER BY a.created_at
                   ) AS applications,
                   j.created_at, j.updated_at
            FROM jobs j
            WHERE j.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(job)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT j.id, j.title, j.description, j.requirements, j.salary,
                   j.location, j.job_type, j.experience_level, j.company_id,
                   ARRAY(
                       SELECT a.id FROM applications a
                       WHERE a.job_id = j.id
                       ORDER BY a.created_at
                   ) AS applications,
                   j.created_at, j.updated_at
            FROM jobs j
            ORDER BY j.created_at DESC
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(jobs)
    }

    #[instrument(skip(self, profile), fields(skill_count = profile.skills.len()))]
    async fn find_matching_profile(&self, profile: &Profile) -> Result<Vec<Job>, StoreError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT j.id, j.title, j.description, j.requirements, j.salary,
                   j.location, j.job_type, j.experience_level, j.company_id,
                   ARRAY(
                       SELECT a.id FROM applications a
                       WHERE a.job_id = j.id
                       ORDER BY a.created_at
                   ) AS applications,
                   j.created_at, j.updated_at
            FROM jobs j
            WHERE EXISTS (
                SELECT 1
                FROM unnest(j.requirements) AS requirement,
                     unnest($1::text[]) AS skill
                WHERE position(lower(requirement) in lower(skill)) > 0
            )
               OR ($2 <> '' AND position(lower($2) in lower(j.title)) > 0)
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(&profile.skills)
        .bind(profile.bio.trim())
        .fetch_all(self.pool.pool())
        .await?;

        Ok(jobs)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        // Applications go with the job via ON DELETE CASCADE;
        // job_recommendations entries pointing at it are left as-is
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Job not found: {}", id)));
        }

        tracing::info!(job_id = %id, "Job deleted");
        Ok(())
    }
}

/// Application store backed by PostgreSQL; the unique index on
/// (job_id, applicant_id) enforces one application per user per job
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: DbPool,
}

impl PgApplicationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    #[instrument(skip(self, application))]
    async fn create(&self, application: &Application) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, job_id, applicant_id, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.applicant_id)
        .bind(application.status.to_string())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            application_id = %application.id,
            job_id = %application.job_id,
            applicant_id = %application.applicant_id,
            "Application created"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, applicant_id, status, created_at, updated_at
            FROM applications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(application)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Application not found: {}",
                id
            )));
        }

        tracing::info!(application_id = %id, status = %status, "Application status updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_applicants_of_job(&self, job_id: Uuid) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.full_name, u.email, u.role, u.skills, u.bio,
                   u.job_recommendations, u.search_history, u.created_at, u.updated_at
            FROM users u
            INNER JOIN applications a ON a.applicant_id = u.id
            WHERE a.job_id = $1
            ORDER BY a.created_at
            "#,
        )
        .bind(job_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }
}

/// Company store backed by PostgreSQL
#[derive(Clone)]
pub struct PgCompanyStore {
    pool: DbPool,
}

impl PgCompanyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    #[instrument(skip(self, company))]
    async fn create(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, description, website, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.website)
        .bind(&company.location)
        .bind(company.created_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, description, website, location, created_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(company)
    }
}
