// Store boundary for users, jobs, applications, and companies
//
// The pipeline talks to persistence only through these traits. The
// Postgres implementations own all schema knowledge; the in-memory
// implementation backs tests and local development.

use crate::errors::StoreError;
use crate::models::{Application, ApplicationStatus, Company, Job, Profile, User};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgApplicationStore, PgCompanyStore, PgJobStore, PgUserStore};

/// User persistence operations
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// All users; input of the recommendation refresh pass
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Users whose skill list is empty, any role; input of the daily
    /// profile-completion nudge
    async fn find_with_empty_skills(&self) -> Result<Vec<User>, StoreError>;

    /// Users with at least one skill that case-insensitively contains
    /// at least one of the given requirements. One store-level query;
    /// an empty requirements list matches nobody.
    async fn find_matching_requirements(
        &self,
        requirements: &[String],
    ) -> Result<Vec<User>, StoreError>;

    /// Whole-record persist; `StoreError::NotFound` for unknown ids
    async fn save(&self, user: &User) -> Result<(), StoreError>;

    /// Normalize (trim, lowercase) and append a search entry, skipping
    /// empty and duplicate entries. Ok(true) when the history changed.
    async fn record_search(&self, id: Uuid, raw_query: &str) -> Result<bool, StoreError>;

    async fn clear_search_history(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Job persistence operations
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Job>, StoreError>;

    /// Jobs matching a profile: any requirement contained in any skill,
    /// or the title containing the non-empty bio. One store-level
    /// query; feeds the recommendation refresh.
    async fn find_matching_profile(&self, profile: &Profile) -> Result<Vec<Job>, StoreError>;

    /// Delete a job and its applications. `StoreError::NotFound` for
    /// unknown ids. Recommendation sets referencing the job are left
    /// untouched.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Application persistence operations
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application. The store-level uniqueness constraint
    /// on (job_id, applicant_id) surfaces a second attempt as
    /// `StoreError::DuplicateKey` with nothing written.
    async fn create(&self, application: &Application) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, StoreError>;

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), StoreError>;

    /// The users who applied to a job; the snapshot source for the
    /// job-deleted fan-out
    async fn find_applicants_of_job(&self, job_id: Uuid) -> Result<Vec<User>, StoreError>;
}

/// Company persistence operations; the pipeline only ever reads
/// companies, creation exists for seeding and tests
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn create(&self, company: &Company) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError>;
}
