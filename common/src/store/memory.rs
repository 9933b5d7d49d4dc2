// In-memory store implementation
//
// Backs tests and local development. Behavior mirrors the Postgres
// implementation: same uniqueness contract on applications, same
// matching semantics, applications derived onto jobs on read.

use crate::errors::StoreError;
use crate::matching;
use crate::models::{Application, ApplicationStatus, Company, Job, Profile, User};
use crate::recommendations;
use crate::store::{ApplicationStore, CompanyStore, JobStore, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
    companies: HashMap<Uuid, Company>,
}

impl Inner {
    fn job_with_applications(&self, job: &Job) -> Job {
        let mut applications: Vec<&Application> = self
            .applications
            .values()
            .filter(|a| a.job_id == job.id)
            .collect();
        applications.sort_by_key(|a| (a.created_at, a.id));

        let mut job = job.clone();
        job.applications = applications.into_iter().map(|a| a.id).collect();
        job
    }
}

/// Shared in-memory store implementing every store trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored applications; test observability
    pub async fn application_count(&self) -> usize {
        self.inner.read().await.applications.len()
    }

    // The `create`/`find_by_id` names collide across the store traits;
    // these inherent forms save callers the qualified syntax.

    pub async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        UserStore::create(self, user).await
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        UserStore::find_by_id(self, id).await
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn find_with_empty_skills(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.profile.skills.is_empty())
            .cloned()
            .collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn find_matching_requirements(
        &self,
        requirements: &[String],
    ) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| matching::skills_match_requirements(&u.profile.skills, requirements))
            .cloned()
            .collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&user.id) {
            Some(stored) => {
                let mut user = user.clone();
                user.updated_at = Utc::now();
                *stored = user;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "User not found: {}",
                user.id
            ))),
        }
    }

    async fn record_search(&self, id: Uuid, raw_query: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("User not found: {}", id)))?;

        let changed = recommendations::push_search_entry(&mut user.search_history, raw_query);
        if changed {
            user.updated_at = Utc::now();
        }
        Ok(changed)
    }

    async fn clear_search_history(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("User not found: {}", id)))?;

        user.search_history.clear();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, job: &Job) -> Result<(), StoreError> {
        self.inner.write().await.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .jobs
            .get(&id)
            .map(|job| inner.job_with_applications(job)))
    }

    async fn find_all(&self) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .map(|job| inner.job_with_applications(job))
            .collect();
        jobs.sort_by_key(|j| (std::cmp::Reverse(j.created_at), j.id));
        Ok(jobs)
    }

    async fn find_matching_profile(&self, profile: &Profile) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner
            .jobs
            .values()
            .filter(|job| matching::job_matches_profile(profile, job))
            .map(|job| inner.job_with_applications(job))
            .collect();
        jobs.sort_by_key(|j| (std::cmp::Reverse(j.created_at), j.id));
        Ok(jobs)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.jobs.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("Job not found: {}", id)));
        }
        // Same cascade as the Postgres schema
        inner.applications.retain(|_, a| a.job_id != id);
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create(&self, application: &Application) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .applications
            .values()
            .any(|a| a.job_id == application.job_id && a.applicant_id == application.applicant_id);
        if duplicate {
            return Err(StoreError::DuplicateKey(format!(
                "Application already exists for job {} and applicant {}",
                application.job_id, application.applicant_id
            )));
        }

        inner
            .applications
            .insert(application.id, application.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.inner.read().await.applications.get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let application = inner
            .applications
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("Application not found: {}", id)))?;

        application.status = status;
        application.updated_at = Utc::now();
        Ok(())
    }

    async fn find_applicants_of_job(&self, job_id: Uuid) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut applications: Vec<&Application> = inner
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .collect();
        applications.sort_by_key(|a| (a.created_at, a.id));

        Ok(applications
            .into_iter()
            .filter_map(|a| inner.users.get(&a.applicant_id).cloned())
            .collect())
    }
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn create(&self, company: &Company) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .companies
            .insert(company.id, company.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(self.inner.read().await.companies.get(&id).cloned())
    }
}
