// Property-based tests for the recommendation pipeline

use async_trait::async_trait;
use common::config::SchedulerConfig;
use common::errors::{SendError, StoreError};
use common::mailer::{EmailMessage, Mailer};
use common::matching::MatchEngine;
use common::models::{Job, User, UserRole};
use common::notify::{Dispatcher, Notifier};
use common::scheduler::{Pipeline, PipelineEngine, RefreshSummary};
use common::store::{JobStore, MemoryStore, UserStore};
use proptest::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

const SKILL_POOL: &[&str] = &["rust", "python", "react", "sql", "docker", "kubernetes"];

/// Mock mailer that tracks recipients
struct MockMailer {
    sent: Arc<tokio::sync::Mutex<Vec<String>>>,
}

impl MockMailer {
    fn new() -> Self {
        Self {
            sent: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        }
    }

    async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError> {
        self.sent.lock().await.push(message.to.clone());
        Ok(())
    }
}

fn skills_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(SKILL_POOL.to_vec(), 0..=SKILL_POOL.len())
        .prop_map(|skills| skills.into_iter().map(String::from).collect())
}

fn requirements_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(SKILL_POOL.to_vec(), 1..=SKILL_POOL.len())
        .prop_map(|reqs| reqs.into_iter().map(String::from).collect())
}

fn user_with_skills(index: usize, role: UserRole, skills: Vec<String>) -> User {
    let mut user = User::new(
        format!("User {}", index),
        format!("user{}@example.com", index),
        role,
    );
    user.profile.skills = skills;
    user
}

fn job_with_requirements(index: usize, requirements: Vec<String>) -> Job {
    Job::new(
        format!("Job {}", index),
        "A role".to_string(),
        requirements,
        90_000,
        "Hanoi".to_string(),
        "full-time".to_string(),
        2,
        Uuid::new_v4(),
    )
}

async fn seeded_engine(
    users: Vec<User>,
    jobs: Vec<Job>,
    mailer: Arc<MockMailer>,
) -> Result<(PipelineEngine, MemoryStore), StoreError> {
    let store = MemoryStore::new();
    for user in &users {
        store.create_user(user).await?;
    }
    for job in &jobs {
        JobStore::create(&store, job).await?;
    }

    let user_store: Arc<dyn UserStore> = Arc::new(store.clone());
    let job_store: Arc<dyn JobStore> = Arc::new(store.clone());
    let dispatcher = Arc::new(Dispatcher::new(mailer, 4));
    let notifier = Arc::new(Notifier::new(MatchEngine::new(user_store.clone()), dispatcher));

    let engine = PipelineEngine::new(&SchedulerConfig::default(), user_store, job_store, notifier)
        .expect("default scheduler config parses");
    Ok((engine, store))
}

/// *For any* population of users and jobs, a second refresh pass over an
/// unchanged store adds nothing and leaves every recommendation list as
/// the first pass left it.
#[test]
fn property_refresh_is_idempotent() {
    proptest!(|(
        user_skills in prop::collection::vec(skills_strategy(), 1..6),
        job_requirements in prop::collection::vec(requirements_strategy(), 0..5)
    )| {
        let rt = Runtime::new()?;
        let (first, second, after_first, after_second) = rt.block_on(async move {
            let users: Vec<User> = user_skills
                .into_iter()
                .enumerate()
                .map(|(i, skills)| user_with_skills(i, UserRole::Student, skills))
                .collect();
            let jobs: Vec<Job> = job_requirements
                .into_iter()
                .enumerate()
                .map(|(i, reqs)| job_with_requirements(i, reqs))
                .collect();

            let (engine, store) = seeded_engine(users, jobs, Arc::new(MockMailer::new())).await?;

            let first = engine.refresh_recommendations().await?;
            let after_first: Vec<Vec<Uuid>> = UserStore::find_all(&store)
                .await?
                .into_iter()
                .map(|u| u.job_recommendations)
                .collect();

            let second = engine.refresh_recommendations().await?;
            let after_second: Vec<Vec<Uuid>> = UserStore::find_all(&store)
                .await?
                .into_iter()
                .map(|u| u.job_recommendations)
                .collect();

            Ok::<_, StoreError>((first, second, after_first, after_second))
        })?;

        prop_assert_eq!(second.recommendations_added, 0);
        prop_assert_eq!(after_first, after_second);
        prop_assert!(first.recommendations_added >= second.recommendations_added);
    });
}

/// *For any* preexisting recommendation, a refresh pass keeps it even
/// when the recommended job no longer exists in the store.
#[test]
fn property_refresh_never_removes_recommendations() {
    proptest!(|(
        user_skills in prop::collection::vec(skills_strategy(), 1..6),
        job_requirements in prop::collection::vec(requirements_strategy(), 0..5)
    )| {
        let rt = Runtime::new()?;
        let kept = rt.block_on(async move {
            let mut stale_by_user = std::collections::HashMap::new();
            let users: Vec<User> = user_skills
                .into_iter()
                .enumerate()
                .map(|(i, skills)| {
                    let mut user = user_with_skills(i, UserRole::Student, skills);
                    let stale_id = Uuid::new_v4();
                    user.job_recommendations.push(stale_id);
                    stale_by_user.insert(user.id, stale_id);
                    user
                })
                .collect();
            let jobs: Vec<Job> = job_requirements
                .into_iter()
                .enumerate()
                .map(|(i, reqs)| job_with_requirements(i, reqs))
                .collect();

            let (engine, store) = seeded_engine(users, jobs, Arc::new(MockMailer::new())).await?;
            engine.refresh_recommendations().await?;

            let mut kept = true;
            for user in UserStore::find_all(&store).await? {
                kept &= user.job_recommendations.contains(&stale_by_user[&user.id]);
            }
            Ok::<_, StoreError>(kept)
        })?;

        prop_assert!(kept);
    });
}

/// *For any* user population, every user ends a refresh pass either
/// processed or skipped.
#[test]
fn property_refresh_accounts_for_every_user() {
    proptest!(|(
        user_skills in prop::collection::vec(skills_strategy(), 0..8),
        job_requirements in prop::collection::vec(requirements_strategy(), 0..5)
    )| {
        let rt = Runtime::new()?;
        let (summary, user_count) = rt.block_on(async move {
            let user_count = user_skills.len();
            let users: Vec<User> = user_skills
                .into_iter()
                .enumerate()
                .map(|(i, skills)| user_with_skills(i, UserRole::Student, skills))
                .collect();
            let jobs: Vec<Job> = job_requirements
                .into_iter()
                .enumerate()
                .map(|(i, reqs)| job_with_requirements(i, reqs))
                .collect();

            let (engine, _store) = seeded_engine(users, jobs, Arc::new(MockMailer::new())).await?;
            let summary = engine.refresh_recommendations().await?;
            Ok::<_, StoreError>((summary, user_count))
        })?;

        prop_assert_eq!(summary.users_processed + summary.users_skipped, user_count);
    });
}

/// *For any* mix of roles and skill lists, a nudge pass emails exactly
/// the students whose skill list is empty, and a second pass in the
/// same day emails them again.
#[test]
fn property_nudge_targets_empty_skill_students_without_suppression() {
    proptest!(|(
        student_empty in 0usize..5,
        student_skilled in 0usize..5,
        recruiter_empty in 0usize..3
    )| {
        let rt = Runtime::new()?;
        let (first, second, total_sent) = rt.block_on(async move {
            let mut users = Vec::new();
            let mut index = 0;
            for _ in 0..student_empty {
                users.push(user_with_skills(index, UserRole::Student, Vec::new()));
                index += 1;
            }
            for _ in 0..student_skilled {
                users.push(user_with_skills(
                    index,
                    UserRole::Student,
                    vec!["rust".to_string()],
                ));
                index += 1;
            }
            for _ in 0..recruiter_empty {
                users.push(user_with_skills(index, UserRole::Recruiter, Vec::new()));
                index += 1;
            }

            let mailer = Arc::new(MockMailer::new());
            let (engine, _store) = seeded_engine(users, Vec::new(), mailer.clone()).await?;

            let first = engine.send_profile_nudges().await?;
            let second = engine.send_profile_nudges().await?;
            let total_sent = mailer.sent_count().await;
            Ok::<_, StoreError>((first, second, total_sent))
        })?;

        prop_assert_eq!(first, student_empty);
        prop_assert_eq!(second, student_empty);
        prop_assert_eq!(total_sent, student_empty * 2);
    });
}

/// The trigger loop exits once a stop is requested, with no work left
/// running afterwards.
#[tokio::test]
async fn test_pipeline_stops_on_shutdown_signal() {
    let (engine, _store) = seeded_engine(Vec::new(), Vec::new(), Arc::new(MockMailer::new()))
        .await
        .unwrap();
    let engine = Arc::new(engine);

    let runner = engine.clone();
    let handle = tokio::spawn(async move { runner.start().await });

    // Let the loop run its first refresh tick
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    engine.stop().await;

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("pipeline did not stop after shutdown signal")
        .expect("pipeline task panicked");
    assert!(result.is_ok());
}

/// An empty store yields an empty summary, not an error.
#[tokio::test]
async fn test_refresh_over_empty_store() {
    let (engine, _store) = seeded_engine(Vec::new(), Vec::new(), Arc::new(MockMailer::new()))
        .await
        .unwrap();

    let summary = engine.refresh_recommendations().await.unwrap();
    assert_eq!(summary, RefreshSummary::default());
}
