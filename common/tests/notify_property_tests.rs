// Property-based tests for notification fan-out
//
// One send attempt per recipient. A failing recipient never reduces the
// attempts made for the others, and a rejected duplicate application
// produces no send at all.

use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use uuid::Uuid;

use common::errors::{SendError, StoreError};
use common::mailer::{EmailMessage, Mailer};
use common::matching::MatchEngine;
use common::models::{Application, Job, User, UserRole};
use common::notify::{Dispatcher, Notifier};
use common::store::{ApplicationStore, MemoryStore};

/// Records deliveries and fails for a configured set of recipients
struct SelectiveMailer {
    sent: Mutex<Vec<String>>,
    fail_for: Vec<String>,
}

impl SelectiveMailer {
    fn new(fail_for: Vec<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for,
        }
    }

    async fn sent_recipients(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for SelectiveMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError> {
        if self.fail_for.contains(&message.to) {
            return Err(SendError::Transport("connection reset".to_string()));
        }
        self.sent.lock().await.push(message.to.clone());
        Ok(())
    }
}

fn recipient(index: usize) -> String {
    format!("user{}@example.com", index)
}

fn message_for(index: usize) -> EmailMessage {
    EmailMessage {
        to: recipient(index),
        subject: "Subject".to_string(),
        text_body: "Body".to_string(),
        html_body: "<p>Body</p>".to_string(),
    }
}

fn applicant(index: usize) -> User {
    User::new(
        format!("Applicant {}", index),
        recipient(index),
        UserRole::Student,
    )
}

fn sample_job() -> Job {
    Job::new(
        "Backend Engineer".to_string(),
        "Build services".to_string(),
        vec!["rust".to_string()],
        120_000,
        "Hanoi".to_string(),
        "full-time".to_string(),
        3,
        Uuid::new_v4(),
    )
}

fn notifier_over(store: MemoryStore, mailer: Arc<SelectiveMailer>) -> Notifier {
    let dispatcher = Arc::new(Dispatcher::new(mailer, 4));
    Notifier::new(MatchEngine::new(Arc::new(store)), dispatcher)
}

/// *For any* batch size and failing subset, the dispatcher attempts
/// every message and the report partitions attempts into sent and
/// failed.
#[test]
fn property_fan_out_attempts_every_message() {
    proptest!(|(count in 0..16usize, failing in prop::collection::hash_set(0..16usize, 0..8))| {
        let failing: Vec<String> = failing
            .into_iter()
            .filter(|i| *i < count)
            .map(recipient)
            .collect();
        let failed_expected = failing.len();

        let rt = Runtime::new()?;
        let (report, delivered) = rt.block_on(async move {
            let mailer = Arc::new(SelectiveMailer::new(failing));
            let dispatcher = Dispatcher::new(mailer.clone(), 4);

            let messages: Vec<EmailMessage> = (0..count).map(message_for).collect();
            let report = dispatcher.fan_out("test_event", messages).await;
            (report, mailer.sent_recipients().await)
        });

        prop_assert_eq!(report.attempted, count);
        prop_assert_eq!(report.failed, failed_expected);
        prop_assert_eq!(report.sent, count - failed_expected);
        prop_assert_eq!(delivered.len(), report.sent);
    });
}

/// *For any* applicant snapshot, the job-deleted fan-out makes exactly
/// one attempt per applicant even when some sends fail.
#[test]
fn property_job_deleted_notifies_every_applicant() {
    proptest!(|(count in 0..10usize, failing in prop::collection::hash_set(0..10usize, 0..5))| {
        let failing: Vec<String> = failing
            .into_iter()
            .filter(|i| *i < count)
            .map(recipient)
            .collect();
        let failed_expected = failing.len();

        let rt = Runtime::new()?;
        let (report, delivered) = rt.block_on(async move {
            let mailer = Arc::new(SelectiveMailer::new(failing));
            let notifier = notifier_over(MemoryStore::new(), mailer.clone());

            let applicants: Vec<User> = (0..count).map(applicant).collect();
            let report = notifier
                .job_deleted("Backend Engineer", "TalentGrid", &applicants)
                .await;
            (report, mailer.sent_recipients().await)
        });

        prop_assert_eq!(report.attempted, count);
        prop_assert_eq!(report.failed, failed_expected);
        prop_assert_eq!(delivered.len(), count - failed_expected);
    });
}

/// A rejected duplicate application writes nothing and sends nothing:
/// the receipt only goes out after a successful insert.
#[test]
fn test_duplicate_application_sends_no_second_receipt() {
    let rt = Runtime::new().expect("runtime");
    rt.block_on(async {
        let store = MemoryStore::new();
        let mailer = Arc::new(SelectiveMailer::new(Vec::new()));
        let notifier = notifier_over(store.clone(), mailer.clone());

        let user = applicant(0);
        store.create_user(&user).await.expect("create user");
        let job = sample_job();

        for _ in 0..2 {
            let result =
                ApplicationStore::create(&store, &Application::new(job.id, user.id)).await;
            if result.is_ok() {
                notifier
                    .application_received(&user, &job, "TalentGrid")
                    .await;
            } else {
                assert!(matches!(result, Err(StoreError::DuplicateKey(_))));
            }
        }

        assert_eq!(store.application_count().await, 1);
        assert_eq!(mailer.sent_recipients().await.len(), 1);
    });
}
