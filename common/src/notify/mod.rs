// Notification orchestration for domain events
//
// Each event builds its audience, renders one email per recipient, and
// hands the batch to the dispatcher. Notifications are best effort: a
// store or render failure is logged and the event is dropped, it never
// bubbles into the operation that raised it.

pub mod dispatcher;
pub mod templates;

pub use dispatcher::{DispatchReport, Dispatcher};

use std::sync::Arc;

use tracing::instrument;

use crate::mailer::EmailMessage;
use crate::matching::MatchEngine;
use crate::models::{ApplicationStatus, Job, User, UserRole};
use crate::telemetry;

pub struct Notifier {
    engine: MatchEngine,
    dispatcher: Arc<Dispatcher>,
}

impl Notifier {
    pub fn new(engine: MatchEngine, dispatcher: Arc<Dispatcher>) -> Self {
        Self { engine, dispatcher }
    }

    /// Notify every student whose profile matches a newly posted job.
    #[instrument(skip(self, job), fields(job_id = %job.id, job_title = %job.title))]
    pub async fn job_created(&self, job: &Job, company_name: &str) -> DispatchReport {
        let audience = match self.engine.audience_for(job).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load audience for new job");
                return DispatchReport::default();
            }
        };

        let messages = audience
            .iter()
            .filter(|user| user.role == UserRole::Student)
            .filter_map(|user| render_or_warn(templates::job_created_email(user, job, company_name)))
            .collect();

        self.dispatcher.fan_out("job_created", messages).await
    }

    /// Confirm receipt of an application to the applicant.
    #[instrument(skip(self, applicant, job), fields(job_id = %job.id, applicant_id = %applicant.id))]
    pub async fn application_received(
        &self,
        applicant: &User,
        job: &Job,
        company_name: &str,
    ) -> DispatchReport {
        let messages = render_or_warn(templates::application_received_email(
            applicant,
            job,
            company_name,
        ))
        .into_iter()
        .collect();

        self.dispatcher
            .fan_out("application_received", messages)
            .await
    }

    /// Tell an applicant their application moved to a new status.
    #[instrument(skip(self, applicant), fields(applicant_id = %applicant.id, status = %status))]
    pub async fn application_status_changed(
        &self,
        applicant: &User,
        job_title: &str,
        status: ApplicationStatus,
        company_name: &str,
    ) -> DispatchReport {
        let messages = render_or_warn(templates::status_changed_email(
            applicant, job_title, status, company_name,
        ))
        .into_iter()
        .collect();

        self.dispatcher.fan_out("status_changed", messages).await
    }

    /// Tell everyone who applied to a job that the posting was removed.
    ///
    /// The caller must snapshot the applicant list before deleting the
    /// job; applications are gone by the time this runs.
    #[instrument(skip(self, applicants), fields(count = applicants.len()))]
    pub async fn job_deleted(
        &self,
        job_title: &str,
        company_name: &str,
        applicants: &[User],
    ) -> DispatchReport {
        let messages = applicants
            .iter()
            .filter_map(|user| {
                render_or_warn(templates::job_deleted_email(user, job_title, company_name))
            })
            .collect();

        self.dispatcher.fan_out("job_deleted", messages).await
    }

    /// Nudge users whose profile lists no skills to fill it in.
    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn profile_nudge(&self, users: &[User]) -> DispatchReport {
        let messages = users
            .iter()
            .filter_map(|user| render_or_warn(templates::profile_nudge_email(user)))
            .collect();

        let report = self.dispatcher.fan_out("profile_nudge", messages).await;
        telemetry::record_profile_nudges(report.sent);
        report
    }
}

fn render_or_warn(rendered: Result<EmailMessage, tera::Error>) -> Option<EmailMessage> {
    match rendered {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to render notification email");
            None
        }
    }
}
