// Bounded fan-out of notification emails
//
// Every event notifies its whole audience in one pass. Sends run as
// spawned tasks gated by a semaphore so a large audience cannot open
// more provider connections than the mailer config allows.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::instrument;

use crate::mailer::{EmailMessage, Mailer};
use crate::telemetry;

/// Outcome of one fan-out pass. Failures are counted, never retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    semaphore: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, max_in_flight: usize) -> Self {
        Self {
            mailer,
            // A zero limit would deadlock every send
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Send one email per message, at most `max_in_flight` concurrently.
    ///
    /// A failed send logs a warning and counts toward `failed`; it never
    /// aborts the rest of the batch.
    #[instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn fan_out(&self, kind: &str, messages: Vec<EmailMessage>) -> DispatchReport {
        let attempted = messages.len();
        let mut handles = Vec::with_capacity(attempted);

        for message in messages {
            let mailer = Arc::clone(&self.mailer);
            let semaphore = Arc::clone(&self.semaphore);
            let kind = kind.to_string();
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // Closed semaphore means the process is shutting down
                    Err(_) => return false,
                };

                let started = Instant::now();
                match mailer.send(&message).await {
                    Ok(()) => {
                        telemetry::record_notification_sent(
                            &kind,
                            started.elapsed().as_secs_f64(),
                        );
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            kind = %kind,
                            to = %message.to,
                            error = %e,
                            "Failed to send notification email"
                        );
                        telemetry::record_notification_failed(&kind);
                        false
                    }
                }
            }));
        }

        let mut sent = 0;
        for joined in join_all(handles).await {
            match joined {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(kind = kind, error = %e, "Notification send task panicked");
                }
            }
        }

        let report = DispatchReport {
            attempted,
            sent,
            failed: attempted - sent,
        };

        if report.failed > 0 {
            tracing::warn!(
                kind = kind,
                attempted = report.attempted,
                sent = report.sent,
                failed = report.failed,
                "Notification fan-out completed with failures"
            );
        } else {
            tracing::info!(
                kind = kind,
                sent = report.sent,
                "Notification fan-out completed"
            );
        }

        report
    }
}
