// Pipeline engine implementation
//
// One loop drives both background triggers: the fixed-interval
// recommendation refresh and the cron-driven daily profile nudge. The
// two arms are independent timers but never run concurrently; a pass
// in flight delays the other arm by at most its own duration.

use crate::config::SchedulerConfig;
use crate::errors::{ScheduleError, StoreError};
use crate::models::UserRole;
use crate::notify::Notifier;
use crate::recommendations::merge_recommendations;
use crate::schedule::DailySchedule;
use crate::store::{JobStore, UserStore};
use crate::telemetry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Outcome of one recommendation refresh pass.
///
/// A skipped user is one whose profile cannot match anything (no
/// skills and no bio) or whose per-user store operation failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub users_processed: usize,
    pub users_skipped: usize,
    pub recommendations_added: usize,
}

/// Pipeline trait for the background trigger operations
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Run the trigger loop until a shutdown signal arrives
    async fn start(&self) -> Result<(), ScheduleError>;

    /// Stop the pipeline gracefully
    async fn stop(&self);

    /// Run one recommendation refresh pass over all users
    async fn refresh_recommendations(&self) -> Result<RefreshSummary, StoreError>;

    /// Run one profile nudge pass; returns the number of attempted sends
    async fn send_profile_nudges(&self) -> Result<usize, StoreError>;
}

/// Main pipeline engine implementation
pub struct PipelineEngine {
    refresh_interval_seconds: u64,
    nudge_schedule: DailySchedule,
    users: Arc<dyn UserStore>,
    jobs: Arc<dyn JobStore>,
    notifier: Arc<Notifier>,
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl PipelineEngine {
    /// Create a new pipeline engine. Fails when the configured cron
    /// expression or timezone does not parse.
    pub fn new(
        config: &SchedulerConfig,
        users: Arc<dyn UserStore>,
        jobs: Arc<dyn JobStore>,
        notifier: Arc<Notifier>,
    ) -> Result<Self, ScheduleError> {
        let nudge_schedule = DailySchedule::new(&config.nudge_cron, &config.timezone)?;
        let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel(1);

        Ok(Self {
            refresh_interval_seconds: config.refresh_interval_seconds,
            nudge_schedule,
            users,
            jobs,
            notifier,
            shutdown_tx,
        })
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    fn duration_until(when: DateTime<Utc>) -> Duration {
        (when - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl Pipeline for PipelineEngine {
    /// Run the trigger loop until a shutdown signal arrives
    #[instrument(skip(self))]
    async fn start(&self) -> Result<(), ScheduleError> {
        info!(
            refresh_interval_seconds = self.refresh_interval_seconds,
            nudge_cron = self.nudge_schedule.expression(),
            timezone = %self.nudge_schedule.timezone(),
            "Starting recommendation pipeline"
        );

        let mut refresh_interval = interval(Duration::from_secs(self.refresh_interval_seconds));
        // Ticks missed while a pass is in flight collapse into one
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut shutdown_rx = self.shutdown_receiver();
        let mut next_nudge = self.nudge_schedule.next_after(Utc::now())?;
        debug!(next_nudge = %next_nudge, "First profile nudge scheduled");

        loop {
            tokio::select! {
                _ = refresh_interval.tick() => {
                    let started = Instant::now();
                    match self.refresh_recommendations().await {
                        Ok(summary) => {
                            info!(
                                users_processed = summary.users_processed,
                                users_skipped = summary.users_skipped,
                                recommendations_added = summary.recommendations_added,
                                "Recommendation refresh pass completed"
                            );
                            telemetry::record_refresh_run(
                                started.elapsed().as_secs_f64(),
                                summary.recommendations_added,
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "Recommendation refresh pass failed");
                        }
                    }
                }
                _ = sleep(Self::duration_until(next_nudge)) => {
                    match self.send_profile_nudges().await {
                        Ok(count) => {
                            info!(nudges_attempted = count, "Profile nudge pass completed");
                        }
                        Err(e) => {
                            error!(error = %e, "Profile nudge pass failed");
                        }
                    }
                    next_nudge = self.nudge_schedule.next_after(Utc::now())?;
                    debug!(next_nudge = %next_nudge, "Next profile nudge scheduled");
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping pipeline");
                    break;
                }
            }
        }

        info!("Recommendation pipeline stopped");
        Ok(())
    }

    /// Stop the pipeline gracefully
    #[instrument(skip(self))]
    async fn stop(&self) {
        info!("Stopping recommendation pipeline");

        // Send shutdown signal
        let _ = self.shutdown_tx.send(());

        // Give spawned notification sends time to drain
        sleep(Duration::from_secs(2)).await;

        info!("Recommendation pipeline stopped gracefully");
    }

    /// Run one recommendation refresh pass over all users.
    ///
    /// Matched job ids merge into each user's existing set; nothing is
    /// ever pruned, and the record is saved only when the set grew. A
    /// failure for one user is logged and counted, the pass continues
    /// with the remaining users.
    #[instrument(skip(self))]
    async fn refresh_recommendations(&self) -> Result<RefreshSummary, StoreError> {
        let users = self.users.find_all().await?;
        debug!(user_count = users.len(), "Refreshing recommendations");

        let mut summary = RefreshSummary::default();

        for mut user in users {
            // Neither match clause can fire for an empty profile
            if user.profile.skills.is_empty() && user.profile.bio.trim().is_empty() {
                summary.users_skipped += 1;
                telemetry::record_refresh_user_skipped();
                continue;
            }

            let matched = match self.jobs.find_matching_profile(&user.profile).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!(
                        user_id = %user.id,
                        error = %e,
                        "Failed to match jobs for user, skipping"
                    );
                    telemetry::record_refresh_failure();
                    summary.users_skipped += 1;
                    continue;
                }
            };

            let merged = merge_recommendations(
                &user.job_recommendations,
                matched.iter().map(|job| job.id),
            );
            let added = merged.len() - user.job_recommendations.len();

            if added > 0 {
                user.job_recommendations = merged;
                user.updated_at = Utc::now();
                if let Err(e) = self.users.save(&user).await {
                    warn!(
                        user_id = %user.id,
                        error = %e,
                        "Failed to persist refreshed recommendations, skipping"
                    );
                    telemetry::record_refresh_failure();
                    summary.users_skipped += 1;
                    continue;
                }
                summary.recommendations_added += added;
            }

            summary.users_processed += 1;
        }

        Ok(summary)
    }

    /// Run one profile nudge pass.
    ///
    /// Targets students whose skill list is empty. There is no per-day
    /// suppression: triggering twice sends twice.
    #[instrument(skip(self))]
    async fn send_profile_nudges(&self) -> Result<usize, StoreError> {
        let users = self.users.find_with_empty_skills().await?;
        let students: Vec<_> = users
            .into_iter()
            .filter(|user| user.role == UserRole::Student)
            .collect();

        if students.is_empty() {
            debug!("No students with empty skill lists, nothing to nudge");
            return Ok(0);
        }

        let report = self.notifier.profile_nudge(&students).await;
        Ok(report.attempted)
    }
}
