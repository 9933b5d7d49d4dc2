use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{company_name_for, ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::errors::StoreError;
use common::models::{Application, ApplicationStatus};

/// Request to apply to a job
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub applicant_id: Uuid,
}

/// Request to change an application status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

/// Apply to a job and confirm receipt to the applicant
///
/// The application is committed before the receipt email is attempted.
/// A second application for the same (job, applicant) pair hits the
/// store uniqueness constraint and maps to a conflict with nothing
/// written and nothing sent.
#[tracing::instrument(skip(state, req))]
pub async fn apply_to_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<Application>>), ErrorResponse> {
    let job = state
        .jobs
        .find_by_id(job_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_id = %job_id, "Failed to load job");
            ErrorResponse::new("database_error", "Failed to load job")
        })?
        .ok_or_else(|| ErrorResponse::new("not_found", format!("Job not found: {}", job_id)))?;

    let applicant = state
        .users
        .find_by_id(req.applicant_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, applicant_id = %req.applicant_id, "Failed to load applicant");
            ErrorResponse::new("database_error", "Failed to load applicant")
        })?
        .ok_or_else(|| {
            ErrorResponse::new("not_found", format!("User not found: {}", req.applicant_id))
        })?;

    let application = Application::new(job_id, req.applicant_id);

    state.applications.create(&application).await.map_err(|e| match e {
        StoreError::DuplicateKey(_) => ErrorResponse::new(
            "conflict",
            format!("User {} already applied to job {}", req.applicant_id, job_id),
        ),
        e => {
            tracing::error!(error = %e, job_id = %job_id, "Failed to create application");
            ErrorResponse::new("database_error", "Failed to create application")
        }
    })?;

    tracing::info!(
        application_id = %application.id,
        job_id = %job_id,
        applicant_id = %req.applicant_id,
        "Application recorded"
    );

    let notifier = state.notifier.clone();
    let companies = state.companies.clone();
    tokio::spawn(async move {
        let company_name = match company_name_for(&companies, job.company_id).await {
            Some(name) => name,
            None => return,
        };
        notifier
            .application_received(&applicant, &job, &company_name)
            .await;
    });

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(application))))
}

/// Change an application status and notify the applicant
///
/// Accepted and rejected are terminal: a move out of either is rejected
/// as unprocessable and persists nothing. Identity transitions are
/// allowed as no-ops.
#[tracing::instrument(skip(state, req))]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<SuccessResponse<ApplicationStatus>>, ErrorResponse> {
    let application = state
        .applications
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, application_id = %id, "Failed to load application");
            ErrorResponse::new("database_error", "Failed to load application")
        })?
        .ok_or_else(|| {
            ErrorResponse::new("not_found", format!("Application not found: {}", id))
        })?;

    let next = application
        .status
        .transition(req.status)
        .map_err(|e| ErrorResponse::new("invalid_transition", e.to_string()))?;

    state
        .applications
        .update_status(id, next)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => {
                ErrorResponse::new("not_found", format!("Application not found: {}", id))
            }
            e => {
                tracing::error!(error = %e, application_id = %id, "Failed to update application");
                ErrorResponse::new("database_error", "Failed to update application")
            }
        })?;

    tracing::info!(
        application_id = %id,
        from = %application.status,
        to = %next,
        "Application status updated"
    );

    tokio::spawn(send_status_notification(state.clone(), application, next));

    Ok(Json(SuccessResponse::new(next)))
}

/// Load the records backing a status email; any failure logs a warning
/// and drops the notification
async fn send_status_notification(
    state: AppState,
    application: Application,
    status: ApplicationStatus,
) {
    let applicant = match state.users.find_by_id(application.applicant_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(
                applicant_id = %application.applicant_id,
                "Applicant missing for status notification"
            );
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load applicant for status notification");
            return;
        }
    };

    let job = match state.jobs.find_by_id(application.job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            tracing::warn!(job_id = %application.job_id, "Job missing for status notification");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load job for status notification");
            return;
        }
    };

    let company_name = match company_name_for(&state.companies, job.company_id).await {
        Some(name) => name,
        None => return,
    };

    state
        .notifier
        .application_status_changed(&applicant, &job.title, status, &company_name)
        .await;
}
