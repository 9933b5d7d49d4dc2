use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{company_name_for, ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::errors::{StoreError, ValidationError};
use common::models::Job;

/// Request to create a new job posting
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: i64,
    pub location: String,
    pub job_type: String,
    pub experience_level: i32,
    pub company_id: Uuid,
}

impl CreateJobRequest {
    /// Reject postings that could never be matched or attributed
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()));
        }
        if self.requirements.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "requirements".to_string(),
                reason: "at least one requirement is needed".to_string(),
            });
        }
        if self.requirements.iter().any(|r| r.trim().is_empty()) {
            return Err(ValidationError::InvalidFieldValue {
                field: "requirements".to_string(),
                reason: "requirements must not be blank".to_string(),
            });
        }
        if self.salary < 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "salary".to_string(),
                reason: "salary must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Create a new job posting and notify matching students
///
/// The posting is committed before any notification work starts; the
/// fan-out runs in a spawned task and never affects the response.
#[tracing::instrument(skip(state, req))]
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<Job>>), ErrorResponse> {
    req.validate()
        .map_err(|e| ErrorResponse::new("validation_error", e.to_string()))?;

    let company = state
        .companies
        .find_by_id(req.company_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, company_id = %req.company_id, "Failed to load company");
            ErrorResponse::new("database_error", "Failed to load company")
        })?
        .ok_or_else(|| {
            ErrorResponse::new(
                "validation_error",
                format!("Unknown company: {}", req.company_id),
            )
        })?;

    let job = Job::new(
        req.title,
        req.description,
        req.requirements,
        req.salary,
        req.location,
        req.job_type,
        req.experience_level,
        req.company_id,
    );

    state.jobs.create(&job).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create job");
        ErrorResponse::new("database_error", "Failed to create job")
    })?;

    tracing::info!(job_id = %job.id, title = %job.title, "Job created");

    let notifier = state.notifier.clone();
    let posted = job.clone();
    tokio::spawn(async move {
        notifier.job_created(&posted, &company.name).await;
    });

    Ok((StatusCode::CREATED, Json(SuccessResponse::new(job))))
}

/// Delete a job posting and notify everyone who applied
///
/// The applicant list is snapshotted before the delete because the
/// cascade removes the applications the fan-out would otherwise read.
#[tracing::instrument(skip(state))]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Uuid>>, ErrorResponse> {
    let job = state
        .jobs
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_id = %id, "Failed to load job");
            ErrorResponse::new("database_error", "Failed to load job")
        })?
        .ok_or_else(|| ErrorResponse::new("not_found", format!("Job not found: {}", id)))?;

    let applicants = state
        .applications
        .find_applicants_of_job(id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job_id = %id, "Failed to snapshot applicants");
            ErrorResponse::new("database_error", "Failed to load applicants")
        })?;

    state.jobs.delete(id).await.map_err(|e| match e {
        StoreError::NotFound(_) => {
            ErrorResponse::new("not_found", format!("Job not found: {}", id))
        }
        e => {
            tracing::error!(error = %e, job_id = %id, "Failed to delete job");
            ErrorResponse::new("database_error", "Failed to delete job")
        }
    })?;

    tracing::info!(job_id = %id, applicants = applicants.len(), "Job deleted");

    let notifier = state.notifier.clone();
    let companies = state.companies.clone();
    tokio::spawn(async move {
        let Some(company_name) = company_name_for(&companies, job.company_id).await else {
            return;
        };
        notifier
            .job_deleted(&job.title, &company_name, &applicants)
            .await;
    });

    Ok(Json(SuccessResponse::new(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".to_string(),
            description: "Build the matching pipeline".to_string(),
            requirements: vec!["rust".to_string(), "postgres".to_string()],
            salary: 90_000,
            location: "Remote".to_string(),
            job_type: "full-time".to_string(),
            experience_level: 3,
            company_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_valid_request_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut req = valid_request();
        req.title = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_requirements_are_rejected() {
        let mut req = valid_request();
        req.requirements.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_requirement_entry_is_rejected() {
        let mut req = valid_request();
        req.requirements.push("  ".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_salary_is_rejected() {
        let mut req = valid_request();
        req.salary = -1;
        assert!(req.validate().is_err());
    }
}
