pub mod applications;
pub mod health;
pub mod jobs;
pub mod metrics;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use common::store::CompanyStore;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "invalid_transition" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Look up the company name used in notification copy
///
/// Notification plumbing never surfaces failures to the caller, so a
/// missing company or store error logs a warning and returns None; the
/// caller drops the notification.
pub(crate) async fn company_name_for(
    companies: &Arc<dyn CompanyStore>,
    company_id: Uuid,
) -> Option<String> {
    match companies.find_by_id(company_id).await {
        Ok(Some(company)) => Some(company.name),
        Ok(None) => {
            tracing::warn!(company_id = %company_id, "Company missing for notification");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, company_id = %company_id, "Failed to load company for notification");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_statuses() {
        let cases = [
            ("not_found", StatusCode::NOT_FOUND),
            ("validation_error", StatusCode::BAD_REQUEST),
            ("conflict", StatusCode::CONFLICT),
            ("invalid_transition", StatusCode::UNPROCESSABLE_ENTITY),
            ("database_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (code, expected) in cases {
            let response = ErrorResponse::new(code, "boom").into_response();
            assert_eq!(response.status(), expected, "code {code}");
        }
    }

    #[test]
    fn test_error_response_carries_trace_id() {
        let err = ErrorResponse::new("not_found", "missing");
        assert!(!err.trace_id.is_empty());
        assert!(err.details.is_none());
    }
}
