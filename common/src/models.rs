use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// User Models
// ============================================================================

/// User represents a job-board account (student or recruiter)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    #[sqlx(flatten)]
    pub profile: Profile,
    /// Deduplicated job ids; grows additively and is never pruned,
    /// so recommendations survive job deletion and profile edits.
    pub job_recommendations: Vec<Uuid>,
    /// Lowercased, trimmed, deduplicated search entries
    pub search_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: String, email: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            role,
            profile: Profile::default(),
            job_recommendations: Vec::new(),
            search_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile holds the free-text fields matching operates on
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub skills: Vec<String>,
    pub bio: String,
}

/// UserRole distinguishes job seekers from job posters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Recruiter,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Recruiter => write!(f, "recruiter"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "recruiter" => Ok(UserRole::Recruiter),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

// ============================================================================
// Job Models
// ============================================================================

/// Job represents a posted job opening
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Free-text requirement strings, matched against profile skills
    /// by case-insensitive containment
    pub requirements: Vec<String>,
    pub salary: i64,
    pub location: String,
    pub job_type: String,
    pub experience_level: i32,
    pub company_id: Uuid,
    /// Application ids; derived from the applications table on read
    #[sqlx(default)]
    pub applications: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        description: String,
        requirements: Vec<String>,
        salary: i64,
        location: String,
        job_type: String,
        experience_level: i32,
        company_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            requirements,
            salary,
            location,
            job_type,
            experience_level,
            company_id,
            applications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Application Models
// ============================================================================

/// Application links an applicant to a job; (job_id, applicant_id) is
/// unique at the store level
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Create a new pending application
    pub fn new(job_id: Uuid, applicant_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_id,
            applicant_id,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// ApplicationStatus represents the review state of an application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Accepted and Rejected are terminal; only Pending can move
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Apply a status change, rejecting moves out of a terminal state.
    /// Identity transitions are allowed as no-ops.
    pub fn transition(self, next: ApplicationStatus) -> Result<Self, StatusTransitionError> {
        if self == next {
            return Ok(self);
        }
        if self.is_terminal() {
            return Err(StatusTransitionError {
                from: self,
                to: next,
            });
        }
        Ok(next)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Accepted => write!(f, "accepted"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(format!("Invalid application status: {}", s)),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

/// Rejected move out of a terminal application status
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot change application status from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

// ============================================================================
// Company Models
// ============================================================================

/// Company owns job postings; only read paths exist in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: String, description: String, website: String, location: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            website,
            location,
            created_at: Utc::now(),
        }
    }
}
