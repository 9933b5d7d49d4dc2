// Job-to-profile matching
//
// A job matches a profile when any requirement string is contained in
// any profile skill (case-insensitive), or when the job title contains
// the profile bio. The containment direction is part of the contract:
// requirements are the patterns, skills are the subjects, and for the
// bio clause the title is the subject.

use crate::errors::StoreError;
use crate::models::{Job, Profile, User};
use crate::store::UserStore;
use regex::RegexBuilder;
use std::sync::Arc;
use tracing::instrument;

/// Case-insensitive containment test of `needle` inside `haystack`.
/// The needle is escaped before compilation, so regex metacharacters
/// in requirement strings match literally. An empty needle matches
/// any haystack.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(haystack),
        Err(_) => false,
    }
}

/// True when the requirement is contained in at least one skill
pub fn requirement_matches_skills(requirement: &str, skills: &[String]) -> bool {
    skills.iter().any(|skill| contains_ci(skill, requirement))
}

/// True when any requirement is contained in any skill
pub fn skills_match_requirements(skills: &[String], requirements: &[String]) -> bool {
    requirements
        .iter()
        .any(|requirement| requirement_matches_skills(requirement, skills))
}

/// True when the job title contains the bio. An empty or
/// whitespace-only bio never matches.
pub fn title_contains_bio(title: &str, bio: &str) -> bool {
    let bio = bio.trim();
    if bio.is_empty() {
        return false;
    }
    contains_ci(title, bio)
}

/// The match predicate: any requirement contained in any skill, or the
/// title containing the non-empty bio
pub fn job_matches_profile(profile: &Profile, job: &Job) -> bool {
    skills_match_requirements(&profile.skills, &job.requirements)
        || title_contains_bio(&job.title, &profile.bio)
}

/// MatchEngine resolves the audience of a job through one store-level
/// query over the requirements list
#[derive(Clone)]
pub struct MatchEngine {
    users: Arc<dyn UserStore>,
}

impl MatchEngine {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Every user with at least one skill that contains at least one of
    /// the job's requirements. Role filtering is the caller's concern.
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn audience_for(&self, job: &Job) -> Result<Vec<User>, StoreError> {
        let audience = self
            .users
            .find_matching_requirements(&job.requirements)
            .await?;

        tracing::debug!(
            job_id = %job.id,
            audience_size = audience.len(),
            "Resolved job audience"
        );
        Ok(audience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn job_with(title: &str, requirements: Vec<&str>) -> Job {
        Job::new(
            title.to_string(),
            "A job".to_string(),
            requirements.into_iter().map(String::from).collect(),
            90_000,
            "Remote".to_string(),
            "full-time".to_string(),
            2,
            Uuid::new_v4(),
        )
    }

    fn profile_with(skills: Vec<&str>, bio: &str) -> Profile {
        Profile {
            skills: skills.into_iter().map(String::from).collect(),
            bio: bio.to_string(),
        }
    }

    #[test]
    fn test_requirement_contained_in_skill_matches() {
        let profile = profile_with(vec!["React", "Node"], "");
        let job = job_with("Frontend Developer", vec!["react", "express"]);
        assert!(job_matches_profile(&profile, &job));
    }

    #[test]
    fn test_no_overlap_does_not_match() {
        let profile = profile_with(vec!["Painting", "Sculpture"], "");
        let job = job_with("Frontend Developer", vec!["react", "express"]);
        assert!(!job_matches_profile(&profile, &job));
    }

    #[test]
    fn test_containment_direction_is_requirement_inside_skill() {
        // "react" (requirement) inside "React.js" (skill) matches
        assert!(requirement_matches_skills("react", &["React.js".to_string()]));
        // "React.js" (requirement) inside "react" (skill) does not
        assert!(!requirement_matches_skills(
            "React.js",
            &["react".to_string()]
        ));
    }

    #[test]
    fn test_title_contains_bio_matches() {
        let profile = profile_with(vec![], "backend engineer");
        let job = job_with("Senior Backend Engineer", vec!["golang"]);
        assert!(job_matches_profile(&profile, &job));
    }

    #[test]
    fn test_bio_contains_title_direction_does_not_match() {
        let profile = profile_with(vec![], "Senior Backend Engineer at heart");
        let job = job_with("Backend Engineer", vec!["golang"]);
        assert!(!title_contains_bio(&job.title, &profile.bio));
    }

    #[test]
    fn test_empty_bio_never_matches() {
        assert!(!title_contains_bio("Any Title", ""));
        assert!(!title_contains_bio("Any Title", "   "));
    }

    #[test]
    fn test_regex_metacharacters_in_requirement_match_literally() {
        assert!(requirement_matches_skills("C++", &["C++ and Rust".to_string()]));
        assert!(!requirement_matches_skills("C++", &["CCC".to_string()]));
    }

    #[test]
    fn test_empty_requirements_list_never_matches_via_skills() {
        let profile = profile_with(vec!["React"], "");
        let job = job_with("Frontend Developer", vec![]);
        assert!(!job_matches_profile(&profile, &job));
    }

    #[test]
    fn test_matching_is_case_insensitive_both_ways() {
        assert!(requirement_matches_skills("REACT", &["react".to_string()]));
        assert!(requirement_matches_skills("react", &["REACT".to_string()]));
        assert!(title_contains_bio("SENIOR BACKEND ENGINEER", "backend engineer"));
    }
}
