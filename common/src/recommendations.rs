// Recommendation set and search history accessors
//
// The recommendation set only ever grows: merging keeps every existing
// id, including ids of jobs that were deleted or no longer match.
// Search history entries are normalized (trimmed, lowercased) and
// deduplicated on the way in.

use std::collections::HashSet;
use uuid::Uuid;

/// Union of the existing recommendation set with newly matched job ids.
/// Existing ids keep their order; unseen matched ids are appended in
/// match order. Nothing is ever removed.
pub fn merge_recommendations(
    existing: &[Uuid],
    matched: impl IntoIterator<Item = Uuid>,
) -> Vec<Uuid> {
    let mut seen: HashSet<Uuid> = existing.iter().copied().collect();
    let mut merged = existing.to_vec();

    for job_id in matched {
        if seen.insert(job_id) {
            merged.push(job_id);
        }
    }

    merged
}

/// Canonical form of a search query: trimmed, then lowercased
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Append the normalized form of `raw` unless it is empty or already
/// present. Returns whether the history changed.
pub fn push_search_entry(history: &mut Vec<String>, raw: &str) -> bool {
    let entry = normalize_query(raw);
    if entry.is_empty() || history.contains(&entry) {
        return false;
    }
    history.push(entry);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_only_unseen_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let merged = merge_recommendations(&[a, b], vec![b, c, a]);
        assert_eq!(merged, vec![a, b, c]);
    }

    #[test]
    fn test_merge_keeps_existing_ids_not_in_matched() {
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();

        // stale is no longer matched; it must survive the merge
        let merged = merge_recommendations(&[stale], vec![fresh]);
        assert_eq!(merged, vec![stale, fresh]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let once = merge_recommendations(&[a], vec![b]);
        let twice = merge_recommendations(&once, vec![b]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_with_empty_matched_changes_nothing() {
        let a = Uuid::new_v4();
        let merged = merge_recommendations(&[a], Vec::new());
        assert_eq!(merged, vec![a]);
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_query("  Backend Engineer  "), "backend engineer");
        assert_eq!(normalize_query("REACT"), "react");
    }

    #[test]
    fn test_push_skips_duplicates_after_normalization() {
        let mut history = Vec::new();
        assert!(push_search_entry(&mut history, "React"));
        assert!(!push_search_entry(&mut history, "  REACT "));
        assert_eq!(history, vec!["react".to_string()]);
    }

    #[test]
    fn test_push_skips_empty_queries() {
        let mut history = Vec::new();
        assert!(!push_search_entry(&mut history, "   "));
        assert!(history.is_empty());
    }
}
