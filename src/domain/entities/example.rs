use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored example record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Example {
    /// Created within the last 24 hours of `now`.
    pub fn is_recently_created(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at <= Duration::days(1)
    }

    /// Description present and not blank.
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// Data for creating a new example.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExample {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update. `None` fields are left unchanged; a `Some(None)`
/// description clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamplePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleFilter {
    /// Case-insensitive substring matched against the title.
    pub search: Option<String>,
}

impl ExampleFilter {
    /// Builds a filter, treating a blank search term as absent.
    pub fn with_search(search: Option<String>) -> Self {
        Self {
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn matches(&self, example: &Example) -> bool {
        match &self.search {
            Some(term) => example
                .title
                .to_lowercase()
                .contains(&term.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(created_at: DateTime<Utc>, description: Option<&str>) -> Example {
        Example {
            id: Uuid::new_v4(),
            title: "Quarterly Report".to_string(),
            description: description.map(String::from),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_is_recently_created() {
        let now = Utc::now();
        assert!(example(now - Duration::hours(23), None).is_recently_created(now));
        assert!(!example(now - Duration::hours(25), None).is_recently_created(now));
    }

    #[test]
    fn test_has_description() {
        let now = Utc::now();
        assert!(example(now, Some("details")).has_description());
        assert!(!example(now, Some("   ")).has_description());
        assert!(!example(now, None).has_description());
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let e = example(Utc::now(), None);
        assert!(ExampleFilter::with_search(Some("report".into())).matches(&e));
        assert!(ExampleFilter::with_search(Some("QUARTER".into())).matches(&e));
        assert!(!ExampleFilter::with_search(Some("invoice".into())).matches(&e));
        assert!(ExampleFilter::default().matches(&e));
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        assert_eq!(ExampleFilter::with_search(Some("  ".into())).search, None);
        assert_eq!(
            ExampleFilter::with_search(Some(" abc ".into())).search,
            Some("abc".to_string())
        );
    }
}
