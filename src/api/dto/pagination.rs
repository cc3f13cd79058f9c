//! Pagination and search query parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::config::PaginationConfig;
use crate::domain::pagination::PageRequest;

/// Raw `page` / `perPage` query values.
///
/// Uses `serde_with` to parse numbers from query strings. Out-of-range values
/// are accepted here and corrected by [`PaginateQuery::resolve`].
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl PaginateQuery {
    /// Applies defaults and the page size cap from `config`.
    pub fn resolve(&self, config: &PaginationConfig) -> PageRequest {
        PageRequest::resolve(self.page, self.per_page, config)
    }
}

/// Query parameters for `GET /api/v1/examples`.
#[derive(Debug, Default, Deserialize)]
pub struct ExampleListQuery {
    #[serde(flatten)]
    pub pagination: PaginateQuery,

    #[serde(default)]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(qs: &str) -> Result<ExampleListQuery, String> {
        let uri: Uri = format!("/examples?{}", qs).parse().unwrap();
        Query::<ExampleListQuery>::try_from_uri(&uri)
            .map(|Query(q)| q)
            .map_err(|e| e.to_string())
    }

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_page: 1,
            default_per_page: 30,
            max_per_page: 100,
        }
    }

    fn query(qs: &str) -> ExampleListQuery {
        parse(qs).unwrap()
    }

    #[test]
    fn test_parses_camel_case_numbers() {
        let q = query("page=2&perPage=15&search=abc");
        assert_eq!(q.pagination.page, Some(2));
        assert_eq!(q.pagination.per_page, Some(15));
        assert_eq!(q.search.as_deref(), Some("abc"));
    }

    #[test]
    fn test_out_of_range_values_are_corrected() {
        let req = query("page=0&perPage=1000").pagination.resolve(&config());
        assert_eq!(req, PageRequest { page: 1, per_page: 100 });

        let req = query("page=-3&perPage=-1").pagination.resolve(&config());
        assert_eq!(req, PageRequest { page: 1, per_page: 30 });
    }

    #[test]
    fn test_absent_values_use_defaults() {
        let req = query("").pagination.resolve(&config());
        assert_eq!(req, PageRequest { page: 1, per_page: 30 });
    }

    #[test]
    fn test_non_numeric_page_is_rejected() {
        assert!(parse("page=abc").is_err());
    }
}
