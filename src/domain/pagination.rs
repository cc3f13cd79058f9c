//! Page resolution and paginated result envelope.
//!
//! A list endpoint resolves the raw `page` / `perPage` query values into a
//! [`PageRequest`], runs its fetch and count queries concurrently through
//! [`paginate`], and returns a [`Paginated`] body:
//!
//! ```json
//! {
//!   "items": [ ... ],
//!   "meta":  { "totalItems": 42, "itemCount": 10, "itemsPerPage": 10, "totalPages": 5, "currentPage": 2 },
//!   "links": { "first": "/api/v1/examples?page=1&perPage=10", "previous": "...", "next": "...", "last": "..." }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::PaginationConfig;

/// Resolved page number and size. Both are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Applies defaults and the upper bound to raw query values.
    ///
    /// - absent or `page < 1` → default page
    /// - absent or `perPage < 1` → default page size
    /// - `perPage > max` → max
    pub fn resolve(page: Option<i64>, per_page: Option<i64>, config: &PaginationConfig) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => config.default_page.max(1),
        };

        let max = config.max_per_page.max(1);
        let per_page = match per_page {
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX).min(max),
            _ => config.default_per_page.clamp(1, max),
        };

        Self { page, per_page }
    }

    /// Number of items before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Maximum number of items on this page.
    pub fn take(&self) -> u64 {
        u64::from(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total_items: u64,
    pub item_count: u64,
    pub items_per_page: u32,
    pub total_pages: u64,
    pub current_page: u32,
}

/// Navigation links. `previous` and `next` are empty at the edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    pub first: String,
    pub previous: String,
    pub next: String,
    pub last: String,
}

/// One page of items with counts and optional navigation links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page.max(1));
        let meta = PaginationMeta {
            total_items,
            item_count: items.len() as u64,
            items_per_page: request.per_page,
            total_pages: total_items.div_ceil(per_page),
            current_page: request.page,
        };

        Self {
            items,
            meta,
            links: None,
        }
    }

    /// Adds first/previous/next/last links rooted at `base_path`.
    ///
    /// Existing query parameters in `base_path` are kept; `page` and `perPage`
    /// are appended.
    pub fn with_links(mut self, base_path: &str) -> Self {
        let separator = if base_path.contains('?') { '&' } else { '?' };
        let per_page = self.meta.items_per_page;
        let link = |page: u64| format!("{base_path}{separator}page={page}&perPage={per_page}");

        let current = u64::from(self.meta.current_page);
        let last_page = self.meta.total_pages.max(1);

        self.links = Some(PaginationLinks {
            first: link(1),
            previous: if current > 1 {
                link((current - 1).min(last_page))
            } else {
                String::new()
            },
            next: if current < self.meta.total_pages {
                link(current + 1)
            } else {
                String::new()
            },
            last: link(last_page),
        });
        self
    }

    /// Converts every item, keeping counts and links.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
        }
    }
}

/// Runs `fetch` and `count` concurrently and assembles the page.
///
/// # Errors
///
/// Returns the first error produced by either future.
pub async fn paginate<T, E, F, C>(request: PageRequest, fetch: F, count: C) -> Result<Paginated<T>, E>
where
    F: Future<Output = Result<Vec<T>, E>>,
    C: Future<Output = Result<u64, E>>,
{
    let (items, total) = tokio::try_join!(fetch, count)?;
    Ok(Paginated::new(items, total, request))
}
