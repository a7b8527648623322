// src/entity/page.rs
use serde::{Deserialize, Serialize};

/// Rows per page for every list screen.
pub const PAGE_SIZE: u32 = 10;

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Authoritative page count for pagination controls.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages()
    }
}

/// `ceil(total_count / page_size)`.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let size = u64::from(page_size);
    u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX)
}

/// Keep a requested page inside `1..=total_pages`.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}

/// List response shapes the backend is known to return.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Wrapped {
        #[serde(alias = "results", alias = "items")]
        data: Vec<T>,
        #[serde(default, alias = "count", alias = "totalCount", alias = "total")]
        total_count: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { data, .. } => data,
            ListEnvelope::Bare(items) => items,
        }
    }

    /// Page of a list response.
    ///
    /// Without a count from the backend the total is estimated from the rows
    /// seen so far. A full page counts one extra row so the next page stays
    /// reachable; the first short page settles the total.
    pub fn into_page(self, page: u32, page_size: u32) -> Page<T> {
        let (mut items, total_count) = match self {
            ListEnvelope::Wrapped { data, total_count } => (data, total_count),
            ListEnvelope::Bare(items) => (items, None),
        };
        let full = page_size > 0 && items.len() >= page_size as usize;
        if items.len() > page_size as usize {
            tracing::warn!(
                returned = items.len(),
                page_size,
                "backend returned more rows than requested, truncating"
            );
            items.truncate(page_size as usize);
        }
        let total_count = total_count.unwrap_or_else(|| {
            let before = u64::from(page.saturating_sub(1)) * u64::from(page_size);
            let seen = before + items.len() as u64;
            if full {
                seen + 1
            } else {
                seen
            }
        });
        Page {
            items,
            total_count,
            page,
            page_size,
        }
    }
}
