use std::future::Future;

use crate::error::Result;

/// A page the list asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    generation: u64,
}

/// Infinite-scroll list: pages are appended as the last row becomes visible.
///
/// A fetched page exactly `page_size` long means more may remain. A backend
/// whose last page is exactly full therefore costs one extra, empty fetch.
#[derive(Debug, Clone)]
pub struct InfiniteList<T> {
    items: Vec<T>,
    page_size: u32,
    next_page: u32,
    has_more: bool,
    in_flight: Option<u32>,
    generation: u64,
}

impl<T> InfiniteList<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_size,
            next_page: 1,
            has_more: true,
            in_flight: None,
            generation: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The last rendered row came into view.
    ///
    /// Returns the page to fetch, or `None` when a fetch is already running
    /// or no pages remain.
    pub fn on_last_visible(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(self.next_page);
        Some(PageRequest {
            page: self.next_page,
            generation: self.generation,
        })
    }

    /// Append a fetched page. Returns `false` for a request issued before the
    /// last [`reset`](Self::reset).
    pub fn apply(&mut self, request: PageRequest, fetched: Vec<T>) -> bool {
        if request.generation != self.generation {
            tracing::debug!(page = request.page, "discarding page for a reset list");
            return false;
        }
        self.has_more = fetched.len() == self.page_size as usize;
        self.items.extend(fetched);
        self.next_page = request.page + 1;
        self.in_flight = None;
        true
    }

    /// A fetch failed; the same page may be requested again.
    pub fn fail(&mut self, request: PageRequest) {
        if request.generation == self.generation {
            self.in_flight = None;
        }
    }

    /// Start over, e.g. after a filter change.
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_page = 1;
        self.has_more = true;
        self.in_flight = None;
        self.generation += 1;
    }

    /// Fetch and append the next page if one is due.
    pub async fn load_more<F, Fut>(&mut self, loader: F) -> Result<bool>
    where
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let Some(request) = self.on_last_visible() else {
            return Ok(false);
        };
        match loader(request.page, self.page_size).await {
            Ok(fetched) => Ok(self.apply(request, fetched)),
            Err(e) => {
                self.fail(request);
                Err(e)
            }
        }
    }
}
