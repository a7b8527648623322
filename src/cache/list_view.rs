use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CacheKey, ResourceCache};
use crate::entity::{clamp_page, total_pages, Page, PAGE_SIZE};
use crate::error::Result;

/// Search parameters of a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub search: String,
    pub client: Option<i64>,
    pub status: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            client: None,
            status: None,
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl ListParams {
    /// Query string pairs sent to the backend. Empty filters are omitted.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.page_size.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        if let Some(client) = self.client {
            pairs.push(("client".to_string(), client.to_string()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        pairs
    }

    pub fn cache_key(&self, resource: &str) -> CacheKey {
        CacheKey::new(resource, self.query_pairs().as_slice())
    }
}

/// Snapshot of the parameters a fetch was dispatched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    params: ListParams,
}

impl FetchTicket {
    pub fn params(&self) -> &ListParams {
        &self.params
    }
}

/// A paginated list screen.
///
/// Any parameter change bumps the view's generation. A response is applied
/// only if its ticket is from the current generation, so a slow response to
/// an old search can never overwrite a newer one.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    resource: String,
    params: ListParams,
    generation: u64,
    current: Option<Page<T>>,
}

impl<T> ListView<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn new(resource: &str) -> Self {
        Self::with_params(resource, ListParams::default())
    }

    pub fn with_params(resource: &str, params: ListParams) -> Self {
        Self {
            resource: resource.to_string(),
            params,
            generation: 0,
            current: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn page(&self) -> Option<&Page<T>> {
        self.current.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.current.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    /// Total pages of the last applied response, 0 before the first one.
    pub fn total_pages(&self) -> u32 {
        self.current
            .as_ref()
            .map(|p| total_pages(p.total_count, p.page_size))
            .unwrap_or(0)
    }

    fn change(&mut self, update: impl FnOnce(&mut ListParams)) {
        let before = self.params.clone();
        update(&mut self.params);
        if self.params != before {
            self.generation += 1;
        }
    }

    /// New search text. Returns to the first page.
    pub fn set_search(&mut self, search: &str) {
        let search = search.to_string();
        self.change(|p| {
            p.search = search;
            p.page = 1;
        });
    }

    pub fn set_client_filter(&mut self, client: Option<i64>) {
        self.change(|p| {
            p.client = client;
            p.page = 1;
        });
    }

    pub fn set_status_filter(&mut self, status: Option<String>) {
        self.change(|p| {
            p.status = status;
            p.page = 1;
        });
    }

    /// Move to a page, clamped to the known page range. Returns the page
    /// actually selected.
    pub fn set_page(&mut self, page: u32) -> u32 {
        let target = match &self.current {
            Some(current) => clamp_page(page, current.total_pages()),
            None => page.max(1),
        };
        self.change(|p| p.page = target);
        target
    }

    /// Record a fetch for the current parameters.
    pub fn dispatch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            params: self.params.clone(),
        }
    }

    /// Apply a response. Returns `false` if the ticket is stale.
    pub fn apply(&mut self, ticket: &FetchTicket, page: Page<T>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                resource = %self.resource,
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale list response"
            );
            return false;
        }
        self.current = Some(page);
        true
    }

    /// Fetch the current parameters through the cache and apply the result.
    pub async fn load<F, Fut>(&mut self, cache: &ResourceCache, loader: F) -> Result<bool>
    where
        F: FnOnce(ListParams) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        let ticket = self.dispatch();
        let key = ticket.params.cache_key(&self.resource);
        let params = ticket.params.clone();
        let page = cache.fetch(&key, move || loader(params)).await?;
        Ok(self.apply(&ticket, page))
    }
}
