use crate::{Backoff, FetchError};
use graphsnap_common::RateLimited;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// One page of a cursor-based listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// The continuation token, treating an empty string as absent.
    pub fn next_cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// Walks a cursor-based listing until it is exhausted.
#[derive(Clone, Debug)]
pub struct Paginator {
    pub backoff: Backoff,
    /// Items requested per call.
    pub page_limit: u32,
    /// Pause before requesting the next page; not applied to retries.
    pub page_delay: Duration,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            backoff: Backoff::default(),
            page_limit: 100,
            page_delay: Duration::from_secs(1),
        }
    }
}

impl Paginator {
    pub fn new(backoff: Backoff, page_limit: u32, page_delay: Duration) -> Self {
        Self {
            backoff,
            page_limit,
            page_delay,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Fetch every page and return the items in fetch order.
    ///
    /// `fetch` receives the cursor (`None` for the first page) and the page limit. The
    /// walk stops on an absent/empty cursor or on a page with no items, whichever comes
    /// first. Each call goes through [`Backoff::retry`] under the name
    /// `"<endpoint> page <n>"`; any error it returns abandons the whole listing.
    pub async fn collect<T, E, F, Fut>(
        &self,
        endpoint: &str,
        mut fetch: F,
    ) -> Result<Vec<T>, FetchError<E>>
    where
        F: FnMut(Option<String>, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
        E: RateLimited + std::error::Error + 'static,
    {
        let mut items: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_num = 0u32;

        loop {
            page_num += 1;
            tracing::info!(
                endpoint,
                page = page_num,
                cursor = cursor.as_deref().unwrap_or(""),
                "fetching {endpoint} page {page_num}"
            );

            let operation = format!("{endpoint} page {page_num}");
            let limit = self.page_limit;
            let page = self
                .backoff
                .retry(&operation, || fetch(cursor.clone(), limit))
                .await?;

            let next = page.next_cursor().map(str::to_owned);
            let fetched = page.items.len();
            items.extend(page.items);
            tracing::info!(
                endpoint,
                page = page_num,
                fetched,
                total = items.len(),
                "fetched {fetched} items (total: {})",
                items.len()
            );

            // An empty page ends the walk even when the server hands back a cursor.
            if fetched == 0 {
                break;
            }
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }

            sleep(self.page_delay).await;
        }

        tracing::info!(endpoint, total = items.len(), pages = page_num, "listing complete");
        Ok(items)
    }
}
