//! Cursor pagination with throttling-aware retries.
//!
//! [`Backoff`] wraps a single remote call and retries it, with doubling delays, only
//! while the call reports it was rate limited. [`Paginator`] walks a cursor-based
//! listing through that wrapper and returns every item in fetch order, or an error
//! and nothing at all.
//!
//! Both are generic over the call and its error; the error only has to say whether it
//! was a throttling response via [`graphsnap_common::RateLimited`].
//!
//! ```
//! use graphsnap_common::RateLimited;
//! use graphsnap_fetch::{Page, Paginator};
//! use std::time::Duration;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("never happens")]
//! struct NoError;
//! impl RateLimited for NoError {
//!     fn is_rate_limited(&self) -> bool {
//!         false
//!     }
//! }
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! let items = rt.block_on(async {
//!     let paginator = Paginator::default().with_page_delay(Duration::ZERO);
//!     paginator
//!         .collect("numbers", |cursor, _limit| async move {
//!             Ok::<_, NoError>(match cursor.as_deref() {
//!                 None => Page::new(vec![1, 2], Some("next".to_string())),
//!                 _ => Page::new(vec![3], None),
//!             })
//!         })
//!         .await
//! });
//! assert_eq!(items.unwrap(), vec![1, 2, 3]);
//! ```
pub mod backoff;
pub mod paginate;

pub use backoff::Backoff;
pub use paginate::{Page, Paginator};

/// Why a wrapped remote call gave up.
#[derive(Debug, thiserror::Error)]
pub enum FetchError<E: std::error::Error + 'static> {
    /// Still throttled after every retry was spent.
    #[error("{operation} failed after {retries} retries: {source}")]
    Exhausted {
        operation: String,
        retries: u32,
        #[source]
        source: E,
    },
    /// Failed for a reason other than throttling; never retried.
    #[error("{operation} failed: {source}")]
    Failed {
        operation: String,
        #[source]
        source: E,
    },
}

impl<E: std::error::Error + 'static> FetchError<E> {
    pub fn operation(&self) -> &str {
        match self {
            FetchError::Exhausted { operation, .. } | FetchError::Failed { operation, .. } => {
                operation
            }
        }
    }

    /// The last error returned by the remote call.
    pub fn last_error(&self) -> &E {
        match self {
            FetchError::Exhausted { source, .. } | FetchError::Failed { source, .. } => source,
        }
    }
}
