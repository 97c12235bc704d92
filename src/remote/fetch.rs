//! Retry-with-backoff wrapper and the paginated-listing adapter built on it.
//!
//! Both catalogs expose unreliable, rate-limited, offset/limit listing
//! endpoints; these primitives turn them into plain values and flat item
//! streams so the sync logic never sees a page boundary or a 429.

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, Retryable};
use futures::Stream;

use crate::remote::RemoteError;

/// Sleep intervals, in seconds, between retries of a transiently failing call.
const BACKOFF_SCHEDULE: [u64; 6] = [1, 2, 5, 10, 30, 60];

#[derive(Debug, Clone, Copy)]
struct FixedBackoff;

impl BackoffBuilder for FixedBackoff {
    type Backoff = std::vec::IntoIter<Duration>;

    fn build(self) -> Self::Backoff {
        BACKOFF_SCHEDULE
            .iter()
            .map(|&secs| Duration::from_secs(secs))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Run a remote call, retrying transient failures until the backoff schedule
/// is exhausted; the last error is then returned as a value. Non-transient
/// errors propagate immediately without a retry. The caller decides whether
/// the failure is fatal to its operation.
pub async fn retry_on_transient<T, Fut, F>(operation: F) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    operation
        .retry(FixedBackoff)
        .when(RemoteError::is_transient)
        .notify(|err, delay| {
            log::warn!(
                "Transient error during remote call: {err}, retrying in {}s",
                delay.as_secs()
            );
        })
        .await
}

/// Flatten an offset/limit listing endpoint into a lazy stream of items.
///
/// Every page fetch goes through [`retry_on_transient`]. The stream ends at
/// the first page shorter than `page_size`, or early when a page's retries
/// are exhausted. Items already yielded stay valid; callers cross-check
/// counts themselves when completeness matters.
pub fn fetch_paginated<T, Fut, F>(page_size: usize, mut fetch_page: F) -> impl Stream<Item = T>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, RemoteError>>,
{
    async_stream::stream! {
        let mut offset = 0;

        loop {
            log::debug!("Fetching page of {page_size} items at offset {offset}");

            let page = match retry_on_transient(|| fetch_page(offset, page_size)).await {
                Ok(page) => page,
                Err(err) => {
                    log::error!("Giving up on listing at offset {offset}: {err}");
                    break;
                }
            };

            let count = page.len();
            for item in page {
                yield item;
            }

            if count < page_size {
                break;
            }
            offset += page_size;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
