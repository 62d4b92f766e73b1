//! HTTP asset fetching.
//!
//! The [`AssetFetcher`] trait abstracts the network so the engine and the
//! background adapter can be driven by a scripted fetcher in tests. The real
//! implementation is [`HttpFetcher`] over reqwest.
//!
//! Conditional re-fetch: when the caller passes the stored copy's mtime, the
//! request carries `If-Modified-Since` and a `304 Not Modified` response is
//! reported as [`FetchOutcome::NotModified`] — success with no bytes, the
//! stored copy is still current.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use reqwest::header::IF_MODIFIED_SINCE;
use reqwest::StatusCode;
use tracing::trace;

use crate::error::SyncError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one asset fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The asset was fetched; these are its complete bytes.
    Fetched(Vec<u8>),
    /// The server reported the stored copy is still current.
    NotModified,
}

/// Network access for asset and manifest fetches.
///
/// Implementations must not retain the `url` borrow beyond the call; the
/// returned future owns everything it needs.
pub trait AssetFetcher: Send + Sync {
    /// Fetch the bytes at `url`.
    ///
    /// `modified_since` carries the stored copy's last-modified time, if
    /// any, as the conditional-request validator.
    fn fetch(
        &self,
        url: &str,
        modified_since: Option<SystemTime>,
    ) -> BoxFuture<'_, Result<FetchOutcome, SyncError>>;
}

/// Asset fetcher backed by a reqwest client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zenithsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        modified_since: Option<SystemTime>,
    ) -> BoxFuture<'_, Result<FetchOutcome, SyncError>> {
        let mut request = self.client.get(url);
        if let Some(when) = modified_since {
            request = request.header(IF_MODIFIED_SINCE, http_date(when));
        }
        let url = url.to_string();

        Box::pin(async move {
            let response = request.send().await.map_err(classify_transport)?;
            let status = response.status();

            if status == StatusCode::NOT_MODIFIED {
                trace!(%url, "not modified");
                return Ok(FetchOutcome::NotModified);
            }
            if !status.is_success() {
                return Err(SyncError::data_processing(format!(
                    "unexpected status {status} from {url}"
                )));
            }

            let bytes = response.bytes().await.map_err(classify_transport)?;
            trace!(%url, bytes = bytes.len(), "fetched");
            Ok(FetchOutcome::Fetched(bytes.to_vec()))
        })
    }
}

/// Map a reqwest error to the transport bucket.
fn classify_transport(err: reqwest::Error) -> SyncError {
    SyncError::network(err.to_string())
}

/// Format a timestamp as an RFC 7231 HTTP date.
fn http_date(when: SystemTime) -> String {
    DateTime::<Utc>::from(when)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_date_epoch() {
        assert_eq!(
            http_date(SystemTime::UNIX_EPOCH),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_http_fetcher_builds() {
        let fetcher = HttpFetcher::new(Duration::from_secs(5));
        assert!(fetcher.is_ok());
    }
}
