//! Remote feed source
//!
//! Fetches the feed over HTTP and maps the response into `FeedItem`s. The
//! transport is abstracted behind `HttpClient` so the loader can be driven by
//! a stub in tests.

mod http;
mod mapper;

pub use http::{HttpClient, HttpClientError, HttpResponse, ReqwestHttpClient};
pub use mapper::map_feed_items;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::feed::{FeedItem, FeedLoader};

/// Errors that can occur when loading the remote feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote source could not be reached
    #[error("Could not reach the feed source")]
    Connectivity,

    /// The response had an unexpected status or payload
    #[error("Feed source returned invalid data")]
    InvalidData,
}

/// Loads the feed from a remote URL
#[derive(Debug, Clone)]
pub struct RemoteFeedLoader<C> {
    url: Url,
    client: C,
}

impl<C: HttpClient> RemoteFeedLoader<C> {
    pub fn new(url: Url, client: C) -> Self {
        Self { url, client }
    }

    /// Returns the URL the feed is loaded from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches and decodes the feed
    ///
    /// # Returns
    /// * `Ok(Vec<FeedItem>)` - The decoded items
    /// * `Err(RemoteError::Connectivity)` - If the transport failed
    /// * `Err(RemoteError::InvalidData)` - If the response was not a valid feed
    pub async fn load(&self) -> Result<Vec<FeedItem>, RemoteError> {
        let response = self.client.get(&self.url).await.map_err(|e| {
            debug!(url = %self.url, error = %e, "feed request failed");
            RemoteError::Connectivity
        })?;

        map_feed_items(&response.body, response.status)
    }
}

#[async_trait]
impl<C: HttpClient> FeedLoader for RemoteFeedLoader<C> {
    type Error = RemoteError;

    async fn load(&self) -> Result<Vec<FeedItem>, RemoteError> {
        RemoteFeedLoader::load(self).await
    }
}
