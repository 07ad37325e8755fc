//! Feed feature types
//!
//! This module contains the public item shape handed to consumers and the
//! `FeedLoader` capability implemented by both the remote and the local loader.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A single item of the feed as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Unique identifier of the item
    pub id: Uuid,
    /// Optional free-text description
    pub description: Option<String>,
    /// Optional human-readable location
    pub location: Option<String>,
    /// Where the item's media can be fetched from
    pub url: Url,
}

impl FeedItem {
    /// Creates a new feed item
    pub fn new(
        id: Uuid,
        description: Option<String>,
        location: Option<String>,
        url: Url,
    ) -> Self {
        Self {
            id,
            description,
            location,
            url,
        }
    }
}

/// Anything that can produce a list of feed items
#[async_trait]
pub trait FeedLoader: Send + Sync {
    /// Error reported when loading fails
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the feed
    async fn load(&self) -> Result<Vec<FeedItem>, Self::Error>;
}
