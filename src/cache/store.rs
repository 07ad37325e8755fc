//! Store contract for the cached feed
//!
//! A store holds at most one `CacheEntry` and exposes three operations:
//! retrieve, insert (replacing) and delete. Each operation is submitted when
//! the method is called and the returned future resolves exactly once with
//! its outcome.

use std::io;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::feed::FeedItem;

/// Errors reported by a feed store
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cached feed could not be read or decoded
    #[error("Failed to retrieve cached feed: {0}")]
    Retrieval(#[source] io::Error),

    /// The feed could not be durably written
    #[error("Failed to insert feed into cache: {0}")]
    Insertion(#[source] io::Error),

    /// The cached feed could not be removed
    #[error("Failed to delete cached feed: {0}")]
    Deletion(#[source] io::Error),
}

/// Feed item as persisted by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeedItem {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl From<&FeedItem> for CachedFeedItem {
    fn from(item: &FeedItem) -> Self {
        Self {
            id: item.id,
            description: item.description.clone(),
            location: item.location.clone(),
            url: item.url.clone(),
        }
    }
}

impl From<CachedFeedItem> for FeedItem {
    fn from(item: CachedFeedItem) -> Self {
        FeedItem {
            id: item.id,
            description: item.description,
            location: item.location,
            url: item.url,
        }
    }
}

/// The single snapshot held by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached items, in the order they were saved
    pub items: Vec<CachedFeedItem>,
    /// When the items were cached
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(items: Vec<CachedFeedItem>, timestamp: DateTime<Utc>) -> Self {
        Self { items, timestamp }
    }
}

/// Result of reading from a store
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// Nothing is cached
    Empty,
    /// A cache entry exists
    Found(CacheEntry),
    /// The store could not be read
    Failure(CacheError),
}

/// Result of inserting into or deleting from a store
pub type MutationOutcome = Result<(), CacheError>;

/// Persistence capability used by the local feed loader
///
/// Any implementation (in-memory, file-backed, ...) is substitutable as long
/// as it honours these rules:
///
/// * `retrieve` has no side effects; two reads with no mutation in between
///   return equal outcomes.
/// * `insert` replaces any existing entry wholesale. If it fails, the store
///   looks as if the insert never started.
/// * `delete` on an empty store succeeds. If it fails, prior content stays
///   intact.
pub trait FeedStore: Send + Sync {
    /// Reads the current entry
    fn retrieve(&self) -> BoxFuture<'static, RetrievalOutcome>;

    /// Replaces the current entry with `entry`
    fn insert(&self, entry: CacheEntry) -> BoxFuture<'static, MutationOutcome>;

    /// Removes the current entry, if any
    fn delete(&self) -> BoxFuture<'static, MutationOutcome>;
}

impl<S: FeedStore + ?Sized> FeedStore for Arc<S> {
    fn retrieve(&self) -> BoxFuture<'static, RetrievalOutcome> {
        (**self).retrieve()
    }

    fn insert(&self, entry: CacheEntry) -> BoxFuture<'static, MutationOutcome> {
        (**self).insert(entry)
    }

    fn delete(&self) -> BoxFuture<'static, MutationOutcome> {
        (**self).delete()
    }
}
