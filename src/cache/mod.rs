//! Cache module for keeping the feed on disk
//!
//! This module provides the store contract, a file-backed store with
//! serialized crash-safe writes, the freshness policy, and the local loader
//! coordinating them. A cached feed is served while it is younger than
//! `MAX_CACHE_AGE_DAYS`; older caches load as empty and are removed by
//! `LocalFeedLoader::validate_cache`.

mod file_store;
mod local_loader;
mod policy;
mod store;

pub use file_store::FileFeedStore;
pub use local_loader::{CurrentDate, LoadResult, LocalFeedLoader, SaveResult};
pub use policy::{CachePolicy, MAX_CACHE_AGE_DAYS};
pub use store::{
    CacheEntry, CacheError, CachedFeedItem, FeedStore, MutationOutcome, RetrievalOutcome,
};
