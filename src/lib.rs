//! feedcache library
//!
//! Exposes the feed types, the remote loader, the local cache and the CLI
//! parsing for use by the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod feed;
pub mod remote;
