//! File-backed feed store
//!
//! Persists the cache entry as a single JSON file. Every operation is queued
//! on one background worker and executed strictly in submission order, so a
//! reader never observes half of a save and concurrent saves resolve to the
//! last one submitted. Writes go to a temporary file next to the canonical
//! one and are then renamed over it, so a failed or interrupted write never
//! truncates existing data.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::store::{CacheEntry, CacheError, FeedStore, MutationOutcome, RetrievalOutcome};

/// Work item handed to the store worker
enum Request {
    Retrieve(oneshot::Sender<RetrievalOutcome>),
    Insert(CacheEntry, oneshot::Sender<MutationOutcome>),
    Delete(oneshot::Sender<MutationOutcome>),
}

/// Feed store persisting to a JSON file
///
/// Dropping the store closes its queue; requests already queued are still
/// executed before the worker exits.
#[derive(Debug)]
pub struct FileFeedStore {
    /// Canonical location of the cache file
    path: PathBuf,
    /// Queue feeding the serial worker
    requests: mpsc::UnboundedSender<Request>,
}

impl FileFeedStore {
    /// Creates a store for the file at `path` and starts its worker
    ///
    /// Must be called from within a Tokio runtime. The file and its parent
    /// directory are only created on the first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (requests, receiver) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(path.clone(), receiver));

        Self { path, requests }
    }

    /// Returns the canonical location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queues a request and returns a future resolving to its reply
    ///
    /// `on_closed` builds the outcome reported when the worker is no longer
    /// running.
    fn submit<T, F>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> Request,
        on_closed: F,
    ) -> BoxFuture<'static, T>
    where
        T: Send + 'static,
        F: FnOnce(io::Error) -> T + Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        // A failed send drops the reply sender, which the receiver reports below.
        let _ = self.requests.send(request(reply));

        async move {
            outcome.await.unwrap_or_else(|_| {
                on_closed(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "feed store worker is not running",
                ))
            })
        }
        .boxed()
    }
}

impl FeedStore for FileFeedStore {
    fn retrieve(&self) -> BoxFuture<'static, RetrievalOutcome> {
        self.submit(Request::Retrieve, |e| {
            RetrievalOutcome::Failure(CacheError::Retrieval(e))
        })
    }

    fn insert(&self, entry: CacheEntry) -> BoxFuture<'static, MutationOutcome> {
        self.submit(
            |reply| Request::Insert(entry, reply),
            |e| Err(CacheError::Insertion(e)),
        )
    }

    fn delete(&self) -> BoxFuture<'static, MutationOutcome> {
        self.submit(Request::Delete, |e| Err(CacheError::Deletion(e)))
    }
}

/// Executes queued requests one at a time until the queue closes
async fn run_worker(path: PathBuf, mut requests: mpsc::UnboundedReceiver<Request>) {
    while let Some(request) = requests.recv().await {
        // The caller may have dropped its future; the outcome is then discarded.
        match request {
            Request::Retrieve(reply) => {
                let _ = reply.send(read_entry(&path).await);
            }
            Request::Insert(entry, reply) => {
                let _ = reply.send(write_entry(&path, &entry).await);
            }
            Request::Delete(reply) => {
                let _ = reply.send(delete_entry(&path).await);
            }
        }
    }

    debug!(path = %path.display(), "feed store worker stopped");
}

async fn read_entry(path: &Path) -> RetrievalOutcome {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no cached feed");
            return RetrievalOutcome::Empty;
        }
        Err(e) => return RetrievalOutcome::Failure(CacheError::Retrieval(e)),
    };

    match serde_json::from_slice::<CacheEntry>(&bytes) {
        Ok(entry) => {
            debug!(path = %path.display(), items = entry.items.len(), "read cached feed");
            RetrievalOutcome::Found(entry)
        }
        Err(e) => RetrievalOutcome::Failure(CacheError::Retrieval(io::Error::new(
            io::ErrorKind::InvalidData,
            e,
        ))),
    }
}

async fn write_entry(path: &Path, entry: &CacheEntry) -> MutationOutcome {
    let json = serde_json::to_vec(entry)
        .map_err(|e| CacheError::Insertion(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(CacheError::Insertion)?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_and_replace(&temp_path, path, &json).await {
        // Leftovers are harmless but would linger next to the cache file.
        let _ = fs::remove_file(&temp_path).await;
        return Err(CacheError::Insertion(e));
    }

    debug!(path = %path.display(), items = entry.items.len(), "wrote cached feed");
    Ok(())
}

/// Writes `contents` to `temp_path`, syncs it, then renames it onto `path`
async fn write_and_replace(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temp_path, path).await?;
    sync_parent_dir(path).await
}

/// Flushes the directory entry of `path` so a completed rename survives a crash
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::File::open(parent).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

async fn delete_entry(path: &Path) -> MutationOutcome {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "deleted cached feed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::Deletion(e)),
    }
}

/// Temporary file used while replacing `path`, in the same directory
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("feed"));
    name.push(".tmp");
    path.with_file_name(name)
}
