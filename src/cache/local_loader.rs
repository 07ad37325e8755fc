//! Local feed loader
//!
//! Coordinates a `FeedStore` and the `CachePolicy`: loads fresh cached items,
//! replaces the cache on save and deletes invalid caches on validation.
//!
//! Every operation is queued on the loader's own lane when it is called and
//! runs to completion before the next one starts. A save therefore holds the
//! lane from its delete until its insert has replied, so no load observes it
//! half-applied and concurrent saves resolve to the last one submitted.

use std::future::Future;
use std::io;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::policy::CachePolicy;
use super::store::{CacheEntry, CacheError, CachedFeedItem, FeedStore, RetrievalOutcome};
use crate::feed::{FeedItem, FeedLoader};

/// Source of the current time
pub type CurrentDate = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of loading the feed from the cache
pub type LoadResult = Result<Vec<FeedItem>, CacheError>;

/// Result of saving the feed to the cache
pub type SaveResult = Result<(), CacheError>;

/// Operation queued on the loader's lane
type Job = BoxFuture<'static, ()>;

struct Shared<S> {
    store: S,
    current_date: CurrentDate,
}

impl<S: FeedStore> Shared<S> {
    fn now(&self) -> DateTime<Utc> {
        (self.current_date)()
    }

    /// Maps a retrieval outcome to what `load` reports
    fn load_result(&self, outcome: RetrievalOutcome) -> LoadResult {
        match outcome {
            RetrievalOutcome::Failure(e) => Err(e),
            RetrievalOutcome::Found(entry) if CachePolicy::validate(entry.timestamp, self.now()) => {
                Ok(entry.items.into_iter().map(FeedItem::from).collect())
            }
            RetrievalOutcome::Found(entry) => {
                debug!(timestamp = %entry.timestamp, "cached feed expired");
                Ok(Vec::new())
            }
            RetrievalOutcome::Empty => Ok(Vec::new()),
        }
    }

    /// Whether validation should remove the cache
    fn needs_cleanup(&self, outcome: &RetrievalOutcome) -> bool {
        match outcome {
            RetrievalOutcome::Failure(e) => {
                debug!(error = %e, "cached feed unreadable");
                true
            }
            RetrievalOutcome::Found(entry) => !CachePolicy::validate(entry.timestamp, self.now()),
            RetrievalOutcome::Empty => false,
        }
    }

    fn entry_for(&self, items: &[FeedItem]) -> CacheEntry {
        CacheEntry::new(items.iter().map(CachedFeedItem::from).collect(), self.now())
    }

    // The operations below hold only a weak reference while a store request
    // is in flight. `None` means the loader was dropped before the outcome
    // arrived; nothing is reported and no follow-up request is issued.

    async fn run_load(shared: Weak<Self>) -> Option<LoadResult> {
        let retrieval = upgrade(&shared)?.store.retrieve();
        let outcome = retrieval.await;
        Some(upgrade(&shared)?.load_result(outcome))
    }

    async fn run_save(shared: Weak<Self>, items: Vec<FeedItem>) -> Option<SaveResult> {
        let deletion = upgrade(&shared)?.store.delete();
        if let Err(e) = deletion.await {
            upgrade(&shared)?;
            return Some(Err(e));
        }

        let insertion = {
            let strong = upgrade(&shared)?;
            strong.store.insert(strong.entry_for(&items))
        };
        let inserted = insertion.await;
        upgrade(&shared)?;
        Some(inserted)
    }

    async fn run_validate(shared: Weak<Self>) -> Option<()> {
        let retrieval = upgrade(&shared)?.store.retrieve();
        let outcome = retrieval.await;

        let deletion = {
            let strong = upgrade(&shared)?;
            if !strong.needs_cleanup(&outcome) {
                return Some(());
            }
            strong.store.delete()
        };
        log_cleanup(deletion.await);
        Some(())
    }
}

/// Loads and saves the feed through a local store
///
/// The awaited operations (`load`, `save`, `validate_cache`) borrow the
/// loader until they resolve. The `spawn_*` variants report through a
/// completion instead: once the loader is dropped, pending completions are
/// never invoked and no further store operations are issued.
pub struct LocalFeedLoader<S> {
    shared: Arc<Shared<S>>,
    /// Queue feeding the serial lane
    jobs: mpsc::UnboundedSender<Job>,
}

impl<S> LocalFeedLoader<S>
where
    S: FeedStore + 'static,
{
    /// Creates a loader reading the time from `current_date`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: S, current_date: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        let (jobs, receiver) = mpsc::unbounded_channel();

        tokio::spawn(run_lane(receiver));

        Self {
            shared: Arc::new(Shared {
                store,
                current_date: Box::new(current_date),
            }),
            jobs,
        }
    }

    /// Creates a loader using the system clock
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, Utc::now)
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    fn weak(&self) -> Weak<Shared<S>> {
        Arc::downgrade(&self.shared)
    }

    /// Queues `operation` and returns a receiver for its result
    fn enqueue<T, Op>(&self, operation: Op) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        Op: Future<Output = Option<T>> + Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        self.run_on_lane(async move {
            if let Some(result) = operation.await {
                let _ = reply.send(result);
            }
        });
        outcome
    }

    fn run_on_lane(&self, job: impl Future<Output = ()> + Send + 'static) {
        // A failed send means the lane is gone; the dropped job reports that.
        let _ = self.jobs.send(job.boxed());
    }

    /// Loads cached items if the cache exists and is still fresh
    ///
    /// An expired or missing cache yields an empty list. Never mutates the
    /// store. The load is queued when this is called.
    pub fn load(&self) -> BoxFuture<'_, LoadResult> {
        let outcome = self.enqueue(Shared::run_load(self.weak()));

        async move {
            outcome
                .await
                .unwrap_or_else(|_| Err(CacheError::Retrieval(lane_stopped())))
        }
        .boxed()
    }

    /// Replaces the cache with `items`, stamped with the current time
    ///
    /// The existing cache is deleted first; if that fails the insert is not
    /// attempted and the deletion error is returned. The save is queued when
    /// this is called.
    pub fn save(&self, items: &[FeedItem]) -> BoxFuture<'_, SaveResult> {
        let outcome = self.enqueue(Shared::run_save(self.weak(), items.to_vec()));

        async move {
            outcome
                .await
                .unwrap_or_else(|_| Err(CacheError::Deletion(lane_stopped())))
        }
        .boxed()
    }

    /// Deletes the cache if it cannot be read or has expired
    ///
    /// Cleanup is best effort: failures are logged and never reported.
    pub fn validate_cache(&self) -> BoxFuture<'_, ()> {
        let outcome = self.enqueue(Shared::run_validate(self.weak()));

        async move {
            let _ = outcome.await;
        }
        .boxed()
    }

    /// Loads in the background and passes the result to `completion`
    pub fn spawn_load<F>(&self, completion: F)
    where
        F: FnOnce(LoadResult) + Send + 'static,
    {
        let shared = self.weak();
        self.run_on_lane(async move {
            if let Some(result) = Shared::run_load(shared).await {
                completion(result);
            }
        });
    }

    /// Saves in the background and passes the result to `completion`
    pub fn spawn_save<F>(&self, items: Vec<FeedItem>, completion: F)
    where
        F: FnOnce(SaveResult) + Send + 'static,
    {
        let shared = self.weak();
        self.run_on_lane(async move {
            if let Some(result) = Shared::run_save(shared, items).await {
                completion(result);
            }
        });
    }

    /// Validates the cache in the background
    pub fn spawn_validate_cache(&self) {
        let shared = self.weak();
        self.run_on_lane(async move {
            let _ = Shared::run_validate(shared).await;
        });
    }
}

/// Runs queued operations one at a time until the queue closes
async fn run_lane(mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        job.await;
    }

    debug!("local feed loader lane stopped");
}

fn lane_stopped() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "local feed loader lane is not running")
}

fn upgrade<S>(shared: &Weak<Shared<S>>) -> Option<Arc<Shared<S>>> {
    let strong = shared.upgrade();
    if strong.is_none() {
        debug!("local feed loader dropped, discarding completion");
    }
    strong
}

fn log_cleanup(outcome: Result<(), CacheError>) {
    match outcome {
        Ok(()) => debug!("deleted invalid cached feed"),
        Err(e) => warn!(error = %e, "failed to delete invalid cached feed"),
    }
}

#[async_trait]
impl<S> FeedLoader for LocalFeedLoader<S>
where
    S: FeedStore + 'static,
{
    type Error = CacheError;

    async fn load(&self) -> Result<Vec<FeedItem>, CacheError> {
        LocalFeedLoader::load(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::policy::MAX_CACHE_AGE_DAYS;
    use crate::cache::store::MutationOutcome;
    use chrono::{Duration, TimeZone};
    use futures::future::{BoxFuture, FutureExt};
    use std::io;
    use std::sync::Mutex;
    use tokio::sync::{mpsc, oneshot};
    use url::Url;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    enum Message {
        Retrieve,
        Insert(CacheEntry),
        Delete,
    }

    /// Store double recording received messages
    ///
    /// Each operation stays pending until the test completes it.
    #[derive(Default)]
    struct StoreSpy {
        messages: Mutex<Vec<Message>>,
        retrievals: Mutex<Vec<oneshot::Sender<RetrievalOutcome>>>,
        insertions: Mutex<Vec<oneshot::Sender<MutationOutcome>>>,
        deletions: Mutex<Vec<oneshot::Sender<MutationOutcome>>>,
    }

    impl StoreSpy {
        fn messages(&self) -> Vec<Message> {
            self.messages.lock().unwrap().clone()
        }

        fn complete_retrieval(&self, outcome: RetrievalOutcome) {
            let reply = self.retrievals.lock().unwrap().remove(0);
            let _ = reply.send(outcome);
        }

        fn complete_insertion(&self, outcome: MutationOutcome) {
            let reply = self.insertions.lock().unwrap().remove(0);
            let _ = reply.send(outcome);
        }

        fn complete_deletion(&self, outcome: MutationOutcome) {
            let reply = self.deletions.lock().unwrap().remove(0);
            let _ = reply.send(outcome);
        }
    }

    fn pending<T: Send + 'static>(
        queue: &Mutex<Vec<oneshot::Sender<T>>>,
        closed: T,
    ) -> BoxFuture<'static, T> {
        let (reply, outcome) = oneshot::channel();
        queue.lock().unwrap().push(reply);
        async move { outcome.await.unwrap_or(closed) }.boxed()
    }

    fn closed_error() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "spy dropped")
    }

    impl FeedStore for StoreSpy {
        fn retrieve(&self) -> BoxFuture<'static, RetrievalOutcome> {
            self.messages.lock().unwrap().push(Message::Retrieve);
            pending(
                &self.retrievals,
                RetrievalOutcome::Failure(CacheError::Retrieval(closed_error())),
            )
        }

        fn insert(&self, entry: CacheEntry) -> BoxFuture<'static, MutationOutcome> {
            self.messages.lock().unwrap().push(Message::Insert(entry));
            pending(&self.insertions, Err(CacheError::Insertion(closed_error())))
        }

        fn delete(&self) -> BoxFuture<'static, MutationOutcome> {
            self.messages.lock().unwrap().push(Message::Delete);
            pending(&self.deletions, Err(CacheError::Deletion(closed_error())))
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 0).unwrap()
    }

    fn make_sut() -> (LocalFeedLoader<Arc<StoreSpy>>, Arc<StoreSpy>) {
        let store = Arc::new(StoreSpy::default());
        let sut = LocalFeedLoader::new(store.clone(), fixed_now);
        (sut, store)
    }

    fn unique_item() -> FeedItem {
        FeedItem::new(
            Uuid::new_v4(),
            Some("any description".to_string()),
            Some("any location".to_string()),
            Url::parse("https://example.com/image.png").unwrap(),
        )
    }

    fn unique_feed() -> (Vec<FeedItem>, Vec<CachedFeedItem>) {
        let models = vec![unique_item(), unique_item()];
        let local = models.iter().map(CachedFeedItem::from).collect();
        (models, local)
    }

    fn max_age_ago() -> DateTime<Utc> {
        fixed_now() - Duration::days(MAX_CACHE_AGE_DAYS as i64)
    }

    fn any_error() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "any error")
    }

    /// Lets spawned tasks and the test task interleave
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_new_does_not_message_store() {
        let (_sut, store) = make_sut();

        assert!(store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_load_requests_cache_retrieval() {
        let (sut, store) = make_sut();

        let load = sut.load();
        settle().await;

        assert_eq!(store.messages(), vec![Message::Retrieve]);
        drop(load);
    }

    #[tokio::test]
    async fn test_load_submitted_after_save_waits_for_insertion() {
        let (sut, store) = make_sut();
        let (models, local) = unique_feed();

        let save = sut.save(&models);
        let load = sut.load();
        settle().await;
        assert_eq!(store.messages(), vec![Message::Delete]);

        store.complete_deletion(Ok(()));
        settle().await;
        let insertion = Message::Insert(CacheEntry::new(local.clone(), fixed_now()));
        assert_eq!(store.messages(), vec![Message::Delete, insertion.clone()]);

        store.complete_insertion(Ok(()));
        settle().await;
        assert_eq!(
            store.messages(),
            vec![Message::Delete, insertion, Message::Retrieve]
        );

        store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, fixed_now())));
        assert!(save.await.is_ok());
        assert_eq!(load.await.unwrap(), models);
    }

    #[tokio::test]
    async fn test_queued_operations_are_not_issued_after_loader_dropped() {
        let (sut, store) = make_sut();

        sut.spawn_save(unique_feed().0, |_| {});
        sut.spawn_load(|_| {});
        sut.spawn_validate_cache();
        settle().await;
        drop(sut);
        store.complete_deletion(Ok(()));
        settle().await;

        assert_eq!(store.messages(), vec![Message::Delete]);
    }

    #[tokio::test]
    async fn test_load_fails_on_retrieval_error() {
        let (sut, store) = make_sut();

        let (load, ()) = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Failure(CacheError::Retrieval(any_error())));
        });

        assert!(matches!(load, Err(CacheError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_load_delivers_no_items_on_empty_cache() {
        let (sut, store) = make_sut();

        let (load, ()) = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Empty);
        });

        assert_eq!(load.unwrap(), Vec::<FeedItem>::new());
    }

    #[tokio::test]
    async fn test_load_delivers_cached_items_on_non_expired_cache() {
        let (sut, store) = make_sut();
        let (models, local) = unique_feed();
        let timestamp = max_age_ago() + Duration::seconds(1);

        let (load, ()) = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, timestamp)));
        });

        assert_eq!(load.unwrap(), models);
    }

    #[tokio::test]
    async fn test_load_delivers_no_items_on_cache_expiration() {
        let (sut, store) = make_sut();
        let (_, local) = unique_feed();

        let (load, ()) = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, max_age_ago())));
        });

        assert_eq!(load.unwrap(), Vec::<FeedItem>::new());
    }

    #[tokio::test]
    async fn test_load_delivers_no_items_on_expired_cache() {
        let (sut, store) = make_sut();
        let (_, local) = unique_feed();
        let timestamp = max_age_ago() - Duration::seconds(1);

        let (load, ()) = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, timestamp)));
        });

        assert_eq!(load.unwrap(), Vec::<FeedItem>::new());
        assert_eq!(store.messages(), vec![Message::Retrieve]);
    }

    #[tokio::test]
    async fn test_load_has_no_side_effects_on_retrieval_error() {
        let (sut, store) = make_sut();

        let _ = tokio::join!(sut.load(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Failure(CacheError::Retrieval(any_error())));
        });

        assert_eq!(store.messages(), vec![Message::Retrieve]);
    }

    #[tokio::test]
    async fn test_save_does_not_request_insertion_on_deletion_error() {
        let (sut, store) = make_sut();
        let (models, _) = unique_feed();

        let (save, ()) = tokio::join!(sut.save(&models), async {
            settle().await;
            store.complete_deletion(Err(CacheError::Deletion(any_error())));
        });

        assert!(matches!(save, Err(CacheError::Deletion(_))));
        assert_eq!(store.messages(), vec![Message::Delete]);
    }

    #[tokio::test]
    async fn test_save_requests_insertion_with_timestamp_on_successful_deletion() {
        let (sut, store) = make_sut();
        let (models, local) = unique_feed();

        let (save, ()) = tokio::join!(sut.save(&models), async {
            settle().await;
            store.complete_deletion(Ok(()));
            settle().await;
            store.complete_insertion(Ok(()));
        });

        assert!(save.is_ok());
        assert_eq!(
            store.messages(),
            vec![
                Message::Delete,
                Message::Insert(CacheEntry::new(local, fixed_now()))
            ]
        );
    }

    #[tokio::test]
    async fn test_save_fails_on_insertion_error() {
        let (sut, store) = make_sut();
        let (models, _) = unique_feed();

        let (save, ()) = tokio::join!(sut.save(&models), async {
            settle().await;
            store.complete_deletion(Ok(()));
            settle().await;
            store.complete_insertion(Err(CacheError::Insertion(any_error())));
        });

        assert!(matches!(save, Err(CacheError::Insertion(_))));
    }

    #[tokio::test]
    async fn test_save_stamps_time_at_insertion() {
        let store = Arc::new(StoreSpy::default());
        let calls = Arc::new(Mutex::new(0i64));
        let clock_calls = calls.clone();
        let sut = LocalFeedLoader::new(store.clone(), move || {
            let mut calls = clock_calls.lock().unwrap();
            *calls += 1;
            fixed_now() + Duration::hours(*calls)
        });
        let (models, local) = unique_feed();

        let (save, ()) = tokio::join!(sut.save(&models), async {
            settle().await;
            store.complete_deletion(Ok(()));
            settle().await;
            store.complete_insertion(Ok(()));
        });

        assert!(save.is_ok());
        assert_eq!(
            store.messages()[1],
            Message::Insert(CacheEntry::new(local, fixed_now() + Duration::hours(1)))
        );
    }

    #[tokio::test]
    async fn test_validate_cache_deletes_cache_on_retrieval_error() {
        let (sut, store) = make_sut();

        tokio::join!(sut.validate_cache(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Failure(CacheError::Retrieval(any_error())));
            settle().await;
            store.complete_deletion(Err(CacheError::Deletion(any_error())));
        });

        assert_eq!(store.messages(), vec![Message::Retrieve, Message::Delete]);
    }

    #[tokio::test]
    async fn test_validate_cache_does_not_delete_cache_on_empty_cache() {
        let (sut, store) = make_sut();

        tokio::join!(sut.validate_cache(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Empty);
        });

        assert_eq!(store.messages(), vec![Message::Retrieve]);
    }

    #[tokio::test]
    async fn test_validate_cache_does_not_delete_non_expired_cache() {
        let (sut, store) = make_sut();
        let (_, local) = unique_feed();
        let timestamp = max_age_ago() + Duration::seconds(1);

        tokio::join!(sut.validate_cache(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, timestamp)));
        });

        assert_eq!(store.messages(), vec![Message::Retrieve]);
    }

    #[tokio::test]
    async fn test_validate_cache_deletes_cache_on_expiration() {
        let (sut, store) = make_sut();
        let (_, local) = unique_feed();

        tokio::join!(sut.validate_cache(), async {
            settle().await;
            store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, max_age_ago())));
            settle().await;
            store.complete_deletion(Ok(()));
        });

        assert_eq!(store.messages(), vec![Message::Retrieve, Message::Delete]);
    }

    #[tokio::test]
    async fn test_spawn_load_delivers_result_to_completion() {
        let (sut, store) = make_sut();
        let (models, local) = unique_feed();
        let (tx, mut rx) = mpsc::unbounded_channel();

        sut.spawn_load(move |result| {
            let _ = tx.send(result);
        });
        settle().await;
        store.complete_retrieval(RetrievalOutcome::Found(CacheEntry::new(local, fixed_now())));

        assert_eq!(rx.recv().await.unwrap().unwrap(), models);
    }

    #[tokio::test]
    async fn test_spawn_load_does_not_deliver_result_after_loader_dropped() {
        let (sut, store) = make_sut();
        let (tx, mut rx) = mpsc::unbounded_channel();

        sut.spawn_load(move |result| {
            let _ = tx.send(result);
        });
        settle().await;
        drop(sut);
        store.complete_retrieval(RetrievalOutcome::Empty);

        // The completion owns the sender, so the channel closes without a value.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_spawn_save_does_not_deliver_deletion_error_after_loader_dropped() {
        let (sut, store) = make_sut();
        let (tx, mut rx) = mpsc::unbounded_channel();

        sut.spawn_save(unique_feed().0, move |result| {
            let _ = tx.send(result);
        });
        settle().await;
        drop(sut);
        store.complete_deletion(Err(CacheError::Deletion(any_error())));

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_spawn_save_does_not_request_insertion_after_loader_dropped() {
        let (sut, store) = make_sut();

        sut.spawn_save(unique_feed().0, |_| {});
        settle().await;
        drop(sut);
        store.complete_deletion(Ok(()));
        settle().await;

        assert_eq!(store.messages(), vec![Message::Delete]);
    }

    #[tokio::test]
    async fn test_spawn_save_does_not_deliver_insertion_error_after_loader_dropped() {
        let (sut, store) = make_sut();
        let (tx, mut rx) = mpsc::unbounded_channel();

        sut.spawn_save(unique_feed().0, move |result| {
            let _ = tx.send(result);
        });
        settle().await;
        store.complete_deletion(Ok(()));
        settle().await;
        drop(sut);
        store.complete_insertion(Err(CacheError::Insertion(any_error())));

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_spawn_save_delivers_insertion_result() {
        let (sut, store) = make_sut();
        let (tx, mut rx) = mpsc::unbounded_channel();

        sut.spawn_save(unique_feed().0, move |result| {
            let _ = tx.send(result);
        });
        settle().await;
        store.complete_deletion(Ok(()));
        settle().await;
        store.complete_insertion(Ok(()));

        assert!(rx.recv().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_spawn_validate_cache_does_not_delete_after_loader_dropped() {
        let (sut, store) = make_sut();

        sut.spawn_validate_cache();
        settle().await;
        drop(sut);
        store.complete_retrieval(RetrievalOutcome::Failure(CacheError::Retrieval(any_error())));
        settle().await;

        assert_eq!(store.messages(), vec![Message::Retrieve]);
    }
}
