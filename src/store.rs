//! The process-wide state holder.
//!
//! [`MarketStore`] owns the canonical [`AppState`], applies mutations
//! atomically, persists a snapshot after each change, and notifies
//! observers. It is opened via [`MarketStoreBuilder`], which restores the
//! last persisted snapshot or falls back to the configured [`Seed`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{PersistError, SeedError, SnapshotError};
use crate::model::{AppState, UserProfile};
use crate::seed::Seed;
use crate::snapshot::{load_snapshot, save_snapshot, validate_user};
use crate::storage::{FileSlotStorage, SlotStorage};

/// Default slot key under which the snapshot is stored.
pub const DEFAULT_NAMESPACE: &str = "dataco-op-store";

/// Observer callback invoked with the new state after each change.
type Callback = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Identifies a registered observer so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// How a mutation was recorded.
///
/// Persistence failures never undo a mutation; they are reported here so
/// the caller can surface a non-fatal warning.
#[derive(Debug)]
#[must_use = "a MemoryOnly outcome means the change will not survive a restart"]
pub enum WriteOutcome {
    /// State changed and the snapshot was written.
    Persisted,
    /// The mutation left the state as it was; nothing was written.
    Unchanged,
    /// State changed in memory but the snapshot write failed.
    MemoryOnly(PersistError),
}

impl WriteOutcome {
    /// Returns `true` if the mutation changed the state.
    pub fn changed(&self) -> bool {
        !matches!(self, WriteOutcome::Unchanged)
    }

    /// Returns `true` if the change is only held in memory.
    pub fn is_memory_only(&self) -> bool {
        matches!(self, WriteOutcome::MemoryOnly(_))
    }
}

/// States awaiting delivery to observers, in commit order.
///
/// Only the thread that flips `draining` delivers; any other committer
/// enqueues and returns.
#[derive(Default)]
struct Delivery {
    pending: VecDeque<Arc<AppState>>,
    draining: bool,
}

struct Inner {
    state: RwLock<Arc<AppState>>,
    storage: Box<dyn SlotStorage>,
    namespace: String,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    delivery: Mutex<Delivery>,
    next_subscription: AtomicU64,
    degraded: AtomicBool,
    watch_tx: tokio::sync::watch::Sender<Arc<AppState>>,
}

/// Explicit, injectable holder of the application state.
///
/// Every read-modify-write runs under one write lock, and the snapshot is
/// written under that same lock, so persisted order matches in-memory
/// order even when clones of the store are used from several threads.
/// Observers run after the lock is released and may call back into the
/// store.
///
/// `Clone` is cheap -- all internal state is `Arc`-wrapped.
#[derive(Clone)]
pub struct MarketStore {
    inner: Arc<Inner>,
}

// Manual `Debug` because the storage backend and callbacks are trait
// objects.
impl std::fmt::Debug for MarketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStore")
            .field("namespace", &self.inner.namespace)
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl MarketStore {
    /// Start configuring a store.
    pub fn builder() -> MarketStoreBuilder {
        MarketStoreBuilder::new()
    }

    /// Returns the current immutable snapshot.
    pub fn state(&self) -> Arc<AppState> {
        match self.inner.state.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// The slot key this store persists under.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Returns `true` if the most recent snapshot write (or the restore
    /// read at open) failed.
    pub fn is_degraded(&self) -> bool {
        self.inner.degraded.load(Ordering::Acquire)
    }

    /// Replace the user wholesale. `None` represents logged out.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidUser`] without touching the state if
    /// the profile's earnings are negative or NaN.
    pub fn set_user(&self, user: Option<UserProfile>) -> Result<WriteOutcome, SnapshotError> {
        if let Some(user) = &user {
            validate_user(user)?;
        }
        Ok(self.mutate(|state| state.user = user))
    }

    /// Append `bundle_id` to the cart unless it is already present.
    pub fn add_to_cart(&self, bundle_id: &str) -> WriteOutcome {
        self.mutate(|state| {
            crate::cart::insert_unique(&mut state.cart, bundle_id);
        })
    }

    /// Remove `bundle_id` from the cart. Absent ids are a no-op.
    pub fn remove_from_cart(&self, bundle_id: &str) -> WriteOutcome {
        self.mutate(|state| state.cart.retain(|id| id != bundle_id))
    }

    /// Empty the cart.
    pub fn clear_cart(&self) -> WriteOutcome {
        self.mutate(|state| state.cart.clear())
    }

    /// Register an observer called after every mutation that changes the
    /// state, in registration order.
    ///
    /// Deliveries never overlap and arrive in commit order. When another
    /// thread is already delivering, a mutation returns after queueing its
    /// state and that thread delivers it next.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        let callback: Callback = Arc::new(callback);
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.push((id, callback));
        tracing::debug!(subscription = id.0, "observer registered");
        id
    }

    /// Remove an observer.
    ///
    /// # Returns
    ///
    /// `true` if the observer was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Receive every new state for async consumers.
    ///
    /// The receiver starts marked as seen at the current state, so the
    /// first `changed().await` resolves on the next mutation.
    pub fn watch(&self) -> tokio::sync::watch::Receiver<Arc<AppState>> {
        self.inner.watch_tx.subscribe()
    }

    /// Flush a final snapshot and drop all observers.
    ///
    /// The store stays usable in memory afterwards; clones held elsewhere
    /// keep working but no longer notify the removed observers.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the final write fails.
    pub fn shutdown(&self) -> Result<(), PersistError> {
        let result = {
            let guard = match self.inner.state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            save_snapshot(self.inner.storage.as_ref(), &self.inner.namespace, &guard)
        };
        self.inner.degraded.store(result.is_err(), Ordering::Release);

        let dropped = {
            let mut subscribers = lock(&self.inner.subscribers);
            std::mem::take(&mut *subscribers).len()
        };
        tracing::info!(
            namespace = %self.inner.namespace,
            observers_dropped = dropped,
            "store shut down"
        );
        result
    }

    /// Apply `f` to a copy of the current state and install the result.
    fn mutate(&self, f: impl FnOnce(&mut AppState)) -> WriteOutcome {
        let outcome = {
            let mut guard = match self.inner.state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let mut next = (**guard).clone();
            f(&mut next);
            if next == **guard {
                return WriteOutcome::Unchanged;
            }

            let outcome =
                match save_snapshot(self.inner.storage.as_ref(), &self.inner.namespace, &next) {
                    Ok(()) => {
                        self.inner.degraded.store(false, Ordering::Release);
                        WriteOutcome::Persisted
                    }
                    Err(e) => {
                        tracing::warn!(
                            namespace = %self.inner.namespace,
                            error = %e,
                            "snapshot write failed; continuing in memory"
                        );
                        self.inner.degraded.store(true, Ordering::Release);
                        WriteOutcome::MemoryOnly(e)
                    }
                };

            let next = Arc::new(next);
            *guard = Arc::clone(&next);
            self.inner.watch_tx.send_replace(Arc::clone(&next));
            // Enqueued under the state lock so queue order is commit order.
            lock(&self.inner.delivery).pending.push_back(next);
            outcome
        };

        self.drain();
        outcome
    }

    /// Deliver queued states one at a time unless another thread already is.
    fn drain(&self) {
        {
            let mut delivery = lock(&self.inner.delivery);
            if delivery.draining {
                return;
            }
            delivery.draining = true;
        }
        let _reset = DrainGuard(&self.inner.delivery);

        loop {
            let next = {
                let mut delivery = lock(&self.inner.delivery);
                match delivery.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        delivery.draining = false;
                        return;
                    }
                }
            };
            self.notify(&next);
        }
    }

    fn notify(&self, state: &AppState) {
        // Clone the list so observers may subscribe or unsubscribe.
        let callbacks: Vec<Callback> = {
            let subscribers = lock(&self.inner.subscribers);
            subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback(state);
        }
    }
}

/// Clears the draining flag if an observer panics mid-delivery.
struct DrainGuard<'a>(&'a Mutex<Delivery>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.0).draining = false;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Builder for configuring and opening a [`MarketStore`].
///
/// # Examples
///
/// ```
/// use datacoop_store::{MarketStoreBuilder, MemorySlotStorage};
///
/// let store = MarketStoreBuilder::new()
///     .storage(MemorySlotStorage::new())
///     .open()
///     .expect("built-in seed always loads");
/// assert_eq!(store.state().bundles.len(), 3);
/// ```
pub struct MarketStoreBuilder {
    base_dir: Option<PathBuf>,
    namespace: String,
    seed: Option<Seed>,
    seed_file: Option<PathBuf>,
    storage: Option<Box<dyn SlotStorage>>,
}

impl Default for MarketStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStoreBuilder {
    /// Create a builder with the default namespace and demo seed.
    pub fn new() -> Self {
        Self {
            base_dir: None,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            seed: None,
            seed_file: None,
            storage: None,
        }
    }

    /// Set the directory for the file-backed slot.
    ///
    /// Ignored when a custom [`storage`](MarketStoreBuilder::storage) is
    /// set. If neither is set, defaults to `<temp_dir>/datacoop`.
    pub fn base_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.base_dir = Some(path.as_ref().to_owned());
        self
    }

    /// Set the slot key. Defaults to [`DEFAULT_NAMESPACE`].
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Use `seed` when no usable snapshot exists. Defaults to
    /// [`Seed::demo`].
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load the seed from a JSON state document at open time.
    ///
    /// Takes precedence over [`seed`](MarketStoreBuilder::seed).
    pub fn seed_file(mut self, path: impl AsRef<Path>) -> Self {
        self.seed_file = Some(path.as_ref().to_owned());
        self
    }

    /// Persist through a custom slot backend instead of the file system.
    pub fn storage(mut self, storage: impl SlotStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Restore or seed the state and build the [`MarketStore`].
    ///
    /// An absent, corrupt, or unreadable slot never fails the open: the
    /// store starts from the seed instead. An unreadable slot also starts
    /// the store degraded.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] only if a [`seed_file`](MarketStoreBuilder::seed_file)
    /// was configured and cannot be loaded.
    pub fn open(self) -> Result<MarketStore, SeedError> {
        let seed = match self.seed_file {
            Some(path) => Seed::from_path(path)?,
            None => self.seed.unwrap_or_default(),
        };

        let storage = match self.storage {
            Some(storage) => storage,
            None => {
                let base_dir = self
                    .base_dir
                    .unwrap_or_else(|| std::env::temp_dir().join("datacoop"));
                Box::new(FileSlotStorage::new(base_dir))
            }
        };

        let (state, degraded) = match load_snapshot(storage.as_ref(), &self.namespace) {
            Ok(Some(state)) => {
                tracing::debug!(namespace = %self.namespace, "restored persisted snapshot");
                (state, false)
            }
            Ok(None) => {
                tracing::debug!(namespace = %self.namespace, "no usable snapshot; seeding");
                (seed.into_state(), false)
            }
            Err(e) => {
                tracing::warn!(
                    namespace = %self.namespace,
                    error = %e,
                    "snapshot slot unreadable; seeding in memory"
                );
                (seed.into_state(), true)
            }
        };

        let state = Arc::new(state);
        let (watch_tx, _) = tokio::sync::watch::channel(Arc::clone(&state));

        tracing::info!(
            namespace = %self.namespace,
            bundles = state.bundles.len(),
            cart = state.cart.len(),
            "store opened"
        );

        Ok(MarketStore {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                storage,
                namespace: self.namespace,
                subscribers: Mutex::new(Vec::new()),
                delivery: Mutex::new(Delivery::default()),
                next_subscription: AtomicU64::new(0),
                degraded: AtomicBool::new(degraded),
                watch_tx,
            }),
        })
    }
}
