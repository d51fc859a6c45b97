//! A write-through cache of backend lists that refetches after every write.
//!
//! Writes are applied to the cached value straight away so the page reflects
//! them, then an authoritative refetch replaces the optimistic value. Every
//! refetch takes a [Ticket] when it starts, and its result is only stored if
//! no write or newer refetch happened since. A slow, stale response can
//! therefore never overwrite newer state.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{Error, backend::BackendError, debounce::Debouncer};

/// How long to wait after the last write before refetching.
pub const REFRESH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Identifies the refetch that took it, see [WriteThroughCache::begin_refresh].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Entry<T> {
    value: Option<T>,
    generation: u64,
}

/// Holds the last known value of a backend list.
#[derive(Debug)]
pub struct WriteThroughCache<T> {
    entry: Mutex<Entry<T>>,
}

impl<T> Default for WriteThroughCache<T> {
    fn default() -> Self {
        Self {
            entry: Mutex::new(Entry {
                value: None,
                generation: 0,
            }),
        }
    }
}

impl<T: Clone> WriteThroughCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entry<T>>, Error> {
        self.entry.lock().map_err(|error| {
            tracing::error!("could not acquire the cache lock: {error}");
            Error::CacheLockError
        })
    }

    /// The cached value, or `None` if nothing has been fetched yet.
    pub fn get(&self) -> Result<Option<T>, Error> {
        Ok(self.lock()?.value.clone())
    }

    /// Start a refetch. Pass the returned ticket to [WriteThroughCache::reconcile]
    /// together with the fetched value.
    pub fn begin_refresh(&self) -> Result<Ticket, Error> {
        let mut entry = self.lock()?;
        entry.generation += 1;

        Ok(Ticket(entry.generation))
    }

    /// Store `fresh` if nothing happened to the cache since `ticket` was taken.
    ///
    /// Returns whether `fresh` was stored.
    pub fn reconcile(&self, ticket: Ticket, fresh: T) -> Result<bool, Error> {
        let mut entry = self.lock()?;

        if ticket.0 != entry.generation {
            tracing::debug!(
                "dropping stale refetch {}, the cache is at {}",
                ticket.0,
                entry.generation
            );
            return Ok(false);
        }

        entry.value = Some(fresh);

        Ok(true)
    }

    /// Apply a write the backend has accepted to the cached value.
    ///
    /// Refetches started before this call are treated as stale. Nothing is
    /// changed if the cache is still empty.
    pub fn apply_optimistic(&self, update: impl FnOnce(&mut T)) -> Result<(), Error> {
        let mut entry = self.lock()?;
        entry.generation += 1;

        if let Some(value) = entry.value.as_mut() {
            update(value);
        }

        Ok(())
    }

    /// Refetch with `fetch` and store the result unless it went stale.
    ///
    /// Returns the freshest value known once the fetch completes: the fetched
    /// value, or whatever newer value replaced it in the meantime.
    ///
    /// # Errors
    ///
    /// Returns [Error::Backend] if the fetch fails, leaving the cache as it was.
    pub async fn refresh<F>(&self, fetch: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let ticket = self.begin_refresh()?;
        let fresh = fetch.await?;

        if self.reconcile(ticket, fresh.clone())? {
            return Ok(fresh);
        }

        Ok(self.get()?.unwrap_or(fresh))
    }

    /// The cached value, fetching it with `fetch` first if the cache is empty.
    pub async fn get_or_refresh<F>(&self, fetch: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        match self.get()? {
            Some(value) => Ok(value),
            None => self.refresh(fetch).await,
        }
    }
}

/// A [WriteThroughCache] with a background task that refetches it once writes
/// have settled.
#[derive(Debug, Clone)]
pub struct RefreshingCache<T> {
    cache: Arc<WriteThroughCache<T>>,
    refresher: Debouncer<()>,
}

impl<T: Clone + Send + 'static> RefreshingCache<T> {
    /// Create an empty cache and spawn its refresh task on the current tokio
    /// runtime.
    ///
    /// `fetch` is called at most once per burst of
    /// [RefreshingCache::request_refresh] calls, `window` after the last one.
    /// Failed refetches are logged and leave the cache as it was.
    pub fn spawn<F, Fut>(window: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        let cache = Arc::new(WriteThroughCache::new());
        let task_cache = cache.clone();

        let refresher = Debouncer::spawn(window, move |()| {
            let cache = task_cache.clone();
            let request = fetch();

            async move {
                if let Err(error) = cache.refresh(request).await {
                    tracing::warn!("background refetch failed: {error}");
                }
            }
        });

        Self { cache, refresher }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &WriteThroughCache<T> {
        &self.cache
    }

    /// Schedule a background refetch.
    pub fn request_refresh(&self) {
        self.refresher.push(());
    }

    /// Apply an accepted write and schedule a refetch to confirm it.
    pub fn write_through(&self, update: impl FnOnce(&mut T)) -> Result<(), Error> {
        self.cache.apply_optimistic(update)?;
        self.request_refresh();

        Ok(())
    }
}
