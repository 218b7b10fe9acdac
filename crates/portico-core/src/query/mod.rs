// ── Resource query ──
//
// Keyed, cached, deduplicated list fetching for one entity. Request
// parameters are derived from the attached `ListStore`; results are
// published through a `watch` channel as `QuerySnapshot`s.

mod stream;

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use portico_api::Page;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::list::{FilterState, ListStore, RequestParams, TableState};
use crate::resource::{Resource, decode_record};

pub use stream::{QueryStream, QueryWatchStream};

/// One decoded page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<R> {
    pub items: Arc<Vec<R>>,
    pub total_count: u64,
}

/// What a list screen renders.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<R> {
    pub items: Arc<Vec<R>>,
    pub total_count: u64,
    pub is_loading: bool,
    pub error: Option<Arc<CoreError>>,
    /// Parameters of the most recently requested fetch.
    pub params: RequestParams,
}

impl<R> Default for QuerySnapshot<R> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            total_count: 0,
            is_loading: false,
            error: None,
            params: RequestParams::default(),
        }
    }
}

type FetchOutcome<R> = Result<ResultSet<R>, Arc<CoreError>>;
type SharedFetch<R> = Shared<BoxFuture<'static, FetchOutcome<R>>>;

struct InFlight<R> {
    generation: u64,
    fetch: SharedFetch<R>,
}

struct CacheEntry<R> {
    result: ResultSet<R>,
    fetched_at: Instant,
    generation: u64,
    stale: bool,
}

impl<R: Clone> Clone for CacheEntry<R> {
    fn clone(&self) -> Self {
        Self {
            result: self.result.clone(),
            fetched_at: self.fetched_at,
            generation: self.generation,
            stale: self.stale,
        }
    }
}

/// Which key the UI currently wants, and which generation it last saw.
#[derive(Debug, Default)]
struct Requested {
    key: String,
    latest: u64,
    published: u64,
}

/// List fetcher for one entity type. Cheaply cloneable; clones share the
/// cache and published state.
pub struct ResourceQuery<R: Resource> {
    inner: Arc<QueryInner<R>>,
}

impl<R: Resource> Clone for ResourceQuery<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct QueryInner<R: Resource> {
    backend: Arc<dyn Backend>,
    store: Arc<ListStore>,
    ttl: Duration,
    cache: DashMap<String, CacheEntry<R>>,
    in_flight: DashMap<String, InFlight<R>>,
    requested: Mutex<Requested>,
    snapshot: watch::Sender<QuerySnapshot<R>>,
}

impl<R: Resource> ResourceQuery<R> {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<ListStore>, ttl: Duration) -> Self {
        let (snapshot, _) = watch::channel(QuerySnapshot::default());
        Self {
            inner: Arc::new(QueryInner {
                backend,
                store,
                ttl,
                cache: DashMap::new(),
                in_flight: DashMap::new(),
                requested: Mutex::new(Requested::default()),
                snapshot,
            }),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    pub fn store(&self) -> &Arc<ListStore> {
        &self.inner.store
    }

    pub fn snapshot(&self) -> QuerySnapshot<R> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> QueryStream<R> {
        QueryStream::new(self.inner.snapshot.subscribe())
    }

    /// Parameters the current store state derives.
    pub fn params(&self) -> RequestParams {
        let state = self.inner.store.snapshot();
        RequestParams::derive(&state.table, &state.filters, R::KIND.filter_fields())
    }

    // ── Store setters ────────────────────────────────────────────────

    pub fn set_table_data(&self, next: TableState) {
        self.inner.store.set_table_data(next);
    }

    pub fn patch_filters(&self, partial: FilterState) {
        self.inner.store.patch_filters(partial);
    }

    pub fn replace_filters(&self, next: FilterState) {
        self.inner.store.replace_filters(next);
    }

    pub fn clear_filters(&self) {
        self.inner.store.clear_filters();
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Sync the snapshot with the store's current key. Serves fresh cache
    /// entries without I/O, serves stale ones while revalidating, and
    /// joins an identical in-flight fetch instead of starting another.
    pub async fn sync(&self) {
        self.load(false).await;
    }

    /// Fetch the current key from the server even if it is cached.
    pub async fn refetch(&self) {
        self.load(true).await;
    }

    /// Mark every cached key stale, then refetch the current one.
    pub async fn invalidate(&self) {
        for mut entry in self.inner.cache.iter_mut() {
            entry.stale = true;
        }
        debug!(entity = R::KIND.path(), "query invalidated");
        self.load(true).await;
    }

    /// Run a sync on every store change until `cancel` fires. Each sync is
    /// its own task, so a slow fetch never blocks a newer one.
    pub fn spawn_auto_sync(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let query = self.clone();
        let mut rx = self.inner.store.subscribe();
        tokio::spawn(async move {
            rx.borrow_and_update();
            query.spawn_sync();
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        rx.borrow_and_update();
                        query.spawn_sync();
                    }
                }
            }
            trace!(entity = R::KIND.path(), "auto sync stopped");
        })
    }

    fn spawn_sync(&self) {
        let query = self.clone();
        tokio::spawn(async move { query.sync().await });
    }

    async fn load(&self, force: bool) {
        let params = self.params();
        let key = params.cache_key(R::KIND.path());
        let generation = self.request(&key);

        let cached = if force {
            None
        } else {
            self.inner.cache.get(&key).map(|e| e.value().clone())
        };
        match cached {
            Some(entry) => {
                let fresh = !entry.stale && entry.fetched_at.elapsed() < self.inner.ttl;
                trace!(%key, fresh, "cache hit");
                self.publish(&key, generation, &params, Ok(entry.result), !fresh);
                if fresh {
                    return;
                }
            }
            None => self.mark_loading(generation, &params),
        }

        let outcome = self.fetch(&key, &params, generation, force).await;
        self.publish(&key, generation, &params, outcome, false);
    }

    /// Record `key` as the wanted key and hand out its generation.
    fn request(&self, key: &str) -> u64 {
        let mut requested = self.lock_requested();
        requested.latest += 1;
        requested.key.clear();
        requested.key.push_str(key);
        requested.latest
    }

    fn mark_loading(&self, generation: u64, params: &RequestParams) {
        let requested = self.lock_requested();
        if requested.latest != generation {
            return;
        }
        self.inner.snapshot.send_modify(|snap| {
            snap.is_loading = true;
            snap.params = params.clone();
        });
    }

    /// Publish `outcome` if it still answers the wanted key and is not
    /// older than what is already shown. Returns whether it was shown.
    fn publish(
        &self,
        key: &str,
        generation: u64,
        params: &RequestParams,
        outcome: FetchOutcome<R>,
        revalidating: bool,
    ) -> bool {
        let mut requested = self.lock_requested();
        if requested.key != key || generation < requested.published {
            trace!(%key, generation, "discarding out-of-date result");
            return false;
        }
        requested.published = generation;
        let is_loading = revalidating || requested.latest != generation;

        let snap = match outcome {
            Ok(result) => QuerySnapshot {
                items: result.items,
                total_count: result.total_count,
                is_loading,
                error: None,
                params: params.clone(),
            },
            Err(error) => QuerySnapshot {
                items: Arc::new(Vec::new()),
                total_count: 0,
                is_loading,
                error: Some(error),
                params: params.clone(),
            },
        };
        self.inner.snapshot.send_replace(snap);
        true
    }

    fn lock_requested(&self) -> std::sync::MutexGuard<'_, Requested> {
        self.inner
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the in-flight fetch for `key`, or start one.
    fn fetch(
        &self,
        key: &str,
        params: &RequestParams,
        generation: u64,
        force: bool,
    ) -> SharedFetch<R> {
        if force {
            self.inner.in_flight.remove(key);
        }
        match self.inner.in_flight.entry(key.to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                debug!(%key, "joining in-flight fetch");
                entry.get().fetch.clone()
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let fetch = run_fetch(
                    Arc::clone(&self.inner.backend),
                    Arc::downgrade(&self.inner),
                    key.to_owned(),
                    params.clone(),
                    generation,
                )
                .boxed()
                .shared();
                entry.insert(InFlight {
                    generation,
                    fetch: fetch.clone(),
                });
                fetch
            }
        }
    }
}

impl<R: Resource> QueryInner<R> {
    /// Late responses still populate their own key, unless a newer fetch
    /// for that key already landed.
    fn store_cache(&self, key: &str, result: &ResultSet<R>, generation: u64) {
        let newer = self
            .cache
            .get(key)
            .is_some_and(|existing| existing.generation > generation);
        if newer {
            return;
        }
        self.cache.insert(
            key.to_owned(),
            CacheEntry {
                result: result.clone(),
                fetched_at: Instant::now(),
                generation,
                stale: false,
            },
        );
    }
}

async fn run_fetch<R: Resource>(
    backend: Arc<dyn Backend>,
    inner: Weak<QueryInner<R>>,
    key: String,
    params: RequestParams,
    generation: u64,
) -> FetchOutcome<R> {
    debug!(%key, "fetching");
    let outcome = backend
        .list(R::KIND.path(), &params)
        .await
        .and_then(decode_page::<R>);

    if let Err(e) = &outcome {
        warn!(%key, error = %e, "list fetch failed");
    }

    if let Some(inner) = inner.upgrade() {
        if let Ok(result) = &outcome {
            inner.store_cache(&key, result, generation);
        }
        inner
            .in_flight
            .remove_if(&key, |_, flight| flight.generation == generation);
    }

    outcome.map_err(Arc::new)
}

fn decode_page<R: Resource>(page: Page<Value>) -> Result<ResultSet<R>, CoreError> {
    let items = page
        .items
        .into_iter()
        .map(decode_record::<R>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResultSet {
        items: Arc::new(items),
        total_count: page.total_items,
    })
}
