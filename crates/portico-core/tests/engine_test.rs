#![allow(clippy::unwrap_used)]
// Engine tests: ResourceQuery, Controller and modals against a scripted
// in-memory backend. Gates hold individual responses back so tests can
// force arrival order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::{Notify, oneshot};
use url::Url;

use portico_api::Page;
use portico_core::list::RequestParams;
use portico_core::modal::Invalidate;
use portico_core::{
    Announcement, AuthCredentials, Backend, Command, CommandResult, ConfirmModal,
    ConnectionConfig, Controller, CoreError, EntityId, FilterState, FilterValue, FormModal,
    ListStore, Mutation, ResourceQuery, RowAction, Transition, run_mutation,
};
use portico_core::ResourceKind;

// ── Scripted backend ────────────────────────────────────────────────

#[derive(Default)]
struct Scripted {
    /// Canonical query of every list call, in arrival order.
    calls: Mutex<Vec<String>>,
    called: Notify,
    /// Responses for these search terms wait for the paired sender.
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    /// Records served when no search term is set.
    total: u64,
    mutations: Mutex<Vec<Mutation>>,
    reject_writes: bool,
}

impl Scripted {
    fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    fn gate(&self, term: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(term.to_owned(), rx);
        tx
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn mutation_count(&self) -> usize {
        self.mutations.lock().unwrap().len()
    }
}

fn record(id: u64, title: &str) -> Value {
    json!({ "id": id, "title": title, "content": "c", "category": "General" })
}

impl Backend for Scripted {
    fn list<'a>(
        &'a self,
        _path: &'a str,
        params: &'a RequestParams,
    ) -> BoxFuture<'a, Result<Page<Value>, CoreError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(params.canonical_query());
            self.called.notify_one();

            let Some(term) = params.get("SearchTerm").map(str::to_owned) else {
                let page: u64 = params.get("PageNumber").unwrap().parse().unwrap();
                let size: u64 = params.get("PageSize").unwrap().parse().unwrap();
                let first = (page - 1) * size + 1;
                let last = (page * size).min(self.total);
                let items = (first..=last).map(|n| record(n, &format!("Item {n}"))).collect();
                return Ok(Page {
                    items,
                    total_items: self.total,
                });
            };

            let gate = self.gates.lock().unwrap().remove(&term);
            if let Some(gate) = gate {
                gate.await.unwrap();
            }
            if term == "boom" {
                return Err(CoreError::Api {
                    message: "upstream exploded".into(),
                    code: None,
                    status: Some(500),
                });
            }
            Ok(Page {
                items: vec![record(1, &term)],
                total_items: 1,
            })
        })
    }

    fn get<'a>(
        &'a self,
        _path: &'a str,
        id: &'a EntityId,
    ) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move {
            if id.to_string() == "404" {
                return Err(CoreError::Api {
                    message: "Not Found".into(),
                    code: None,
                    status: Some(404),
                });
            }
            Ok(record(7, "Seven"))
        })
    }

    fn mutate<'a>(
        &'a self,
        _path: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, Result<Option<Value>, CoreError>> {
        Box::pin(async move {
            self.mutations.lock().unwrap().push(mutation.clone());
            if self.reject_writes {
                let mut field_errors = portico_api::FieldErrors::new();
                field_errors.insert("title".into(), vec!["Title already used".into()]);
                return Err(CoreError::ValidationFailed {
                    message: "Title already used".into(),
                    field_errors,
                });
            }
            Ok(None)
        })
    }
}

#[derive(Default)]
struct CountingInvalidate(AtomicUsize);

impl Invalidate for CountingInvalidate {
    fn invalidate(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.0.fetch_add(1, Ordering::SeqCst);
        })
    }
}

impl CountingInvalidate {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn config() -> ConnectionConfig {
    ConnectionConfig::new(
        Url::parse("http://portico.test/api").unwrap(),
        AuthCredentials::Anonymous,
    )
}

fn query(backend: &Arc<Scripted>) -> ResourceQuery<Announcement> {
    let backend: Arc<dyn Backend> = backend.clone();
    ResourceQuery::new(backend, Arc::new(ListStore::default()), Duration::from_secs(30))
}

fn search(term: &str) -> FilterState {
    FilterState::new().with("Search", FilterValue::text(term))
}

fn titles(query: &ResourceQuery<Announcement>) -> Vec<String> {
    query
        .snapshot()
        .items
        .iter()
        .map(|a| a.title.clone())
        .collect()
}

async fn connected(backend: Arc<Scripted>) -> Controller {
    let controller = Controller::with_backend(config(), backend);
    controller.connect().await.unwrap();
    controller
}

// ── Query: fetch and cache ──────────────────────────────────────────

#[tokio::test]
async fn test_first_sync_publishes_page() {
    let backend = Arc::new(Scripted::with_total(12));
    let q = query(&backend);

    q.sync().await;

    let snap = q.snapshot();
    assert_eq!(snap.items.len(), 10);
    assert_eq!(snap.total_count, 12);
    assert!(!snap.is_loading);
    assert!(snap.error.is_none());
    assert_eq!(snap.params.get("PageNumber"), Some("1"));
}

#[tokio::test]
async fn test_late_response_for_old_key_is_not_shown() {
    let backend = Arc::new(Scripted::default());
    let q = query(&backend);
    let release_k1 = backend.gate("k1");

    q.patch_filters(search("k1"));
    let slow = tokio::spawn({
        let q = q.clone();
        async move { q.sync().await }
    });
    backend.called.notified().await;

    q.patch_filters(search("k2"));
    q.sync().await;
    assert_eq!(titles(&q), vec!["k2"]);

    release_k1.send(()).unwrap();
    slow.await.unwrap();
    assert_eq!(titles(&q), vec!["k2"], "k1 arrived late and must not win");

    // The late response still filled its own cache slot.
    q.patch_filters(search("k1"));
    q.sync().await;
    assert_eq!(titles(&q), vec!["k1"]);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_identical_keys_share_one_fetch() {
    let backend = Arc::new(Scripted::default());
    let q = query(&backend);
    let release = backend.gate("same");
    q.patch_filters(search("same"));

    let a = q.clone();
    let b = q.clone();
    tokio::join!(a.sync(), b.sync(), async move {
        tokio::task::yield_now().await;
        release.send(()).unwrap();
    });

    assert_eq!(backend.call_count(), 1);
    assert_eq!(titles(&q), vec!["same"]);
}

#[tokio::test(start_paused = true)]
async fn test_cache_is_fresh_until_ttl_then_revalidates() {
    let backend = Arc::new(Scripted::with_total(3));
    let q = query(&backend);

    q.sync().await;
    q.sync().await;
    assert_eq!(backend.call_count(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    q.sync().await;
    assert_eq!(backend.call_count(), 2);
    assert!(!q.snapshot().is_loading);
}

#[tokio::test]
async fn test_fetch_failure_empties_the_table() {
    let backend = Arc::new(Scripted::with_total(4));
    let q = query(&backend);
    q.sync().await;
    assert_eq!(q.snapshot().items.len(), 4);

    q.patch_filters(search("boom"));
    q.sync().await;

    let snap = q.snapshot();
    assert!(snap.items.is_empty());
    assert_eq!(snap.total_count, 0);
    assert!(!snap.is_loading);
    assert_eq!(
        snap.error.as_deref().and_then(CoreError::remote_message),
        Some("upstream exploded")
    );
    assert_eq!(backend.call_count(), 2, "failures are not retried");
}

#[tokio::test]
async fn test_invalidate_marks_every_key_stale() {
    let backend = Arc::new(Scripted::default());
    let q = query(&backend);

    q.patch_filters(search("a"));
    q.sync().await;
    q.patch_filters(search("b"));
    q.sync().await;
    assert_eq!(backend.call_count(), 2);

    q.invalidate().await;
    assert_eq!(backend.call_count(), 3, "current key refetched");

    q.patch_filters(search("a"));
    q.sync().await;
    assert_eq!(backend.call_count(), 4, "stale key revalidated");
    assert_eq!(titles(&q), vec!["a"]);
}

#[tokio::test]
async fn test_blank_search_never_reaches_the_backend() {
    let backend = Arc::new(Scripted::with_total(1));
    let q = query(&backend);
    q.patch_filters(search("   "));
    q.sync().await;

    let calls = backend.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["PageNumber=1&PageSize=10".to_owned()]);
}

#[tokio::test]
async fn test_auto_sync_follows_store_changes() {
    let backend = Arc::new(Scripted::with_total(2));
    let q = query(&backend);
    let mut updates = q.subscribe();
    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = q.spawn_auto_sync(cancel.clone());

    loop {
        let snap = updates.changed().await.unwrap();
        if !snap.is_loading && snap.total_count == 2 {
            break;
        }
    }

    q.patch_filters(search("parks"));
    loop {
        let snap = updates.changed().await.unwrap();
        if !snap.is_loading && snap.items.first().is_some_and(|a| a.title == "parks") {
            break;
        }
    }

    cancel.cancel();
    handle.await.unwrap();
}

// ── Controller ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_requires_connection() {
    let controller = Controller::with_backend(config(), Arc::new(Scripted::default()));
    let result = controller
        .execute(Command::new(
            ResourceKind::News,
            Mutation::Delete {
                id: EntityId::from(1),
            },
        ))
        .await;
    assert!(matches!(result, Err(CoreError::ControllerDisconnected)));
}

#[tokio::test]
async fn test_unsupported_transition_never_reaches_backend() {
    let backend = Arc::new(Scripted::default());
    let controller = connected(backend.clone()).await;

    let result = controller
        .execute(Command::new(
            ResourceKind::Violations,
            Mutation::Transition {
                id: EntityId::from(2),
                transition: Transition::Pin { order: 1 },
            },
        ))
        .await;

    assert!(matches!(result, Err(CoreError::Unsupported { .. })), "{result:?}");
    assert_eq!(backend.mutation_count(), 0);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_fetch_all_walks_every_page() {
    let backend = Arc::new(Scripted::with_total(23));
    let controller = connected(backend.clone()).await;

    let all: Vec<Announcement> = controller
        .fetch_all(&RequestParams::default(), 10)
        .await
        .unwrap();

    assert_eq!(all.len(), 23);
    assert_eq!(all[22].title, "Item 23");
    assert_eq!(backend.call_count(), 3);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_get_labels_not_found() {
    let controller = connected(Arc::new(Scripted::default())).await;

    let found: Announcement = controller.get(&EntityId::from(7)).await.unwrap();
    assert_eq!(found.title, "Seven");

    let err = controller
        .get::<Announcement>(&EntityId::from(404))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, CoreError::NotFound { entity_type, .. } if entity_type == "announcement"),
        "{err:?}"
    );
    controller.disconnect().await;
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_mutation_invalidates_once_and_closes() {
    let backend = Arc::new(Scripted::default());
    let controller = connected(backend.clone()).await;
    let counter = CountingInvalidate::default();

    let mut modal = FormModal::<Announcement>::new();
    modal.open_create();
    modal.set_field("title", "Water main repair").unwrap();
    modal.set_field("content", "Expect low pressure").unwrap();
    let note = modal.submit(&controller, &counter).await;

    assert!(!note.is_error(), "{note:?}");
    assert_eq!(counter.count(), 1);
    assert!(!modal.is_open());
    assert_eq!(backend.mutation_count(), 1);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_failed_mutation_keeps_modal_open_without_invalidating() {
    let backend = Arc::new(Scripted::rejecting());
    let controller = connected(backend.clone()).await;
    let counter = CountingInvalidate::default();

    let mut modal = FormModal::<Announcement>::new();
    modal.open_create();
    modal.set_field("title", "Duplicate").unwrap();
    modal.set_field("content", "x").unwrap();
    let note = modal.submit(&controller, &counter).await;

    assert!(note.is_error());
    assert_eq!(note.message, "Title already used");
    assert_eq!(counter.count(), 0);
    assert!(modal.is_open());
    assert_eq!(modal.error("title"), Some("Title already used"));
    controller.disconnect().await;
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let backend = Arc::new(Scripted::default());
    let controller = connected(backend.clone()).await;
    let counter = CountingInvalidate::default();

    let mut modal = FormModal::<Announcement>::new();
    modal.open_create();
    let note = modal.submit(&controller, &counter).await;

    assert!(note.is_error());
    assert_eq!(backend.mutation_count(), 0);
    assert_eq!(counter.count(), 0);
    assert!(modal.is_open());
    controller.disconnect().await;
}

#[tokio::test]
async fn test_unpinned_submit_sends_zero_order() {
    let backend = Arc::new(Scripted::default());
    let controller = connected(backend.clone()).await;
    let existing: Announcement = serde_json::from_value(json!({
        "id": 5, "title": "Pinned", "content": "c", "category": "General",
        "isPinned": true, "pinnedOrder": 3
    }))
    .unwrap();

    let mut modal = FormModal::<Announcement>::new();
    modal.open_edit(&existing);
    modal.set_field("isPinned", "false").unwrap();
    modal.submit(&controller, &CountingInvalidate::default()).await;

    let sent = backend.mutations.lock().unwrap().clone();
    let [Mutation::Update { id, body }] = sent.as_slice() else {
        panic!("expected one update, got {sent:?}");
    };
    assert_eq!(id, &EntityId::from(5));
    assert_eq!(body["isPinned"], json!(false));
    assert_eq!(body["pinnedOrder"], json!(0));
    controller.disconnect().await;
}

#[tokio::test]
async fn test_confirm_modal_runs_transition_and_refreshes_query() {
    let backend = Arc::new(Scripted::with_total(1));
    let controller = connected(backend.clone()).await;
    let q: ResourceQuery<Announcement> = controller.query().await.unwrap();
    q.sync().await;
    let row = q.snapshot().items[0].clone();

    let mut confirm = ConfirmModal::for_record(&row, RowAction::Archive).unwrap();
    let note = confirm.submit(&controller, &q).await;

    assert_eq!(note.message, "Announcement archived.");
    assert!(!confirm.is_open());
    assert_eq!(backend.call_count(), 2, "query refetched after the write");
    controller.disconnect().await;
}

#[tokio::test]
async fn test_run_mutation_returns_server_result() {
    let backend = Arc::new(Scripted::default());
    let controller = connected(backend.clone()).await;
    let counter = CountingInvalidate::default();

    let result = run_mutation(
        &controller,
        ResourceKind::Roles,
        Mutation::Delete {
            id: EntityId::from(4),
        },
        &counter,
    )
    .await
    .unwrap();

    assert_eq!(result, CommandResult::Ok);
    assert_eq!(counter.count(), 1);
    controller.disconnect().await;
}
