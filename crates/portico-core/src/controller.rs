// ── Controller abstraction ──
//
// Lifecycle management for one API deployment: builds the HTTP client,
// routes writes through a command channel, and hands out per-entity list
// queries that share the same backend.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use portico_api::ResourceClient;

use crate::backend::Backend;
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::ConnectionConfig;
use crate::error::CoreError;
use crate::list::{ListStore, RequestParams};
use crate::model::EntityId;
use crate::query::{ResourceQuery, ResultSet};
use crate::resource::{Resource, decode_record};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Reads go straight to the
/// backend; writes are serialized through the command processor task.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ConnectionConfig,
    backend: Mutex<Option<Arc<dyn Backend>>>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to build the client and start the
    /// command processor.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::build(config, None)
    }

    /// Use a pre-built backend instead of an HTTP client.
    pub fn with_backend(config: ConnectionConfig, backend: Arc<dyn Backend>) -> Self {
        Self::build(config, Some(backend))
    }

    fn build(config: ConnectionConfig, backend: Option<Arc<dyn Backend>>) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                backend: Mutex::new(backend),
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Build the HTTP client (unless a backend was injected) and spawn the
    /// command processor.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let config = &self.inner.config;
        {
            let mut backend = self.inner.backend.lock().await;
            if backend.is_none() {
                let client = ResourceClient::new(
                    config.url.as_str(),
                    &config.credentials(),
                    &config.transport(),
                )
                .inspect_err(|_| {
                    self.inner
                        .connection_state
                        .send_replace(ConnectionState::Failed);
                })?;
                *backend = Some(Arc::new(client));
            }
        }

        let mut handles = self.inner.task_handles.lock().await;
        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %config.url, "connected");
        Ok(())
    }

    /// Cancel background tasks and reset to
    /// [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Token that fires on disconnect. Hand child tokens to auto-sync
    /// tasks so they stop with the controller.
    pub fn child_token(&self) -> CancellationToken {
        self.inner.cancel.child_token()
    }

    async fn backend(&self) -> Result<Arc<dyn Backend>, CoreError> {
        self.inner
            .backend
            .lock()
            .await
            .clone()
            .ok_or(CoreError::ControllerDisconnected)
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a write.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ConnectionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// A fresh list query for `R`, with its own store, cache and snapshot.
    pub async fn query<R: Resource>(&self) -> Result<ResourceQuery<R>, CoreError> {
        let store = Arc::new(ListStore::with_page_size(self.inner.config.page_size));
        self.query_with_store(store).await
    }

    /// A list query over an existing store.
    pub async fn query_with_store<R: Resource>(
        &self,
        store: Arc<ListStore>,
    ) -> Result<ResourceQuery<R>, CoreError> {
        let backend = self.backend().await?;
        Ok(ResourceQuery::new(
            backend,
            store,
            self.inner.config.cache_ttl,
        ))
    }

    /// One page, bypassing any query cache.
    pub async fn fetch_page<R: Resource>(
        &self,
        params: &RequestParams,
    ) -> Result<ResultSet<R>, CoreError> {
        let backend = self.backend().await?;
        let page = backend.list(R::KIND.path(), params).await?;
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

    /// Every page for `params`' filters and sort.
    pub async fn fetch_all<R: Resource>(
        &self,
        params: &RequestParams,
        page_size: u32,
    ) -> Result<Vec<R>, CoreError> {
        let backend = self.backend().await?;
        let path = R::KIND.path();
        let values = portico_api::client::paginate_all(page_size, |page, size| {
            let backend = Arc::clone(&backend);
            let params = params.with_page(page, size);
            async move { backend.list(path, &params).await }
        })
        .await?;
        values.into_iter().map(decode_record::<R>).collect()
    }

    pub async fn get<R: Resource>(&self, id: &EntityId) -> Result<R, CoreError> {
        let backend = self.backend().await?;
        let value = backend
            .get(R::KIND.path(), id)
            .await
            .map_err(|e| e.for_entity(R::KIND.singular(), &id.to_string()))?;
        decode_record(value)
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Process commands from the mpsc channel, routing each to the backend.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    cmd.check_supported()?;
    let backend = controller.backend().await?;
    let kind = cmd.kind;
    let verb = cmd.mutation.verb();

    debug!(entity = kind.path(), verb, target = ?cmd.mutation.target(), "command");
    let result = backend.mutate(kind.path(), &cmd.mutation).await;

    match result {
        Ok(Some(record)) => Ok(CommandResult::Record(record)),
        Ok(None) => Ok(CommandResult::Ok),
        Err(e) => {
            warn!(entity = kind.path(), verb, error = %e, "command failed");
            Err(match cmd.mutation.target() {
                Some(id) => e.for_entity(kind.singular(), &id.to_string()),
                None => e,
            })
        }
    }
}
