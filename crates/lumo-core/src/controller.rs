// ── Controller abstraction ──
//
// Full lifecycle management for a bridge session: connect probe,
// background polling, optimistic mutations with reconcile, and
// reactive snapshot streaming through the HomeStore.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lumo_api::PlatformFetch;

use crate::command::{Command, CommandResult};
use crate::config::BridgeConfig;
use crate::error::{CONNECTIVITY_MESSAGE, CoreError};
use crate::model::LightUpdate;
use crate::resource::ResourceClient;
use crate::simulation::SimulationStore;
use crate::store::{HomeSnapshot, HomeStore};

/// Delay before re-reading state after a scene recall; transitions take time.
pub const SCENE_RECONCILE_DELAY: Duration = Duration::from_secs(1);

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error { message: String },
}

impl ConnectionState {
    fn fetch_failed() -> Self {
        Self::Error {
            message: CONNECTIVITY_MESSAGE.into(),
        }
    }
}

/// Optional injected collaborators.
#[derive(Default, Clone)]
pub struct Collaborators {
    /// Fetch capability used for live platform transport.
    pub platform: Option<Arc<dyn PlatformFetch>>,
    /// Store served in demo mode instead of a fresh demo home.
    pub simulation: Option<Arc<SimulationStore>>,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the connection
/// lifecycle, the background poll, and the optimistic reconciler.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: BridgeConfig,
    collaborators: Collaborators,
    store: HomeStore,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    /// Child token for the current connection; cancelled on disconnect or
    /// when a new connection supersedes it.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<ResourceClient>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller. Does NOT connect; call
    /// [`connect()`](Self::connect) to probe and start polling.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_collaborators(config, Collaborators::default())
    }

    pub fn with_collaborators(config: BridgeConfig, collaborators: Collaborators) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                collaborators,
                store: HomeStore::new(),
                connection_state,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &HomeStore {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the bridge (or the demo home).
    ///
    /// Supersedes any previous connection, probes with a light fetch,
    /// runs the initial refresh, then spawns the poll task.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.stop_tasks().await;
        self.set_state(ConnectionState::Connecting);

        // Fresh child token for this connection.
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = match ResourceClient::from_config(
            config,
            self.inner.collaborators.platform.clone(),
            self.inner.collaborators.simulation.clone(),
        ) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                self.set_state(ConnectionState::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        if let Err(e) = client.lights().await {
            warn!(host = config.host_label(), error = %e, "connection probe failed");
            self.set_state(ConnectionState::fetch_failed());
            return Err(match e {
                CoreError::AuthenticationFailed { .. } => e,
                _ => CoreError::unreachable(config.host_label()),
            });
        }

        *self.inner.client.lock().await = Some(client);
        self.full_refresh().await?;
        info!(
            host = config.host_label(),
            demo = config.is_demo(),
            "connected"
        );

        if config.poll_interval_secs > 0 {
            let handle = tokio::spawn(poll_task(
                self.clone(),
                config.poll_interval_secs,
                child,
            ));
            self.inner.task_handles.lock().await.push(handle);
        }

        Ok(())
    }

    /// Disconnect: stop background tasks, drop the client, clear the
    /// snapshot, and reset to [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.stop_tasks().await;
        *self.inner.client.lock().await = None;
        self.inner.store.clear();
        self.set_state(ConnectionState::Disconnected);
        info!("disconnected");
    }

    /// Cancel the current child token and join every background task.
    async fn stop_tasks(&self) {
        // Cancel the child token (not the parent; allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let handles: Vec<JoinHandle<()>> =
            self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Re-fetch everything and replace the snapshot wholesale.
    ///
    /// On failure the state flips to `Error` with the fixed connectivity
    /// message and the previous snapshot is kept. A refresh whose
    /// connection ended while it was in flight publishes nothing.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let cancel = self.inner.cancel_child.lock().await.clone();
        let client = self.client().await?;

        let (lights, rooms, scenes, devices) = tokio::join!(
            client.lights(),
            client.rooms(),
            client.scenes(),
            client.devices(),
        );

        let result = match (lights, rooms, scenes, devices) {
            (Ok(lights), Ok(rooms), Ok(scenes), Ok(devices)) => {
                Ok(HomeSnapshot::build(lights, &rooms, scenes, devices))
            }
            (Err(e), ..) | (_, Err(e), ..) | (_, _, Err(e), _) | (.., Err(e)) => Err(e),
        };

        // Held until the outcome is published so `disconnect` cannot clear
        // the store in between.
        let current = self.inner.client.lock().await;
        let superseded = cancel.is_cancelled()
            || !current.as_ref().is_some_and(|c| Arc::ptr_eq(c, &client));
        if superseded {
            debug!("refresh outlived its connection, dropping result");
            return Err(CoreError::Disconnected);
        }

        match result {
            Ok(snapshot) => {
                debug!(
                    lights = snapshot.lights.len(),
                    rooms = snapshot.rooms.len(),
                    scenes = snapshot.scenes.len(),
                    devices = snapshot.devices.len(),
                    "refresh complete"
                );
                self.inner.store.replace(snapshot);
                self.set_state(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "refresh failed");
                self.set_state(ConnectionState::fetch_failed());
                Err(e)
            }
        }
    }

    // ── Reconciler ───────────────────────────────────────────────

    /// Optimistically merge `update` into the cached light, write it, then
    /// reconcile with a full refresh. Returns the write error, if any,
    /// once the reconcile has run.
    pub async fn update_light(
        &self,
        light_id: &str,
        update: LightUpdate,
    ) -> Result<(), CoreError> {
        let client = self.client().await?;
        if self.snapshot().light(light_id).is_none() {
            return Err(CoreError::LightNotFound {
                identifier: light_id.to_owned(),
            });
        }

        self.inner
            .store
            .apply_optimistic(&[light_id.to_owned()], &update);

        let write = client.write(light_id, &update).await;
        if let Err(ref e) = write {
            warn!(light_id = %light_id, error = %e, "light write failed");
        }

        self.reconcile().await;
        write
    }

    /// Apply the same update to several lights: optimistic overlay,
    /// concurrent writes, one reconcile after all of them settle.
    /// Individual write failures are logged, not surfaced.
    pub async fn update_lights(
        &self,
        light_ids: &[String],
        update: LightUpdate,
    ) -> Result<usize, CoreError> {
        let client = self.client().await?;

        self.inner.store.apply_optimistic(light_ids, &update);

        let writes = light_ids.iter().map(|id| {
            let client = Arc::clone(&client);
            async move { (id, client.write(id, &update).await) }
        });
        for (id, result) in join_all(writes).await {
            if let Err(e) = result {
                warn!(light_id = %id, error = %e, "light write failed");
            }
        }

        self.reconcile().await;
        Ok(light_ids.len())
    }

    /// Switch every light in a room on or off. Returns the number of
    /// lights targeted.
    pub async fn toggle_room(&self, room_id: &str, on: bool) -> Result<usize, CoreError> {
        let ids = self
            .snapshot()
            .room(room_id)
            .map(|view| view.light_ids.clone())
            .ok_or_else(|| CoreError::RoomNotFound {
                identifier: room_id.to_owned(),
            })?;

        self.update_lights(&ids, LightUpdate::power(on)).await
    }

    /// Recall a scene and schedule a one-shot reconcile shortly after.
    ///
    /// The deferred reconcile is tied to the current connection and is
    /// dropped silently if the connection ends first.
    pub async fn activate_scene(&self, scene_id: &str) -> Result<(), CoreError> {
        let client = self.client().await?;
        client.activate_scene(scene_id).await?;

        let cancel = self.inner.cancel_child.lock().await.clone();
        let controller = self.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(SCENE_RECONCILE_DELAY) => controller.reconcile().await,
            }
        });

        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        Ok(())
    }

    async fn reconcile(&self) {
        if let Err(e) = self.full_refresh().await {
            debug!(error = %e, "reconcile refresh failed");
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command. The single mutation entry point for the CLI.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        match cmd {
            Command::SetLight { light_id, update } => {
                self.update_light(&light_id, update).await?;
                Ok(CommandResult::Ok)
            }
            Command::SetLights { light_ids, update } => self
                .update_lights(&light_ids, update)
                .await
                .map(CommandResult::Affected),
            Command::ToggleRoom { room_id, on } => self
                .toggle_room(&room_id, on)
                .await
                .map(CommandResult::Affected),
            Command::ActivateScene { scene_id } => {
                self.activate_scene(&scene_id).await?;
                Ok(CommandResult::Ok)
            }
        }
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Polling is disabled since only a single request-response cycle
    /// is needed.
    pub async fn oneshot<F, Fut, T>(config: BridgeConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval_secs = 0;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.connection_state.borrow().clone()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<HomeSnapshot> {
        self.inner.store.current()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<HomeSnapshot>> {
        self.inner.store.subscribe()
    }

    /// The simulation store backing the current demo connection.
    pub async fn simulation(&self) -> Option<Arc<SimulationStore>> {
        self.inner
            .client
            .lock()
            .await
            .as_ref()
            .and_then(|c| c.simulation().cloned())
    }

    // ── Internals ────────────────────────────────────────────────

    async fn client(&self) -> Result<Arc<ResourceClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner.connection_state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically re-fetch everything. Failures flip the connection state
/// but never stop the loop.
async fn poll_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
