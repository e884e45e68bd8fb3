// ── Resource client ──
//
// One read/write surface over either a live bridge or the simulation
// store. The variant is fixed when the client is built; callers never
// branch on mode.

use std::sync::Arc;

use lumo_api::bridge::models::LightStateUpdate;
use lumo_api::transport::{TlsMode, TransportConfig};
use lumo_api::{BridgeClient, PlatformFetch, ProxyFetch, ResourceKind};

use crate::config::{BridgeConfig, BridgeTransport, ConnectionMode, TlsVerification};
use crate::error::CoreError;
use crate::model::{Device, Light, LightUpdate, Room, Scene};
use crate::simulation::SimulationStore;

/// Result of a kind-dispatched [`ResourceClient::fetch`].
#[derive(Debug, Clone)]
pub enum Resources {
    Lights(Vec<Light>),
    Rooms(Vec<Room>),
    Scenes(Vec<Scene>),
    Devices(Vec<Device>),
}

impl Resources {
    pub fn len(&self) -> usize {
        match self {
            Self::Lights(v) => v.len(),
            Self::Rooms(v) => v.len(),
            Self::Scenes(v) => v.len(),
            Self::Devices(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub enum ResourceClient {
    Live(BridgeClient),
    Simulated(Arc<SimulationStore>),
}

impl ResourceClient {
    /// Build the client for `config`.
    ///
    /// Demo mode uses `simulation` when given, otherwise a fresh demo home.
    /// Live platform transport uses `platform` when given, otherwise the
    /// bundled proxy.
    pub fn from_config(
        config: &BridgeConfig,
        platform: Option<Arc<dyn PlatformFetch>>,
        simulation: Option<Arc<SimulationStore>>,
    ) -> Result<Self, CoreError> {
        match &config.mode {
            ConnectionMode::Demo { latency } => Ok(Self::Simulated(simulation.unwrap_or_else(
                || {
                    Arc::new(SimulationStore::new(
                        crate::simulation::SimulatedHome::demo(),
                        *latency,
                    ))
                },
            ))),
            ConnectionMode::Live {
                host,
                app_key,
                transport,
            } => {
                let client = match transport {
                    BridgeTransport::Direct => {
                        BridgeClient::direct(host, app_key, &transport_config(config))?
                    }
                    BridgeTransport::Platform => {
                        let platform = match platform {
                            Some(p) => p,
                            None => Arc::new(ProxyFetch::new(config.timeout)?),
                        };
                        BridgeClient::via_platform(host, app_key, platform)?
                    }
                };
                Ok(Self::Live(client))
            }
        }
    }

    pub fn simulation(&self) -> Option<&Arc<SimulationStore>> {
        match self {
            Self::Simulated(store) => Some(store),
            Self::Live(_) => None,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn fetch(&self, kind: ResourceKind) -> Result<Resources, CoreError> {
        Ok(match kind {
            ResourceKind::Light => Resources::Lights(self.lights().await?),
            ResourceKind::Room => Resources::Rooms(self.rooms().await?),
            ResourceKind::Scene => Resources::Scenes(self.scenes().await?),
            ResourceKind::Device => Resources::Devices(self.devices().await?),
        })
    }

    pub async fn lights(&self) -> Result<Vec<Light>, CoreError> {
        let raw = match self {
            Self::Live(c) => c.list_lights().await?,
            Self::Simulated(s) => s.lights().await?,
        };
        Ok(raw.into_iter().map(Light::from).collect())
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, CoreError> {
        let raw = match self {
            Self::Live(c) => c.list_rooms().await?,
            Self::Simulated(s) => s.rooms().await?,
        };
        Ok(raw.into_iter().map(Room::from).collect())
    }

    pub async fn scenes(&self) -> Result<Vec<Scene>, CoreError> {
        let raw = match self {
            Self::Live(c) => c.list_scenes().await?,
            Self::Simulated(s) => s.scenes().await?,
        };
        Ok(raw.into_iter().map(Scene::from).collect())
    }

    pub async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let raw = match self {
            Self::Live(c) => c.list_devices().await?,
            Self::Simulated(s) => s.devices().await?,
        };
        Ok(raw.into_iter().map(Device::from).collect())
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn write(&self, light_id: &str, update: &LightUpdate) -> Result<(), CoreError> {
        let wire = LightStateUpdate::from(update);
        match self {
            Self::Live(c) => {
                c.update_light(light_id, &wire).await?;
            }
            Self::Simulated(s) => s.update_light(light_id, &wire).await?,
        }
        Ok(())
    }

    pub async fn activate_scene(&self, scene_id: &str) -> Result<(), CoreError> {
        match self {
            Self::Live(c) => {
                c.recall_scene(scene_id).await?;
            }
            Self::Simulated(s) => s.recall_scene(scene_id).await?,
        }
        Ok(())
    }
}

/// Build the api-level transport from core config.
pub(crate) fn transport_config(config: &BridgeConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}
