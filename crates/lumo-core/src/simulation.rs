// ── Offline simulation store ──
//
// An in-memory bridge for demo mode and tests. Reads answer after a
// configurable latency with the current dataset; writes mutate that
// dataset so later reads reflect them. Every accepted write is logged.
// Data is held in wire form so demo reads go through the same
// conversions as live ones.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use lumo_api::bridge::models::{
    ColorState, ColorTemperature, DeviceResource, Dimming, DimmingUpdate, LightResource,
    LightStateUpdate, Metadata, MirekValue, OnState, ResourceRef, RoomResource, SceneAction,
    SceneResource, XyPoint,
};

use crate::error::CoreError;

/// A write accepted by the simulation store.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedWrite {
    Light {
        light_id: String,
        update: LightStateUpdate,
    },
    SceneRecall {
        scene_id: String,
    },
}

impl SimulatedWrite {
    pub fn light_id(&self) -> Option<&str> {
        match self {
            Self::Light { light_id, .. } => Some(light_id),
            Self::SceneRecall { .. } => None,
        }
    }
}

/// The full resource set served by a [`SimulationStore`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedHome {
    pub lights: Vec<LightResource>,
    pub rooms: Vec<RoomResource>,
    pub scenes: Vec<SceneResource>,
    pub devices: Vec<DeviceResource>,
}

struct State {
    home: SimulatedHome,
    writes: Vec<SimulatedWrite>,
}

pub struct SimulationStore {
    latency: Duration,
    unreachable: AtomicBool,
    state: Mutex<State>,
}

impl SimulationStore {
    pub fn new(home: SimulatedHome, latency: Duration) -> Self {
        Self {
            latency,
            unreachable: AtomicBool::new(false),
            state: Mutex::new(State {
                home,
                writes: Vec::new(),
            }),
        }
    }

    /// Make every subsequent read fail as if the bridge went away.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    async fn read<T>(&self, f: impl FnOnce(&SimulatedHome) -> T) -> Result<T, CoreError> {
        tokio::time::sleep(self.latency).await;
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CoreError::unreachable("demo"));
        }
        let state = self.state.lock().await;
        Ok(f(&state.home))
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn lights(&self) -> Result<Vec<LightResource>, CoreError> {
        self.read(|h| h.lights.clone()).await
    }

    pub async fn rooms(&self) -> Result<Vec<RoomResource>, CoreError> {
        self.read(|h| h.rooms.clone()).await
    }

    pub async fn scenes(&self) -> Result<Vec<SceneResource>, CoreError> {
        self.read(|h| h.scenes.clone()).await
    }

    pub async fn devices(&self) -> Result<Vec<DeviceResource>, CoreError> {
        self.read(|h| h.devices.clone()).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn update_light(
        &self,
        light_id: &str,
        update: &LightStateUpdate,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        let light = state
            .home
            .lights
            .iter_mut()
            .find(|l| l.id == light_id)
            .ok_or_else(|| CoreError::LightNotFound {
                identifier: light_id.to_owned(),
            })?;

        apply_state(light, update);
        debug!(light_id, "simulated light write");
        state.writes.push(SimulatedWrite::Light {
            light_id: light_id.to_owned(),
            update: update.clone(),
        });
        Ok(())
    }

    /// Recall a scene: apply each of its actions to the target lights.
    pub async fn recall_scene(&self, scene_id: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        let actions = state
            .home
            .scenes
            .iter()
            .find(|s| s.id == scene_id)
            .map(|s| s.actions.clone())
            .ok_or_else(|| CoreError::SceneNotFound {
                identifier: scene_id.to_owned(),
            })?;

        for action in &actions {
            if let Some(light) = state
                .home
                .lights
                .iter_mut()
                .find(|l| l.id == action.target.rid)
            {
                apply_state(light, &action.action);
            }
        }
        debug!(scene_id, actions = actions.len(), "simulated scene recall");
        state.writes.push(SimulatedWrite::SceneRecall {
            scene_id: scene_id.to_owned(),
        });
        Ok(())
    }

    /// Every accepted write, oldest first.
    pub async fn writes(&self) -> Vec<SimulatedWrite> {
        self.state.lock().await.writes.clone()
    }
}

/// Overlay a wire update onto a stored light, keeping colour modes exclusive.
fn apply_state(light: &mut LightResource, update: &LightStateUpdate) {
    if let Some(on) = update.on {
        light.on = on;
    }
    if let Some(DimmingUpdate { brightness }) = update.dimming {
        light.dimming = Some(Dimming {
            brightness,
            min_dim_level: light.dimming.and_then(|d| d.min_dim_level),
        });
    }
    if let Some(color) = update.color {
        light.color = Some(color);
        if let Some(ct) = light.color_temperature.as_mut() {
            ct.mirek = None;
            ct.mirek_valid = false;
        }
    }
    if let Some(MirekValue { mirek }) = update.color_temperature {
        light.color_temperature = Some(ColorTemperature {
            mirek: Some(mirek),
            mirek_valid: true,
        });
    }
}

// ── Demo dataset ─────────────────────────────────────────────────────

fn meta(name: &str, archetype: Option<&str>) -> Metadata {
    Metadata {
        name: name.to_owned(),
        archetype: archetype.map(str::to_owned),
    }
}

fn xy_light(
    id: &str,
    name: &str,
    archetype: &str,
    on: bool,
    bri: f64,
    x: f64,
    y: f64,
) -> LightResource {
    LightResource {
        id: id.to_owned(),
        metadata: meta(name, Some(archetype)),
        on: OnState { on },
        dimming: Some(Dimming {
            brightness: bri,
            min_dim_level: None,
        }),
        color: Some(ColorState { xy: XyPoint { x, y } }),
        color_temperature: Some(ColorTemperature {
            mirek: None,
            mirek_valid: false,
        }),
    }
}

fn ct_light(
    id: &str,
    name: &str,
    archetype: &str,
    on: bool,
    bri: f64,
    mirek: u16,
) -> LightResource {
    LightResource {
        id: id.to_owned(),
        metadata: meta(name, Some(archetype)),
        on: OnState { on },
        dimming: Some(Dimming {
            brightness: bri,
            min_dim_level: None,
        }),
        color: None,
        color_temperature: Some(ColorTemperature {
            mirek: Some(mirek),
            mirek_valid: true,
        }),
    }
}

fn device(id: &str, name: &str, archetype: &str, services: &[(&str, &str)]) -> DeviceResource {
    DeviceResource {
        id: id.to_owned(),
        metadata: meta(name, Some(archetype)),
        services: services
            .iter()
            .map(|(rid, rtype)| ResourceRef::new(*rid, *rtype))
            .collect(),
    }
}

fn room(id: &str, name: &str, archetype: &str, devices: &[&str]) -> RoomResource {
    RoomResource {
        id: id.to_owned(),
        metadata: meta(name, Some(archetype)),
        children: devices
            .iter()
            .map(|d| ResourceRef::new(*d, "device"))
            .collect(),
    }
}

fn scene_action(light_id: &str, brightness: f64, color: SceneColor) -> SceneAction {
    let (color, color_temperature) = match color {
        SceneColor::Xy(x, y) => (Some(ColorState { xy: XyPoint { x, y } }), None),
        SceneColor::Mirek(mirek) => (None, Some(MirekValue { mirek })),
    };
    SceneAction {
        target: ResourceRef::new(light_id, "light"),
        action: LightStateUpdate {
            on: Some(OnState { on: true }),
            dimming: Some(DimmingUpdate { brightness }),
            color,
            color_temperature,
        },
    }
}

#[derive(Clone, Copy)]
enum SceneColor {
    Xy(f64, f64),
    Mirek(u16),
}

fn scene(id: &str, name: &str, room_id: &str, actions: Vec<SceneAction>) -> SceneResource {
    SceneResource {
        id: id.to_owned(),
        metadata: meta(name, None),
        group: ResourceRef::new(room_id, "room"),
        actions,
    }
}

impl SimulatedHome {
    /// Five lights in three rooms, reached through devices.
    pub fn demo() -> Self {
        Self {
            lights: vec![
                xy_light("l1", "Living Room Strip", "hue_lightstrip", true, 75.0, 0.45, 0.41),
                xy_light("l2", "Living Room Bloom", "hue_bloom", true, 50.0, 0.17, 0.04),
                ct_light("l3", "Kitchen Ceiling 1", "ceiling_round", false, 100.0, 300),
                ct_light("l4", "Kitchen Ceiling 2", "ceiling_round", false, 100.0, 300),
                xy_light("l5", "Bedroom Lamp", "hue_go", true, 30.0, 0.5, 0.2),
            ],
            rooms: vec![
                room("r1", "Living Room", "living_room", &["d1", "d2"]),
                room("r2", "Kitchen", "kitchen", &["d3", "d4"]),
                room("r3", "Bedroom", "bedroom", &["d5"]),
            ],
            scenes: vec![
                scene(
                    "s1",
                    "Relax",
                    "r1",
                    vec![
                        scene_action("l1", 56.0, SceneColor::Mirek(447)),
                        scene_action("l2", 56.0, SceneColor::Mirek(447)),
                    ],
                ),
                scene(
                    "s2",
                    "Concentrate",
                    "r2",
                    vec![
                        scene_action("l3", 100.0, SceneColor::Mirek(233)),
                        scene_action("l4", 100.0, SceneColor::Mirek(233)),
                    ],
                ),
                scene(
                    "s3",
                    "Arctic Aurora",
                    "r1",
                    vec![
                        scene_action("l1", 80.0, SceneColor::Xy(0.17, 0.21)),
                        scene_action("l2", 60.0, SceneColor::Xy(0.15, 0.07)),
                    ],
                ),
            ],
            devices: vec![
                device("d0", "Hue Bridge", "bridge_v2", &[("b0", "bridge")]),
                device(
                    "d1",
                    "Living Room Strip",
                    "hue_lightstrip",
                    &[("l1", "light"), ("z1", "zigbee_connectivity")],
                ),
                device(
                    "d2",
                    "Living Room Bloom",
                    "hue_bloom",
                    &[("l2", "light"), ("z2", "zigbee_connectivity")],
                ),
                device("d3", "Kitchen Ceiling 1", "ceiling_round", &[("l3", "light")]),
                device("d4", "Kitchen Ceiling 2", "ceiling_round", &[("l4", "light")]),
                device("d5", "Bedroom Lamp", "hue_go", &[("l5", "light")]),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CONNECTIVITY_MESSAGE;
    use pretty_assertions::assert_eq;

    fn store() -> SimulationStore {
        SimulationStore::new(SimulatedHome::demo(), Duration::from_millis(600))
    }

    #[tokio::test(start_paused = true)]
    async fn reads_wait_for_latency() {
        let store = store();
        let start = tokio::time::Instant::now();
        let lights = store.lights().await.unwrap();
        assert_eq!(lights.len(), 5);
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn reads_reflect_prior_writes() {
        let store = store();
        let update = LightStateUpdate {
            on: Some(OnState { on: true }),
            ..Default::default()
        };
        store.update_light("l3", &update).await.unwrap();

        let lights = store.lights().await.unwrap();
        let l3 = lights.iter().find(|l| l.id == "l3").unwrap();
        assert!(l3.on.on);
        assert_eq!(store.writes().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn xy_write_invalidates_mirek() {
        let store = store();
        let update = LightStateUpdate {
            color: Some(ColorState {
                xy: XyPoint { x: 0.67, y: 0.32 },
            }),
            ..Default::default()
        };
        store.update_light("l3", &update).await.unwrap();

        let lights = store.lights().await.unwrap();
        let ct = lights[2].color_temperature.unwrap();
        assert!(!ct.mirek_valid);
        assert_eq!(lights[2].color.unwrap().xy.x, 0.67);
    }

    #[tokio::test(start_paused = true)]
    async fn scene_recall_applies_actions() {
        let store = store();
        store.recall_scene("s2").await.unwrap();

        let lights = store.lights().await.unwrap();
        for id in ["l3", "l4"] {
            let light = lights.iter().find(|l| l.id == id).unwrap();
            assert!(light.on.on);
            assert_eq!(light.color_temperature.unwrap().mirek, Some(233));
        }
        assert_eq!(
            store.writes().await,
            vec![SimulatedWrite::SceneRecall {
                scene_id: "s2".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_ids_are_rejected() {
        let store = store();
        let err = store
            .update_light("nope", &LightStateUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::LightNotFound { .. }));
        assert!(matches!(
            store.recall_scene("nope").await,
            Err(CoreError::SceneNotFound { .. })
        ));
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_reads_fail_with_fixed_message() {
        let store = store();
        store.set_unreachable(true);
        let err = store.rooms().await.unwrap_err();
        assert!(err.to_string().contains(CONNECTIVITY_MESSAGE));
    }
}
