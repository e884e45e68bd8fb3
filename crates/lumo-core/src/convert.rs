// ── API-to-domain type conversions ──
//
// Bridges raw `lumo_api` wire types into canonical `lumo_core::model`
// types, and domain updates back into wire payloads. Colour mode follows
// `color_temperature.mirek_valid`: a valid mirek wins, otherwise xy.

use lumo_api::bridge::models::{
    ColorState, DeviceResource, DimmingUpdate, LightResource, LightStateUpdate, MirekValue,
    OnState, ResourceRef, RoomResource, SceneResource, XyPoint,
};

use crate::model::light::clamp_brightness;
use crate::model::{
    Device, Light, LightColor, LightUpdate, Link, LinkKind, Room, Scene, SceneAction, Xy,
};

// ── Helpers ────────────────────────────────────────────────────────

fn link(r: &ResourceRef) -> Link {
    Link {
        id: r.rid.clone(),
        kind: LinkKind::from_rtype(&r.rtype),
    }
}

fn light_color(resource: &LightResource) -> Option<LightColor> {
    let temperature = resource
        .color_temperature
        .filter(|ct| ct.mirek_valid)
        .and_then(|ct| ct.mirek)
        .map(|mirek| LightColor::Temperature { mirek });

    temperature.or_else(|| {
        resource
            .color
            .map(|c| LightColor::Xy(Xy::new(c.xy.x, c.xy.y)))
    })
}

// ── Resources → domain ─────────────────────────────────────────────

impl From<LightResource> for Light {
    fn from(r: LightResource) -> Self {
        let color = light_color(&r);
        Light {
            id: r.id,
            name: r.metadata.name,
            archetype: r.metadata.archetype,
            on: r.on.on,
            brightness: r.dimming.map(|d| clamp_brightness(d.brightness)),
            color,
        }
    }
}

impl From<RoomResource> for Room {
    fn from(r: RoomResource) -> Self {
        Room {
            id: r.id,
            name: r.metadata.name,
            archetype: r.metadata.archetype,
            children: r.children.iter().map(link).collect(),
        }
    }
}

impl From<DeviceResource> for Device {
    fn from(r: DeviceResource) -> Self {
        Device {
            id: r.id,
            name: r.metadata.name,
            archetype: r.metadata.archetype,
            services: r.services.iter().map(link).collect(),
        }
    }
}

impl From<SceneResource> for Scene {
    fn from(r: SceneResource) -> Self {
        Scene {
            id: r.id,
            name: r.metadata.name,
            room_id: r.group.rid,
            actions: r
                .actions
                .iter()
                .map(|a| SceneAction {
                    light_id: a.target.rid.clone(),
                    update: LightUpdate::from(&a.action),
                })
                .collect(),
        }
    }
}

// ── Updates ────────────────────────────────────────────────────────

impl From<&LightStateUpdate> for LightUpdate {
    fn from(w: &LightStateUpdate) -> Self {
        let mut update = LightUpdate::new();
        if let Some(on) = w.on {
            update = update.with_on(on.on);
        }
        if let Some(d) = w.dimming {
            update = update.with_brightness(d.brightness);
        }
        if let Some(c) = w.color {
            update = update.with_xy(Xy::new(c.xy.x, c.xy.y));
        }
        if let Some(ct) = w.color_temperature {
            update = update.with_mirek(ct.mirek);
        }
        update
    }
}

impl From<&LightUpdate> for LightStateUpdate {
    fn from(u: &LightUpdate) -> Self {
        let (color, color_temperature) = match u.color() {
            Some(LightColor::Xy(xy)) => (
                Some(ColorState {
                    xy: XyPoint { x: xy.x, y: xy.y },
                }),
                None,
            ),
            Some(LightColor::Temperature { mirek }) => (None, Some(MirekValue { mirek })),
            None => (None, None),
        };

        LightStateUpdate {
            on: u.on().map(|on| OnState { on }),
            dimming: u.brightness().map(|brightness| DimmingUpdate { brightness }),
            color,
            color_temperature,
        }
    }
}
