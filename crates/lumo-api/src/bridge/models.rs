// Bridge CLIP v2 wire types
//
// Every resource endpoint answers with `{ "errors": [...], "data": [...] }`.
// Only the fields the client reads are modelled; unknown fields are ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Resource kinds the client reads from `/clip/v2/resource/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Light,
    Room,
    Scene,
    Device,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [Self::Light, Self::Room, Self::Scene, Self::Device];

    /// Path relative to the `/clip/v2/` base.
    pub fn path(self) -> String {
        format!("resource/{self}")
    }
}

// ── Envelope ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct BridgeResponse<T> {
    #[serde(default)]
    pub errors: Vec<BridgeErrorEntry>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeErrorEntry {
    #[serde(default)]
    pub description: String,
}

/// `{ "rid": "...", "rtype": "light" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub rid: String,
    pub rtype: String,
}

impl ResourceRef {
    pub fn new(rid: impl Into<String>, rtype: impl Into<String>) -> Self {
        Self {
            rid: rid.into(),
            rtype: rtype.into(),
        }
    }

    pub fn is(&self, kind: ResourceKind) -> bool {
        self.rtype == kind.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub archetype: Option<String>,
}

// ── Light ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightResource {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub on: OnState,
    #[serde(default)]
    pub dimming: Option<Dimming>,
    #[serde(default)]
    pub color: Option<ColorState>,
    #[serde(default)]
    pub color_temperature: Option<ColorTemperature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnState {
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    pub brightness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_dim_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorState {
    pub xy: XyPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorTemperature {
    #[serde(default)]
    pub mirek: Option<u16>,
    /// `false` while the light is in xy mode; `mirek` is then stale.
    #[serde(default)]
    pub mirek_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirekValue {
    pub mirek: u16,
}

/// Partial light state, the body of `PUT resource/light/{id}` and the
/// `action` of a scene entry. Absent fields are left untouched by the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightStateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<OnState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimming: Option<DimmingUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<MirekValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimmingUpdate {
    pub brightness: f64,
}

// ── Room / Device / Scene ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResource {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub children: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceResource {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub services: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneResource {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub group: ResourceRef,
    #[serde(default)]
    pub actions: Vec<SceneAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneAction {
    pub target: ResourceRef,
    pub action: LightStateUpdate,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn light_update_omits_absent_fields() {
        let update = LightStateUpdate {
            dimming: Some(DimmingUpdate { brightness: 40.0 }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "dimming": { "brightness": 40.0 } })
        );
    }

    #[test]
    fn light_parses_with_missing_capabilities() {
        let light: LightResource = serde_json::from_value(json!({
            "id": "abc",
            "type": "light",
            "metadata": { "name": "Plug", "archetype": "plug" },
            "on": { "on": true }
        }))
        .unwrap();
        assert!(light.dimming.is_none());
        assert!(light.color.is_none());
        assert_eq!(light.metadata.name, "Plug");
    }

    #[test]
    fn resource_kind_paths() {
        assert_eq!(ResourceKind::Light.path(), "resource/light");
        assert_eq!(ResourceKind::Device.path(), "resource/device");
        assert_eq!("room".parse::<ResourceKind>().unwrap(), ResourceKind::Room);
    }

    #[test]
    fn resource_ref_type_check() {
        let r = ResourceRef::new("l1", "light");
        assert!(r.is(ResourceKind::Light));
        assert!(!r.is(ResourceKind::Device));
    }
}
