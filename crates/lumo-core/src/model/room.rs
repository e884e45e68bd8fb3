use serde::{Deserialize, Serialize};

/// Kind of a room child or device service reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Light,
    Device,
    Other,
}

impl LinkKind {
    /// Map a bridge `rtype` string.
    pub fn from_rtype(rtype: &str) -> Self {
        match rtype {
            "light" => Self::Light,
            "device" => Self::Device,
            _ => Self::Other,
        }
    }
}

/// Typed reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub kind: LinkKind,
}

impl Link {
    pub fn device(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: LinkKind::Device,
        }
    }

    pub fn light(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: LinkKind::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub archetype: Option<String>,
    /// Ordered children as reported by the bridge.
    pub children: Vec<Link>,
}

impl Room {
    /// Ids of device-typed children, in order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.children
            .iter()
            .filter(|c| c.kind == LinkKind::Device)
            .map(|c| c.id.as_str())
    }
}
