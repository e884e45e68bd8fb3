use serde::{Deserialize, Serialize};

use super::room::{Link, LinkKind};

/// A physical device. Its `light` services are the lights it exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub archetype: Option<String>,
    pub services: Vec<Link>,
}

impl Device {
    pub fn light_service_ids(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .filter(|s| s.kind == LinkKind::Light)
            .map(|s| s.id.as_str())
    }
}
