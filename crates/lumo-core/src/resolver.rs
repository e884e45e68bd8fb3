// ── Device → light resolution ──
//
// Rooms reference devices; devices expose lights as `light` services.
// The map is rebuilt from scratch on every poll and replaced wholesale.

use std::collections::HashMap;

use crate::model::Device;

/// Derived device id → light ids relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceLightMap {
    by_device: HashMap<String, Vec<String>>,
}

impl DeviceLightMap {
    /// Collect each device's light-typed services. Devices without any
    /// light service are left out.
    pub fn build(devices: &[Device]) -> Self {
        let by_device = devices
            .iter()
            .filter_map(|device| {
                let lights: Vec<String> =
                    device.light_service_ids().map(str::to_owned).collect();
                (!lights.is_empty()).then(|| (device.id.clone(), lights))
            })
            .collect();
        Self { by_device }
    }

    /// Lights exposed by `device_id`; empty when the device is unknown.
    pub fn lights_for(&self, device_id: &str) -> &[String] {
        self.by_device.get(device_id).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.by_device.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.by_device.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_device.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Link, LinkKind};
    use pretty_assertions::assert_eq;

    fn device(id: &str, services: Vec<Link>) -> Device {
        Device {
            id: id.into(),
            name: id.into(),
            archetype: None,
            services,
        }
    }

    #[test]
    fn keeps_only_light_services() {
        let map = DeviceLightMap::build(&[device(
            "d1",
            vec![
                Link::light("l1"),
                Link {
                    id: "z1".into(),
                    kind: LinkKind::Other,
                },
                Link::light("l2"),
            ],
        )]);
        assert_eq!(map.lights_for("d1"), ["l1".to_string(), "l2".to_string()]);
    }

    #[test]
    fn devices_without_lights_are_absent() {
        let map = DeviceLightMap::build(&[
            device("bridge", vec![]),
            device(
                "motion",
                vec![Link {
                    id: "m1".into(),
                    kind: LinkKind::Other,
                }],
            ),
            device("d5", vec![Link::light("l5")]),
        ]);
        assert_eq!(map.len(), 1);
        assert!(!map.contains("bridge"));
        assert!(!map.contains("motion"));
        assert!(map.lights_for("motion").is_empty());
    }
}
