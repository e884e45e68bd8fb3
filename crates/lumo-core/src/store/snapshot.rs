// ── Home snapshot ──
//
// One immutable view of everything fetched in a poll plus the derived
// device map and room views. Any change produces a new snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::RoomView;
use crate::model::{Device, Light, LightUpdate, Room, Scene};
use crate::resolver::DeviceLightMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeSnapshot {
    pub lights: Vec<Light>,
    pub rooms: Vec<RoomView>,
    pub scenes: Vec<Scene>,
    pub devices: Vec<Device>,
    #[serde(skip)]
    pub device_lights: DeviceLightMap,
    /// When the underlying resources were fetched. `None` for an empty store.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl HomeSnapshot {
    /// Resolve devices and aggregate rooms over freshly fetched resources.
    pub fn build(
        lights: Vec<Light>,
        rooms: &[Room],
        scenes: Vec<Scene>,
        devices: Vec<Device>,
    ) -> Self {
        let device_lights = DeviceLightMap::build(&devices);
        let rooms = rooms
            .iter()
            .map(|r| RoomView::compute(r, &device_lights, &lights))
            .collect();

        Self {
            lights,
            rooms,
            scenes,
            devices,
            device_lights,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Overlay `update` onto every light in `ids` and recompute the room
    /// aggregates. Unknown ids are skipped.
    pub fn with_overlay(&self, ids: &[String], update: &LightUpdate) -> Self {
        let mut next = self.clone();
        for light in next.lights.iter_mut().filter(|l| ids.contains(&l.id)) {
            light.apply(update);
        }
        let rooms: Vec<Room> = next.rooms.iter().map(|v| v.room.clone()).collect();
        next.rooms = rooms
            .iter()
            .map(|r| RoomView::compute(r, &next.device_lights, &next.lights))
            .collect();
        next
    }

    pub fn is_empty(&self) -> bool {
        self.fetched_at.is_none()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn light(&self, id: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&RoomView> {
        self.rooms.iter().find(|r| r.room.id == id)
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// Lights whose name contains `query` (case-insensitive). `"all"`
    /// selects every light.
    pub fn match_lights(&self, query: &str) -> Vec<&Light> {
        let needle = query.trim().to_lowercase();
        if needle == "all" {
            return self.lights.iter().collect();
        }
        self.lights
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact id, else case-insensitive exact name.
    pub fn resolve_light(&self, query: &str) -> Option<&Light> {
        self.light(query).or_else(|| {
            self.lights
                .iter()
                .find(|l| l.name.eq_ignore_ascii_case(query.trim()))
        })
    }

    /// Exact id, else case-insensitive exact name.
    pub fn resolve_room(&self, query: &str) -> Option<&RoomView> {
        self.room(query).or_else(|| {
            self.rooms
                .iter()
                .find(|r| r.room.name.eq_ignore_ascii_case(query.trim()))
        })
    }

    /// Exact id, else case-insensitive exact name.
    pub fn resolve_scene(&self, query: &str) -> Option<&Scene> {
        self.scene(query).or_else(|| {
            self.scenes
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(query.trim()))
        })
    }

    /// Scenes owned by `room_id`.
    pub fn scenes_for_room<'a>(&'a self, room_id: &'a str) -> impl Iterator<Item = &'a Scene> {
        self.scenes.iter().filter(move |s| s.room_id == room_id)
    }

    /// Display name of the room owning a scene, if known.
    pub fn room_name(&self, room_id: &str) -> Option<&str> {
        self.room(room_id).map(|v| v.room.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, Link};
    use pretty_assertions::assert_eq;

    fn light(id: &str, name: &str, on: bool) -> Light {
        Light {
            id: id.into(),
            name: name.into(),
            archetype: None,
            on,
            brightness: Some(50.0),
            color: None,
        }
    }

    fn snapshot() -> HomeSnapshot {
        HomeSnapshot::build(
            vec![
                light("l1", "Living Room Strip", false),
                light("l2", "Living Room Bloom", false),
                light("l5", "Bedroom Lamp", true),
            ],
            &[Room {
                id: "r1".into(),
                name: "Living Room".into(),
                archetype: None,
                children: vec![Link::device("d1")],
            }],
            vec![],
            vec![Device {
                id: "d1".into(),
                name: "Strip".into(),
                archetype: None,
                services: vec![Link::light("l1"), Link::light("l2")],
            }],
        )
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        let snap = snapshot();
        let names: Vec<&str> = snap
            .match_lights("living room")
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Living Room Strip", "Living Room Bloom"]);
        assert_eq!(snap.match_lights("ALL").len(), 3);
        assert!(snap.match_lights("garage").is_empty());
    }

    #[test]
    fn overlay_updates_lights_and_room_aggregates() {
        let snap = snapshot();
        assert!(!snap.room("r1").unwrap().any_on);

        let next = snap.with_overlay(&["l1".into()], &LightUpdate::power(true));
        assert!(next.light("l1").unwrap().on);
        assert!(next.room("r1").unwrap().any_on);
        assert!(!snap.light("l1").unwrap().on, "original snapshot is untouched");
    }

    #[test]
    fn resolve_by_id_or_name() {
        let snap = snapshot();
        assert_eq!(snap.resolve_light("bedroom lamp").unwrap().id, "l5");
        assert_eq!(snap.resolve_room("r1").unwrap().room.name, "Living Room");
        assert!(snap.resolve_room("Kitchen").is_none());
    }
}
