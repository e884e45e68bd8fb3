// ── Room aggregation ──
//
// A room's effective lights are found through its device children only:
// device ids → map lookup (unknown ⇒ empty) → flatten → filter the known
// light list by membership. Direct light children are ignored.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Light, Room};
use crate::resolver::DeviceLightMap;

/// Lights that belong to `room`, in light-list order.
pub fn effective_lights<'a>(
    room: &Room,
    map: &DeviceLightMap,
    lights: &'a [Light],
) -> Vec<&'a Light> {
    let members: HashSet<&str> = room
        .device_ids()
        .flat_map(|d| map.lights_for(d))
        .map(String::as_str)
        .collect();

    lights
        .iter()
        .filter(|l| members.contains(l.id.as_str()))
        .collect()
}

/// `true` when any light is on; `false` for an empty set.
pub fn any_on<'a>(lights: impl IntoIterator<Item = &'a Light>) -> bool {
    lights.into_iter().any(|l| l.on)
}

/// Mean brightness with absent brightness counted as zero. An empty set
/// averages to zero.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn avg_brightness<'a>(lights: impl IntoIterator<Item = &'a Light>) -> f64 {
    let (sum, count) = lights
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), l| (sum + l.brightness_or_zero(), n + 1));
    sum / count.max(1) as f64
}

/// Per-room derived view, recomputed for every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomView {
    pub room: Room,
    pub light_ids: Vec<String>,
    pub any_on: bool,
    pub avg_brightness: f64,
    pub light_count: usize,
}

impl RoomView {
    pub fn compute(room: &Room, map: &DeviceLightMap, lights: &[Light]) -> Self {
        let members = effective_lights(room, map, lights);

        Self {
            room: room.clone(),
            any_on: any_on(members.iter().copied()),
            avg_brightness: avg_brightness(members.iter().copied()),
            light_count: members.len(),
            light_ids: members.iter().map(|l| l.id.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Device, Link};
    use pretty_assertions::assert_eq;

    fn light(id: &str, on: bool, brightness: Option<f64>) -> Light {
        Light {
            id: id.into(),
            name: id.into(),
            archetype: None,
            on,
            brightness,
            color: None,
        }
    }

    fn room(children: Vec<Link>) -> Room {
        Room {
            id: "r1".into(),
            name: "Living Room".into(),
            archetype: None,
            children,
        }
    }

    fn map() -> DeviceLightMap {
        DeviceLightMap::build(&[
            Device {
                id: "d1".into(),
                name: "Strip".into(),
                archetype: None,
                services: vec![Link::light("l1"), Link::light("l2")],
            },
            Device {
                id: "d2".into(),
                name: "Ghost".into(),
                archetype: None,
                services: vec![Link::light("gone")],
            },
        ])
    }

    #[test]
    fn averages() {
        assert!(avg_brightness(std::iter::empty::<&Light>()).abs() < f64::EPSILON);
        let one = [light("l1", true, Some(60.0))];
        assert!((avg_brightness(&one) - 60.0).abs() < f64::EPSILON);
        let mixed = [light("l1", true, Some(60.0)), light("l2", true, None)];
        assert!((avg_brightness(&mixed) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn any_on_cases() {
        assert!(!any_on(std::iter::empty::<&Light>()));
        assert!(!any_on(&[light("a", false, None), light("b", false, None)]));
        assert!(any_on(&[light("a", false, None), light("b", true, None)]));
    }

    #[test]
    fn effective_lights_follow_devices_and_known_lights() {
        let lights = [
            light("l1", false, Some(10.0)),
            light("l2", true, Some(90.0)),
            light("l3", true, Some(50.0)),
        ];
        let r = room(vec![Link::device("d1"), Link::device("d2"), Link::light("l3")]);
        let ids: Vec<&str> = effective_lights(&r, &map(), &lights)
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["l1", "l2"]);
    }

    #[test]
    fn duplicate_device_children_do_not_double_count() {
        let lights = [light("l1", true, Some(40.0)), light("l2", false, Some(80.0))];
        let r = room(vec![Link::device("d1"), Link::device("d1")]);
        let view = RoomView::compute(&r, &map(), &lights);
        assert_eq!(view.light_count, 2);
        assert_eq!(view.light_ids, vec!["l1", "l2"]);
        assert!(view.any_on);
        assert!((view.avg_brightness - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unresolvable_room_is_empty_not_error() {
        let lights = [light("l1", true, Some(40.0))];
        let r = room(vec![Link::device("missing")]);
        let view = RoomView::compute(&r, &map(), &lights);
        assert!(view.light_ids.is_empty());
        assert!(!view.any_on);
        assert!(view.avg_brightness.abs() < f64::EPSILON);
    }
}
