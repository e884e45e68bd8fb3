// ── Command API ──
//
// Every mutation the CLI issues flows through this enum. The controller
// routes each variant to the matching reconciler operation.

use crate::model::LightUpdate;

/// All write operations against the home.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetLight { light_id: String, update: LightUpdate },
    SetLights {
        light_ids: Vec<String>,
        update: LightUpdate,
    },
    ToggleRoom { room_id: String, on: bool },
    ActivateScene { scene_id: String },
}

/// Outcome of a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Single write accepted.
    Ok,
    /// Fan-out issued to this many lights.
    Affected(usize),
}
