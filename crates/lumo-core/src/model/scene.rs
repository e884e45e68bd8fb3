use serde::{Deserialize, Serialize};

use super::light::LightUpdate;

/// A stored light preset owned by a room. Read-only apart from recall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    /// Owning group (room id).
    pub room_id: String,
    #[serde(skip)]
    pub actions: Vec<SceneAction>,
}

/// One light's target state within a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAction {
    pub light_id: String,
    pub update: LightUpdate,
}
