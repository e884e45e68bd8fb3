//! Canonical domain types shared by the controller, the CLI, and the assistant.

pub mod device;
pub mod light;
pub mod room;
pub mod scene;

pub use device::Device;
pub use light::{Light, LightColor, LightUpdate, Xy};
pub use room::{Link, LinkKind, Room};
pub use scene::{Scene, SceneAction};
