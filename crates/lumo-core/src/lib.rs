//! Home state engine between `lumo-api` and UI consumers (the CLI).
//!
//! - **[`Controller`]**: lifecycle facade. [`connect()`](Controller::connect)
//!   probes the bridge, takes an initial snapshot and spawns the poll task;
//!   mutations are applied optimistically, written, then reconciled with a
//!   full re-fetch. [`Controller::oneshot()`](Controller::oneshot) wraps a
//!   single CLI invocation.
//!
//! - **[`HomeStore`]**: the current [`HomeSnapshot`] behind a `watch`
//!   channel, always replaced whole.
//!
//! - **Resolution**: [`DeviceLightMap`] derives device → light relations;
//!   [`RoomView`] aggregates each room through its devices.
//!
//! - **[`SimulationStore`]**: offline bridge used by demo mode and tests.
//!
//! - **[`Assistant`]**: turns free text into light updates through a
//!   tool-calling [`CompletionService`].

pub mod aggregate;
pub mod assistant;
pub mod color;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod pairing;
pub mod resolver;
pub mod resource;
pub mod simulation;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::RoomView;
pub use assistant::{Assistant, CompletionService};
pub use command::{Command, CommandResult};
pub use config::{
    AssistantConfig, BridgeConfig, BridgeTransport, ConnectionMode, Provider, TlsVerification,
};
pub use controller::{Collaborators, ConnectionState, Controller};
pub use error::{CONNECTIVITY_MESSAGE, CoreError};
pub use model::{Device, Light, LightColor, LightUpdate, Link, LinkKind, Room, Scene, Xy};
pub use pairing::{PairingOptions, pair};
pub use resolver::DeviceLightMap;
pub use resource::{ResourceClient, Resources};
pub use simulation::{SimulatedHome, SimulatedWrite, SimulationStore};
pub use store::{HomeSnapshot, HomeStore};
