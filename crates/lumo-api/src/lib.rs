// lumo-api: Async Rust client for the lighting bridge CLIP v2 API and
// the LLM completion services used by the assistant.

pub mod bridge;
pub mod completion;
pub mod error;
pub mod platform;
pub mod transport;

pub use bridge::client::{BridgeChannel, BridgeClient};
pub use bridge::models::ResourceKind;
pub use bridge::pairing::{PairingClient, PairingResponse};
pub use completion::client::CompletionClient;
pub use completion::types::Provider;
pub use error::Error;
pub use platform::{FetchRequest, FetchResponse, PlatformFetch, ProxyFetch};
pub use transport::{TlsMode, TransportConfig};
