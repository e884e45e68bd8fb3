//! Bridge resource API (`/clip/v2`) and the pairing handshake (`/api`).

pub mod client;
pub mod models;
pub mod pairing;
