// ── Pairing loop ──
//
// Repeats the key request until the bridge's link button is pressed,
// the bridge rejects the request, or the attempts run out.

use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, info};

use lumo_api::bridge::client::BridgeChannel;
use lumo_api::transport::TransportConfig;
use lumo_api::{PairingClient, PairingResponse};

use crate::error::CoreError;

pub const PAIRING_ATTEMPTS: u32 = 15;
pub const PAIRING_INTERVAL: Duration = Duration::from_secs(2);

/// Retry policy for [`pair`].
#[derive(Debug, Clone, Copy)]
pub struct PairingOptions {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            attempts: PAIRING_ATTEMPTS,
            interval: PAIRING_INTERVAL,
        }
    }
}

/// Device type announced to the bridge, `lumo#<host>`.
pub fn device_type(hostname: &str) -> String {
    let host: String = hostname
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(19)
        .collect();
    if host.is_empty() {
        "lumo#cli".into()
    } else {
        format!("lumo#{host}")
    }
}

/// Pairing client for `host` over a direct channel that accepts the
/// bridge's self-signed certificate.
pub fn pairing_client(host: &str, timeout: Duration) -> Result<PairingClient, CoreError> {
    let channel = BridgeChannel::direct(&TransportConfig::insecure(timeout))?;
    Ok(PairingClient::new(host, channel)?)
}

/// Request an application key, retrying while the link button is not
/// pressed. `on_wait(attempt, attempts)` fires after each such answer.
pub async fn pair<F>(
    client: &PairingClient,
    device_type: &str,
    options: PairingOptions,
    mut on_wait: F,
) -> Result<SecretString, CoreError>
where
    F: FnMut(u32, u32),
{
    for attempt in 1..=options.attempts {
        match client.request_app_key(device_type).await? {
            PairingResponse::Granted { app_key } => {
                info!(attempt, "pairing granted");
                return Ok(app_key);
            }
            PairingResponse::Rejected { code, description } => {
                return Err(CoreError::PairingRejected {
                    message: format!("{description} (type {code})"),
                });
            }
            PairingResponse::LinkButtonNotPressed => {
                debug!(attempt, "link button not pressed yet");
                on_wait(attempt, options.attempts);
                if attempt < options.attempts {
                    tokio::time::sleep(options.interval).await;
                }
            }
        }
    }

    Err(CoreError::PairingTimedOut {
        attempts: options.attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_is_sanitised() {
        assert_eq!(device_type("my-laptop.local"), "lumo#my-laptoplocal");
        assert_eq!(device_type("***"), "lumo#cli");
    }
}
