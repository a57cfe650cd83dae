// Shared request state: the backend client plus the static default
// device, built once at startup from the validated configuration.

use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;
use url::Url;

use unipower_api::ssh::SshConfig;
use unipower_api::transport::{TlsMode, TransportConfig};
use unipower_api::{ControllerClient, ControllerPlatform, PowerClient, SshClient};
use unipower_config::{BackendMode, Config};

/// Shared across all request handlers. The backend client is read-only;
/// any mutable session state lives inside the client itself.
#[derive(Clone)]
pub struct AppState {
    pub power: Arc<dyn PowerClient>,
    pub default_device: Option<String>,
}

impl AppState {
    pub fn new(power: Arc<dyn PowerClient>, default_device: Option<String>) -> Self {
        Self {
            power,
            default_device,
        }
    }

    /// Build the configured backend. Any failure here (bad URL, missing
    /// key file) is startup-fatal.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let power: Arc<dyn PowerClient> = match config.mode {
            BackendMode::Controller => {
                let section = config.controller()?;
                let base_url = Url::parse(&section.url)
                    .with_context(|| format!("invalid controller URL {:?}", section.url))?;
                let platform = match section.platform.as_str() {
                    "classic" => ControllerPlatform::ClassicController,
                    _ => ControllerPlatform::UnifiOs,
                };
                let transport = TransportConfig {
                    tls: if section.insecure {
                        TlsMode::DangerAcceptInvalid
                    } else {
                        TlsMode::System
                    },
                    timeout: section.timeout(),
                };

                Arc::new(ControllerClient::new(
                    base_url,
                    section.site.clone(),
                    platform,
                    section.username.clone(),
                    SecretString::from(section.password.clone()),
                    &transport,
                )?)
            }
            BackendMode::Ssh => {
                let section = config.switch()?;
                Arc::new(
                    SshClient::new(SshConfig {
                        host: section.host.clone(),
                        port: section.port,
                        username: section.username.clone(),
                        key_path: section.key_path.clone(),
                        timeout: section.timeout(),
                    })
                    .context("failed to create SSH client")?,
                )
            }
        };

        Ok(Self::new(power, config.device.clone()))
    }
}
