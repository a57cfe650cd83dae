// SSH command client
//
// Each operation opens a fresh connection: connect, authenticate with the
// configured private key, open a session channel, exec one `swctrl`
// command, collect combined output, disconnect. There is no connection
// pool; the configured timeout bounds the whole exchange, and dropping
// the caller's future cancels it mid-flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::{ChannelMsg, Disconnect};
use russh_keys::key;
use tracing::debug;

use crate::error::Error;
use crate::power::{PortTarget, PowerClient, PowerState};
use crate::ssh::status::{parse_poe_status, PoeStatus};

/// Connection settings for the switch CLI.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// IP address or hostname of the switch.
    pub host: String,
    /// SSH port (default 22).
    pub port: u16,
    /// Username for SSH authentication.
    pub username: String,
    /// Path to the SSH private key.
    pub key_path: PathBuf,
    /// Timeout for one complete command exchange.
    pub timeout: Duration,
}

/// Accepts any host key. Switch host keys rotate on factory reset and the
/// original deployment pins none, so verification is disabled.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &key::PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// SSH-based power client for a single switch.
pub struct SshClient {
    config: SshConfig,
    key: Arc<key::KeyPair>,
}

impl SshClient {
    /// Create a new client, loading and parsing the private key eagerly
    /// so a bad key path fails at startup rather than on first request.
    pub fn new(config: SshConfig) -> Result<Self, Error> {
        if config.host.is_empty() {
            return Err(Error::Authentication {
                message: "switch host is required".into(),
            });
        }
        if config.username.is_empty() {
            return Err(Error::Authentication {
                message: "ssh username is required".into(),
            });
        }

        let key = russh_keys::load_secret_key(&config.key_path, None)?;
        Ok(Self {
            config,
            key: Arc::new(key),
        })
    }

    /// Run one command on the switch, returning combined output.
    async fn run_command(&self, command: &str) -> Result<String, Error> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.exchange(command))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: timeout.as_secs(),
            })?
    }

    /// One full connect/auth/exec/disconnect cycle.
    async fn exchange(&self, command: &str) -> Result<String, Error> {
        debug!(host = %self.config.host, command, "running switch command");

        let ssh_config = Arc::new(client::Config::default());
        let mut session = client::connect(
            ssh_config,
            (self.config.host.as_str(), self.config.port),
            AcceptAnyHostKey,
        )
        .await?;

        let authenticated = session
            .authenticate_publickey(self.config.username.clone(), Arc::clone(&self.key))
            .await?;
        if !authenticated {
            return Err(Error::Authentication {
                message: format!(
                    "public-key authentication rejected for {}@{}",
                    self.config.username, self.config.host
                ),
            });
        }

        let mut channel = session.channel_open_session().await?;
        channel.exec(true, command).await?;

        let mut output = Vec::new();
        let mut exit_status = None;
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => output.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, .. } => output.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
                _ => {}
            }
        }

        session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .ok();

        if let Some(code) = exit_status {
            if code != 0 {
                return Err(Error::CommandFailed {
                    command: command.to_owned(),
                    exit_status: code,
                });
            }
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Fetch and parse the PoE status table for one port.
    async fn poe_status_for(&self, port: u32) -> Result<PoeStatus, Error> {
        let output = self.run_command(&format!("swctrl poe show id {port}")).await?;
        parse_poe_status(&output)
    }
}

#[async_trait]
impl PowerClient for SshClient {
    async fn power_state(&self, target: &PortTarget) -> Result<PowerState, Error> {
        let status = self.poe_status_for(target.port).await?;
        let record = status.port(target.port).ok_or(Error::PortNotFound {
            port: target.port,
        })?;

        PowerState::from_cli_token(&record.poe_power).ok_or_else(|| Error::UnknownPowerState {
            token: record.poe_power.clone(),
        })
    }

    async fn set_power(&self, target: &PortTarget, state: PowerState) -> Result<(), Error> {
        let command = if state.is_on() {
            format!("swctrl poe set auto id {}", target.port)
        } else {
            format!("swctrl poe set off id {}", target.port)
        };
        self.run_command(&command).await?;
        Ok(())
    }

    async fn restart_power(&self, target: &PortTarget) -> Result<(), Error> {
        // Single firmware-side command; no off-then-on sequencing here.
        self.run_command(&format!("swctrl poe restart id {}", target.port))
            .await?;
        Ok(())
    }

    async fn poe_status(&self, target: &PortTarget) -> Result<PoeStatus, Error> {
        self.poe_status_for(target.port).await
    }
}
