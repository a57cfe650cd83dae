//! Configuration for the unipower gateway.
//!
//! A TOML file merged with `UNIPOWER_`-prefixed environment overrides,
//! validated at startup. Exactly one backend section must match the
//! selected mode; a missing or inconsistent section is a startup-fatal
//! error, never a request-time one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("backend mode '{mode}' requires a [{section}] section")]
    MissingSection {
        mode: &'static str,
        section: &'static str,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level gateway configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub listen: Listen,

    /// Static default device address used when a request carries no
    /// device header. Controller mode only.
    pub device: Option<String>,

    /// Which backend drives power operations.
    #[serde(default)]
    pub mode: BackendMode,

    /// Controller backend settings (`mode = "controller"`).
    pub controller: Option<ControllerSection>,

    /// SSH backend settings (`mode = "ssh"`).
    pub switch: Option<SwitchSection>,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct Listen {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}

/// Backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendMode {
    #[default]
    Controller,
    Ssh,
}

impl BackendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Ssh => "ssh",
        }
    }
}

/// Controller backend settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct ControllerSection {
    /// Controller base URL (e.g. "https://192.168.1.1").
    pub url: String,

    /// Site name.
    #[serde(default = "default_site")]
    pub site: String,

    /// Controller platform: "unifi-os" or "classic".
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Username for session auth.
    pub username: String,

    /// Password for session auth (plaintext -- prefer the
    /// UNIPOWER_CONTROLLER__PASSWORD environment variable).
    pub password: String,

    /// Accept self-signed controller certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_site() -> String {
    "default".into()
}
fn default_platform() -> String {
    "unifi-os".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

impl ControllerSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// SSH backend settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct SwitchSection {
    /// IP address or hostname of the switch.
    pub host: String,

    /// SSH port.
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// SSH username.
    pub username: String,

    /// Path to the SSH private key.
    pub key_path: PathBuf,

    /// Timeout in seconds for one command exchange.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_ssh_port() -> u16 {
    22
}

impl SwitchSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// ── Loading & validation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a TOML file plus `UNIPOWER_` environment
    /// overrides (`UNIPOWER_CONTROLLER__PASSWORD=...` style nesting).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("UNIPOWER_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The backend section matching the selected mode, validated.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            BackendMode::Controller => {
                let section = self.controller()?;
                url::Url::parse(&section.url).map_err(|e| ConfigError::Validation {
                    field: "controller.url".into(),
                    reason: e.to_string(),
                })?;
                if !matches!(section.platform.as_str(), "unifi-os" | "classic") {
                    return Err(ConfigError::Validation {
                        field: "controller.platform".into(),
                        reason: format!(
                            "expected \"unifi-os\" or \"classic\", got {:?}",
                            section.platform
                        ),
                    });
                }
            }
            BackendMode::Ssh => {
                let section = self.switch()?;
                if section.host.is_empty() {
                    return Err(ConfigError::Validation {
                        field: "switch.host".into(),
                        reason: "host must not be empty".into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The `[controller]` section, required in controller mode.
    pub fn controller(&self) -> Result<&ControllerSection, ConfigError> {
        self.controller.as_ref().ok_or(ConfigError::MissingSection {
            mode: "controller",
            section: "controller",
        })
    }

    /// The `[switch]` section, required in ssh mode.
    pub fn switch(&self) -> Result<&SwitchSection, ConfigError> {
        self.switch.as_ref().ok_or(ConfigError::MissingSection {
            mode: "ssh",
            section: "switch",
        })
    }
}
