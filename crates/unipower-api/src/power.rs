// Power-control contract shared by both backends.

use std::fmt;

use async_trait::async_trait;

use crate::error::Error;
use crate::ssh::PoeStatus;

/// Power state of a switch port.
///
/// The switch CLI reports four states; the two transitional ones collapse
/// onto their settled counterparts at the RPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
}

impl PowerState {
    /// Whether this state resolves to the backend's enable mode.
    pub fn is_on(self) -> bool {
        matches!(self, Self::On | Self::PoweringOn)
    }

    /// Collapse transitional states onto `On`/`Off`.
    pub fn settled(self) -> Self {
        if self.is_on() { Self::On } else { Self::Off }
    }

    /// Parse a power flag token from `swctrl poe show` output.
    ///
    /// Returns `None` for tokens outside the known vocabulary; the caller
    /// decides whether that is an error.
    pub fn from_cli_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "powering-on" | "powering on" => Some(Self::PoweringOn),
            "powering-off" | "powering off" => Some(Self::PoweringOff),
            _ => None,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::On => "on",
            Self::Off => "off",
            Self::PoweringOn => "powering on",
            Self::PoweringOff => "powering off",
        };
        f.write_str(s)
    }
}

/// A fully resolved request target: which switch, which port.
///
/// The device half is optional because the SSH backend is pinned to a
/// single switch by its connection config and ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortTarget {
    /// Switch address (MAC for the controller backend).
    pub device: Option<String>,
    /// 1-based physical port index.
    pub port: u32,
}

impl PortTarget {
    pub fn new(device: Option<String>, port: u32) -> Self {
        Self { device, port }
    }

    /// The device address, required by controller-side operations.
    pub(crate) fn device_addr(&self) -> Result<&str, Error> {
        self.device.as_deref().ok_or(Error::MissingDevice)
    }
}

/// Abstract power-control operations over a switch port.
///
/// Implemented by [`crate::ControllerClient`] (remote object mutation via
/// the controller API) and [`crate::SshClient`] (CLI command execution).
/// The dispatcher only ever sees this trait.
#[async_trait]
pub trait PowerClient: Send + Sync {
    /// Whether requests must carry a device address for this backend.
    ///
    /// The controller backend addresses devices by MAC; the SSH backend is
    /// bound to one switch and needs only a port.
    fn requires_device(&self) -> bool {
        false
    }

    /// Current power state of the target port.
    async fn power_state(&self, target: &PortTarget) -> Result<PowerState, Error>;

    /// Drive the target port to the given state. Idempotent: setting a
    /// state the backend already reflects performs no mutation.
    async fn set_power(&self, target: &PortTarget, state: PowerState) -> Result<(), Error>;

    /// Power-cycle the target port as a single backend-side command.
    async fn restart_power(&self, target: &PortTarget) -> Result<(), Error>;

    /// Full PoE status snapshot for the target's switch.
    ///
    /// Only the SSH backend can produce this; the controller backend
    /// returns [`Error::UnsupportedOperation`].
    async fn poe_status(&self, target: &PortTarget) -> Result<PoeStatus, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_tokens_map_to_four_states() {
        assert_eq!(PowerState::from_cli_token("On"), Some(PowerState::On));
        assert_eq!(PowerState::from_cli_token("off"), Some(PowerState::Off));
        assert_eq!(
            PowerState::from_cli_token("Powering-On"),
            Some(PowerState::PoweringOn)
        );
        assert_eq!(
            PowerState::from_cli_token("powering off"),
            Some(PowerState::PoweringOff)
        );
        assert_eq!(PowerState::from_cli_token("faulty"), None);
    }

    #[test]
    fn transitional_states_settle() {
        assert_eq!(PowerState::PoweringOn.settled(), PowerState::On);
        assert_eq!(PowerState::PoweringOff.settled(), PowerState::Off);
        assert_eq!(PowerState::On.settled(), PowerState::On);
        assert_eq!(PowerState::Off.settled(), PowerState::Off);
    }
}
