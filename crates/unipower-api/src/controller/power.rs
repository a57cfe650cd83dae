// PowerClient implementation for the controller backend.
//
// Power state is a view over the device's port-override list; writes are
// read-modify-write on the whole device object. A port with no override
// record reads as Off rather than erroring -- the controller treats the
// absence of an override as "base configuration", so the miss is silent.

use async_trait::async_trait;
use tracing::debug;

use crate::controller::client::ControllerClient;
use crate::controller::models::PortOverride;
use crate::error::Error;
use crate::power::{PortTarget, PowerClient, PowerState};
use crate::ssh::PoeStatus;

/// PoE mode strings the controller understands.
fn poe_mode_for(state: PowerState) -> &'static str {
    if state.is_on() { "auto" } else { "off" }
}

#[async_trait]
impl PowerClient for ControllerClient {
    fn requires_device(&self) -> bool {
        true
    }

    async fn power_state(&self, target: &PortTarget) -> Result<PowerState, Error> {
        let mac = target.device_addr()?;
        let device = self.device_by_mac(mac).await?;

        // Missing override reads as an empty record, not an error.
        let mode = device
            .port_override(target.port)
            .and_then(|p| p.poe_mode.as_deref())
            .unwrap_or_default();

        Ok(match mode {
            "auto" => PowerState::On,
            _ => PowerState::Off,
        })
    }

    async fn set_power(&self, target: &PortTarget, state: PowerState) -> Result<(), Error> {
        let mac = target.device_addr()?;
        let mut device = self.device_by_mac(mac).await?;
        let mode = poe_mode_for(state);

        match device
            .port_overrides
            .iter_mut()
            .find(|p| p.port_idx == target.port)
        {
            Some(port) if port.poe_mode.as_deref() == Some(mode) => {
                debug!(mac, port = target.port, mode, "port already in requested mode");
                return Ok(());
            }
            Some(port) => {
                port.poe_mode = Some(mode.to_owned());
            }
            None => {
                device.port_overrides.push(PortOverride {
                    port_idx: target.port,
                    poe_mode: Some(mode.to_owned()),
                    ..PortOverride::default()
                });
            }
        }

        self.update_device(&device).await?;
        Ok(())
    }

    async fn restart_power(&self, target: &PortTarget) -> Result<(), Error> {
        let mac = target.device_addr()?;
        self.power_cycle(mac, target.port).await
    }

    async fn poe_status(&self, _target: &PortTarget) -> Result<PoeStatus, Error> {
        Err(Error::UnsupportedOperation(
            "PoE status snapshot requires the ssh backend",
        ))
    }
}
