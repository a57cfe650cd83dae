// Controller device endpoints
//
// Device lookup via stat/device, whole-object update via rest/device,
// and devmgr commands via cmd/devmgr.

use serde_json::json;
use tracing::debug;

use crate::controller::client::ControllerClient;
use crate::controller::models::Device;
use crate::error::Error;

impl ControllerClient {
    /// Get a single device by MAC address.
    ///
    /// `POST /api/s/{site}/stat/device` with a MAC filter. Fails with
    /// [`Error::DeviceNotFound`] if the controller knows no such device.
    pub async fn device_by_mac(&self, mac: &str) -> Result<Device, Error> {
        let url = self.site_url("stat/device")?;
        let body = json!({ "macs": [mac.to_lowercase()] });
        let devices: Vec<Device> = self.post(url, &body).await?;
        devices
            .into_iter()
            .next()
            .ok_or_else(|| Error::DeviceNotFound {
                device: mac.to_owned(),
            })
    }

    /// Submit an entire device object back to the controller.
    ///
    /// `PUT /api/s/{site}/rest/device/{id}`. There is no partial update;
    /// concurrent writers to the same device race at whole-object
    /// granularity.
    pub async fn update_device(&self, device: &Device) -> Result<Device, Error> {
        let url = self.site_url(&format!("rest/device/{}", device.id))?;
        debug!(mac = %device.mac, "updating device");
        let mut updated: Vec<Device> = self.put(url, device).await?;
        updated
            .pop()
            .ok_or_else(|| Error::ControllerApi {
                message: "device update returned no device".into(),
            })
    }

    /// Power-cycle a switch port via the device manager.
    ///
    /// `POST /api/s/{site}/cmd/devmgr` with
    /// `{"cmd": "power-cycle", "mac": ..., "port_idx": ...}`.
    pub async fn power_cycle(&self, mac: &str, port_idx: u32) -> Result<(), Error> {
        let url = self.site_url("cmd/devmgr")?;
        debug!(mac, port_idx, "power-cycling port");
        let _: Vec<serde_json::Value> = self
            .post(
                url,
                &json!({
                    "cmd": "power-cycle",
                    "mac": mac.to_lowercase(),
                    "port_idx": port_idx,
                }),
            )
            .await?;
        Ok(())
    }
}
