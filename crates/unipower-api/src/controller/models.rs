// Controller API response types
//
// Models for the legacy JSON API. All responses are wrapped in the
// `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware
// versions, and every struct carries a flattened `extra` map so that a
// whole-device update round-trips fields we do not model.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `stat/device`.
///
/// Writes go through `rest/device/{id}` with the *entire* object, so the
/// flattened `extra` map is load-bearing: dropping unmodeled fields on
/// update would reset them on the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub port_overrides: Vec<PortOverride>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// The port override for `port_idx`, if one exists.
    pub fn port_override(&self, port_idx: u32) -> Option<&PortOverride> {
        self.port_overrides.iter().find(|p| p.port_idx == port_idx)
    }
}

/// Per-port configuration delta carried in `Device::port_overrides`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortOverride {
    #[serde(default)]
    pub port_idx: u32,
    /// PoE mode: "auto" (powered), "off", or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
