// RPC dispatcher
//
// Decodes `{id, method, host, params}`, maps the method name onto a
// typed call with a single `serde_json::from_value` pass (no re-encode
// round trip), invokes the backend, and produces `{id, host, result?,
// error?}` with the HTTP status mirroring `error.code`. All state is
// request-scoped; a failed call surfaces as an RPC error, never as a
// handler panic or process exit.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use unipower_api::{PortTarget, PowerState};

use crate::state::AppState;

// ── Wire types ──────────────────────────────────────────────────────

/// Inbound RPC payload. `id` is an opaque correlator echoed back as-is.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outbound RPC payload. Exactly one of `result`/`error` is set.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// The HTTP status this response travels with.
    pub fn http_status(&self) -> StatusCode {
        self.error
            .as_ref()
            .and_then(|e| StatusCode::from_u16(e.code).ok())
            .unwrap_or(StatusCode::OK)
    }
}

/// Structured RPC error; `code` doubles as the HTTP status.
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: u16,
    pub message: String,
}

impl RpcError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: 400,
            message: message.into(),
        }
    }

    fn backend(message: impl Into<String>) -> Self {
        Self {
            code: 500,
            message: message.into(),
        }
    }
}

// ── Typed method calls ──────────────────────────────────────────────

/// The method table, decoded from the untyped wire pair (method, params).
#[derive(Debug)]
enum RpcCall {
    PowerGet,
    PowerSet(PowerSetParams),
    BootDevice(BootDeviceParams),
    Ping,
}

#[derive(Debug, Default, Deserialize)]
struct PowerSetParams {
    #[serde(default)]
    state: String,
}

#[derive(Debug, Default, Deserialize)]
struct BootDeviceParams {
    #[serde(default)]
    device: String,
    #[serde(default)]
    persistent: bool,
    #[serde(default, rename = "efiBoot")]
    efi_boot: bool,
}

impl RpcCall {
    /// Decode method-specific params directly into their typed struct.
    fn decode(method: &str, params: Option<Value>) -> Result<Self, RpcError> {
        let params = params.unwrap_or_else(|| json!({}));
        match method {
            "power.get" => Ok(Self::PowerGet),
            "power.set" => serde_json::from_value(params)
                .map(Self::PowerSet)
                .map_err(|e| RpcError::bad_request(format!("invalid power.set params: {e}"))),
            "boot.device" => serde_json::from_value(params)
                .map(Self::BootDevice)
                .map_err(|e| RpcError::bad_request(format!("invalid boot.device params: {e}"))),
            "ping" => Ok(Self::Ping),
            other => Err(RpcError {
                code: 404,
                message: format!("unknown method: {other}"),
            }),
        }
    }
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Handle one decoded RPC request against the backend.
pub async fn dispatch(state: &AppState, target: &PortTarget, req: RpcRequest) -> RpcResponse {
    let mut resp = RpcResponse {
        id: req.id,
        host: req.host,
        result: None,
        error: None,
    };

    let call = match RpcCall::decode(&req.method, req.params) {
        Ok(call) => call,
        Err(err) => {
            warn!(method = req.method, code = err.code, "rejecting RPC call");
            resp.error = Some(err);
            return resp;
        }
    };

    debug!(?call, port = target.port, "dispatching RPC call");

    match call {
        RpcCall::Ping => resp.result = Some(json!("pong")),

        RpcCall::PowerGet => match state.power.power_state(target).await {
            // Transitional states collapse to on/off at this boundary;
            // the RPC vocabulary is exactly {on, off}.
            Ok(power) => resp.result = Some(json!(power.settled().to_string())),
            Err(e) => {
                resp.error = Some(RpcError::backend(format!("error getting power state: {e}")));
            }
        },

        RpcCall::PowerSet(params) => match params.state.as_str() {
            "on" | "off" | "soft" => {
                let requested = if params.state == "on" {
                    PowerState::On
                } else {
                    PowerState::Off
                };
                match state.power.set_power(target, requested).await {
                    Ok(()) => resp.result = Some(json!("ok")),
                    Err(e) => {
                        resp.error =
                            Some(RpcError::backend(format!("error setting power state: {e}")));
                    }
                }
            }
            // reset/cycle are a power-cycle command, not a state write.
            "reset" | "cycle" => match state.power.restart_power(target).await {
                Ok(()) => resp.result = Some(json!("ok")),
                Err(e) => {
                    resp.error =
                        Some(RpcError::backend(format!("error power cycling port: {e}")));
                }
            },
            other => {
                resp.error = Some(RpcError::bad_request(format!("invalid power state: {other}")));
            }
        },

        RpcCall::BootDevice(params) => {
            // Acknowledged but not implemented for switch-backed hosts.
            resp.result = Some(json!({
                "acknowledged": true,
                "device": params.device,
                "persistent": params.persistent,
                "efiBoot": params.efi_boot,
                "message": "boot device setting not supported for UniFi switches",
            }));
        }
    }

    resp
}
