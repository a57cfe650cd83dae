// HTTP surface
//
// `POST /rpc` is the JSON-RPC entry point. The remaining routes form a
// small machine-control API over the same header addressing: status and
// direct power actions for callers that speak plain HTTP rather than
// the RPC body format. Header validation happens before the body is
// touched, and always yields `{"error": message}` with a 400.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use unipower_api::{Error as BackendError, PortTarget, PowerState};

use crate::addressor::extract_target;
use crate::error::ApiError;
use crate::rpc::{dispatch, RpcRequest};
use crate::state::AppState;

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc", post(rpc))
        .route("/status", get(status))
        .route("/poweron", post(power_on))
        .route("/poweroff", post(power_off))
        .route("/reboot", post(reboot))
        .route("/pxeboot", post(pxe_boot))
        .with_state(state)
}

/// Resolve the request target, or fail with 400 before reading the body.
fn target_from(state: &AppState, headers: &HeaderMap) -> Result<PortTarget, ApiError> {
    extract_target(
        headers,
        state.default_device.as_deref(),
        state.power.requires_device(),
    )
    .map_err(ApiError::from)
}

// ── Handlers ────────────────────────────────────────────────────────

/// Liveness probe; the only route that needs no addressing.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// The JSON-RPC entry point.
async fn rpc(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let target = match target_from(&state, &headers) {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return ApiError::bad_request("invalid JSON payload").into_response(),
    };

    let response = dispatch(&state, &target, request).await;
    (response.http_status(), Json(response)).into_response()
}

/// Power state plus, where the backend supports it, the full PoE
/// snapshot for the addressed port's switch.
async fn status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let target = match target_from(&state, &headers) {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    let power = match state.power.power_state(&target).await {
        Ok(power) => power,
        Err(err) => return ApiError::backend(&err).into_response(),
    };

    let poe = match state.power.poe_status(&target).await {
        Ok(snapshot) => Some(snapshot),
        Err(BackendError::UnsupportedOperation(_)) => None,
        Err(err) => return ApiError::backend(&err).into_response(),
    };

    Json(json!({
        "port": target.port,
        "state": power.settled().to_string(),
        "poe": poe,
    }))
    .into_response()
}

async fn power_on(State(state): State<AppState>, headers: HeaderMap) -> Response {
    power_action(&state, &headers, PowerAction::Set(PowerState::On)).await
}

async fn power_off(State(state): State<AppState>, headers: HeaderMap) -> Response {
    power_action(&state, &headers, PowerAction::Set(PowerState::Off)).await
}

async fn reboot(State(state): State<AppState>, headers: HeaderMap) -> Response {
    power_action(&state, &headers, PowerAction::Restart).await
}

/// PXE boot ordering is a host-firmware concern; acknowledged only.
async fn pxe_boot(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let target = match target_from(&state, &headers) {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    Json(json!({
        "acknowledged": true,
        "port": target.port,
        "message": "pxe boot ordering not supported for UniFi switches",
    }))
    .into_response()
}

enum PowerAction {
    Set(PowerState),
    Restart,
}

async fn power_action(state: &AppState, headers: &HeaderMap, action: PowerAction) -> Response {
    let target = match target_from(state, headers) {
        Ok(target) => target,
        Err(err) => return err.into_response(),
    };

    let result = match action {
        PowerAction::Set(power) => state.power.set_power(&target, power).await,
        PowerAction::Restart => state.power.restart_power(&target).await,
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => ApiError::backend(&err).into_response(),
    }
}
