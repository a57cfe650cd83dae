#![allow(clippy::unwrap_used)]
// Integration tests for `ControllerClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unipower_api::transport::TransportConfig;
use unipower_api::{ControllerClient, ControllerPlatform, Error, PortTarget, PowerClient, PowerState};

const MAC: &str = "aa:bb:cc:dd:ee:ff";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ControllerClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ControllerClient::new(
        base_url,
        "default".into(),
        ControllerPlatform::ClassicController,
        "admin".into(),
        SecretString::from("test-password"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

fn device_envelope(poe_mode: &str) -> serde_json::Value {
    json!({
        "meta": { "rc": "ok" },
        "data": [{
            "_id": "dev1",
            "mac": MAC,
            "name": "rack-switch",
            "state": 1,
            "adopted": true,
            "port_overrides": [
                { "port_idx": 3, "poe_mode": poe_mode, "name": "server-3" }
            ]
        }]
    })
}

fn target(port: u32) -> PortTarget {
    PortTarget::new(Some(MAC.into()), port)
}

// ── Power state reads ───────────────────────────────────────────────

#[tokio::test]
async fn power_state_maps_auto_to_on() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .and(body_partial_json(json!({ "macs": [MAC] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .mount(&server)
        .await;

    let state = client.power_state(&target(3)).await.unwrap();
    assert_eq!(state, PowerState::On);
}

#[tokio::test]
async fn power_state_maps_off_to_off() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("off")))
        .mount(&server)
        .await;

    let state = client.power_state(&target(3)).await.unwrap();
    assert_eq!(state, PowerState::Off);
}

#[tokio::test]
async fn missing_override_reads_as_off() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .mount(&server)
        .await;

    // Port 7 has no override record; the miss is silent, not an error.
    let state = client.power_state(&target(7)).await.unwrap();
    assert_eq!(state, PowerState::Off);
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "meta": { "rc": "ok" }, "data": [] })),
        )
        .mount(&server)
        .await;

    let err = client.power_state(&target(3)).await.unwrap_err();
    assert!(matches!(err, Error::DeviceNotFound { .. }), "got {err:?}");
}

// ── Power state writes ──────────────────────────────────────────────

#[tokio::test]
async fn set_power_submits_whole_device() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("off")))
        .mount(&server)
        .await;

    // The PUT must carry the new mode *and* the unmodeled fields of the
    // fetched object -- updates are whole-object, not partial.
    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/device/dev1"))
        .and(body_partial_json(json!({
            "mac": MAC,
            "adopted": true,
            "port_overrides": [ { "port_idx": 3, "poe_mode": "auto", "name": "server-3" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .expect(1)
        .mount(&server)
        .await;

    client.set_power(&target(3), PowerState::On).await.unwrap();
}

#[tokio::test]
async fn set_power_is_idempotent() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .mount(&server)
        .await;

    // Already "auto": no write may happen.
    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/device/dev1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .expect(0)
        .mount(&server)
        .await;

    client.set_power(&target(3), PowerState::On).await.unwrap();
}

#[tokio::test]
async fn restart_power_issues_devmgr_command() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/devmgr"))
        .and(body_partial_json(json!({
            "cmd": "power-cycle",
            "mac": MAC,
            "port_idx": 3
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "meta": { "rc": "ok" }, "data": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.restart_power(&target(3)).await.unwrap();
}

// ── Session management ──────────────────────────────────────────────

#[tokio::test]
async fn expired_session_relogs_in_and_retries_once() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    // First device fetch hits an expired session; the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_envelope("auto")))
        .mount(&server)
        .await;

    let state = client.power_state(&target(3)).await.unwrap();
    assert_eq!(state, PowerState::On);
}

#[tokio::test]
async fn login_failure_surfaces_as_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client.power_state(&target(3)).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
}

#[tokio::test]
async fn envelope_error_surfaces_message() {
    let (server, client) = setup().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.UnknownDevice" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.power_state(&target(3)).await.unwrap_err();
    match err {
        Error::ControllerApi { message } => assert_eq!(message, "api.err.UnknownDevice"),
        other => panic!("expected ControllerApi error, got {other:?}"),
    }
}

// ── Capabilities ────────────────────────────────────────────────────

#[tokio::test]
async fn controller_requires_device_and_has_no_poe_snapshot() {
    let (server, client) = setup().await;
    drop(server);

    assert!(client.requires_device());

    let err = client
        .poe_status(&target(3))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)), "got {err:?}");

    // A target with no device at all fails before any HTTP traffic.
    let err = client
        .power_state(&PortTarget::new(None, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingDevice), "got {err:?}");
}
