use thiserror::Error;

/// Top-level error type for the `unipower-api` crate.
///
/// Covers every failure mode across both backends: authentication,
/// transport, controller API envelopes, SSH command execution, and the
/// CLI output parser. The dispatcher maps these onto RPC error codes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session has expired (cookie expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend call exceeded the configured timeout.
    #[error("Operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller API ──────────────────────────────────────────────
    /// Error from the controller API (parsed from the `{meta: {rc, msg}}`
    /// envelope).
    #[error("Controller API error: {message}")]
    ControllerApi { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// No device with the given address is known to the controller.
    #[error("Device {device} not found")]
    DeviceNotFound { device: String },

    /// A controller operation was invoked without a device address.
    #[error("No device address supplied for controller operation")]
    MissingDevice,

    // ── SSH / CLI ───────────────────────────────────────────────────
    /// SSH protocol or connection error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// SSH private key could not be read or parsed.
    #[error("SSH key error: {0}")]
    Key(#[from] russh_keys::Error),

    /// Remote command exited with a non-zero status.
    #[error("Command {command:?} failed with exit status {exit_status}")]
    CommandFailed { command: String, exit_status: u32 },

    /// CLI output had no tabular data section.
    #[error("Malformed CLI output: {message}")]
    MalformedOutput { message: String },

    /// CLI output parsed to zero port records.
    #[error("CLI output contained no port records")]
    EmptyResult,

    // ── Power model ─────────────────────────────────────────────────
    /// The requested port has no record in the status output.
    #[error("Port {port} not found in status output")]
    PortNotFound { port: u32 },

    /// The CLI reported a power flag outside the known vocabulary.
    #[error("Unknown power state: {token}")]
    UnknownPowerState { token: String },

    // ── Capability ──────────────────────────────────────────────────
    /// Operation not supported by this backend.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound { .. } | Self::PortNotFound { .. }
        )
    }
}
