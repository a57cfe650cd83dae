// Controller backend
//
// Drives the UniFi controller's legacy (non-OpenAPI) endpoints wrapped in
// the standard `{ meta: { rc, msg }, data: [...] }` envelope: stat/device
// for reads, rest/device for whole-object updates, cmd/devmgr for commands.

pub mod client;
pub mod devices;
pub mod models;
mod power;

pub use client::ControllerClient;

/// The platform type of the UniFi controller.
///
/// Determines URL prefixes and login paths for the legacy API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS device (UDM, UCG, etc.) -- port 443, `/proxy/network/` prefix.
    UnifiOs,
    /// Standalone Network Application (Java) -- port 8443, no prefix.
    ClassicController,
}

impl ControllerPlatform {
    /// The path prefix for legacy API endpoints.
    pub fn legacy_prefix(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    /// The login endpoint path.
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }
}
