//! unipowerd: header-addressed JSON-RPC power-control gateway.
//!
//! A single `POST /rpc` endpoint maps abstract power/boot methods onto a
//! UniFi switch through whichever [`unipower_api::PowerClient`] backend
//! the configuration selects, plus a small machine-control surface
//! (status/poweron/poweroff/reboot) over the same addressing scheme.

pub mod addressor;
pub mod error;
pub mod routes;
pub mod rpc;
pub mod state;

pub use routes::router;
pub use state::AppState;
