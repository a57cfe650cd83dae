// unipower-api: backend power-control clients for UniFi switches.
//
// Two mutually exclusive transports implement the same `PowerClient`
// contract: `controller` drives the UniFi controller's legacy HTTP API
// (port-override mutation), `ssh` runs `swctrl` commands directly on the
// switch CLI and parses their tabular output.

pub mod controller;
pub mod error;
pub mod power;
pub mod ssh;
pub mod transport;

pub use controller::{ControllerClient, ControllerPlatform};
pub use error::Error;
pub use power::{PortTarget, PowerClient, PowerState};
pub use ssh::{PoePortStatus, PoeStatus, SshClient};
