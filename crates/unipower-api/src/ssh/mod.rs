// SSH backend
//
// Runs `swctrl poe` commands directly on the switch CLI. One connection
// per command: connect, public-key auth, exec, collect output, disconnect.
// Status reads go through the tabular-output parser in `status`.

pub mod client;
pub mod status;

pub use client::{SshClient, SshConfig};
pub use status::{PoePortStatus, PoeStatus};
