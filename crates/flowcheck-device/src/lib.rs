//! Direct switch access over the vendor CLI.
//!
//! The controller's view of a switch and the switch's own state can
//! drift; this crate asks the switch itself. Each supported model
//! gets a [`DeviceBackend`] that runs show commands over a
//! [`CliSession`] and parses the vendor's output into neutral
//! records.
//!
//! # Responsibilities
//!
//! - [`CliSession`]: the transport seam (one command in, captured
//!   output out)
//! - [`SshCliSession`]: transport over the system ssh client
//! - [`DeviceBackend`]: flows, groups and controller roles as the
//!   switch reports them
//! - [`NoviflowBackend`]: the NoviWare CLI grammar
//!
//! A backend answers `Ok(None)` when the session yields no output,
//! and [`DeviceError::Unsupported`] when the model cannot answer the
//! query at all.

mod backend;
mod error;
mod noviflow;
mod records;
mod session;

pub use backend::{BaseBackend, DeviceBackend};
pub use error::{DeviceError, DeviceResult};
pub use noviflow::NoviflowBackend;
pub use records::{LiveFlow, LiveGroup};
pub use session::{CliSession, SshCliSession, SshTarget};
