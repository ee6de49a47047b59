//! Validates an OpenFlow fabric against its OpenDaylight controllers.
//!
//! The operator declares the intended network in a topology file;
//! controllers and switches each report what they actually hold. The
//! [`Auditor`] merges every source into one registry and checks the
//! accumulated picture, reporting one finding per inconsistency.
//!
//! # Responsibilities
//!
//! - [`Auditor`]: feed loading, the merge, the four validations
//! - [`DeviceManager`]: switch name to CLI backend mapping
//!
//! The binary in `main.rs` wires these to the clap surface; the
//! library form exists so integration tests can drive the engine
//! against mock data sources.

mod auditor;
mod devices;

pub use auditor::Auditor;
pub use devices::DeviceManager;
