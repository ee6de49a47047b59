//! Entity registry and consistency model for flowcheck.
//!
//! This crate owns the canonical picture of one SDN deployment: the
//! switches, links, flows, groups, hosts and controllers that every
//! data source folds into. Entities are found-or-created, never
//! rebuilt, so feeds that arrive in any order and identify the same
//! entity by different keys still land on one record.
//!
//! # Responsibilities
//!
//! - Multi-key switch lookup (name, `openflow:<dpid>`, hex dpid)
//! - Merge accessors (`find_or_create_switch`, per-switch
//!   `link`/`group`/`flow` with cookie fallback)
//! - Per-entity consistency predicates and the [`Report`] they feed
//! - Topology configuration loading (YAML, port auto-assignment)
//!
//! Network I/O never happens here; the controller and device source
//! crates produce typed records and this crate merges and judges them.

mod config;
mod controller;
mod error;
mod flow;
mod group;
mod host;
mod link;
mod report;
mod switch;
mod topology;

pub use config::{
    ControllerConfig, HostConfig, LinkConfig, SwitchConfig, TopologyConfig,
};
pub use controller::ControllerInfo;
pub use error::{ConfigError, ConfigResult};
pub use flow::{Flow, FlowKey, FlowLookup, FlowObservation};
pub use group::{Group, GroupObservation};
pub use host::Host;
pub use link::Link;
pub use report::{Finding, Report};
pub use switch::{Switch, SwitchKind, SwitchState};
pub use topology::Topology;
