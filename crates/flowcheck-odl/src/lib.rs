//! OpenDaylight RESTCONF data source for flowcheck.
//!
//! Everything the controller cluster can tell us comes through here:
//! topology documents, the config/operational inventories, the
//! forwarding-manager mirror and computed feeds, and the cluster's
//! entity-ownership records.
//!
//! # Responsibilities
//!
//! - [`RestFetch`]: the transport seam (HTTP GET, body or absent)
//! - [`OdlClient`]: URL construction, per-client response cache, JSON
//!   decoding with absent-on-anything semantics
//! - Typed, shape-tolerant extraction of every consumed feed
//!
//! A feed that is unreachable, non-200, empty or malformed yields
//! absent data, logged at debug. Nothing here errors on controller
//! behavior; only client construction can fail.

mod client;
mod feeds;
mod rest;

pub use client::{OdlClient, BASE_TOPOLOGY, SR_TOPOLOGY};
pub use feeds::{
    calculated_flow_refs, calculated_group_refs, FlowEntry, FlowRef, GroupRef, InventoryNode,
    InventoryTable, TopoLink,
};
pub use rest::{HttpRestClient, RestFetch};
