//! Common flowcheck types for SDN network-state validation.
//!
//! This crate provides type-safe representations of the identifiers the
//! flowcheck audit pipeline works with:
//!
//! - [`Dpid`]: 64-bit OpenFlow datapath identifiers
//! - [`NodeId`]: controller node identifiers (`openflow:*`, `host:*`)
//! - [`Cookie`]: OpenFlow flow cookies
//! - [`MastershipRole`]: per-controller OpenFlow channel roles
//! - [`MemberIndex`]: 1-based cluster member ordinals

mod cookie;
mod dpid;
mod node;
mod role;

pub use cookie::Cookie;
pub use dpid::Dpid;
pub use node::NodeId;
pub use role::{MastershipRole, MemberIndex};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid datapath id: {0}")]
    InvalidDpid(String),

    #[error("invalid flow cookie: {0}")]
    InvalidCookie(String),

    #[error("invalid cluster member id: {0}")]
    InvalidMemberIndex(String),
}
