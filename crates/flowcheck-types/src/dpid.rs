//! OpenFlow datapath identifier with hex parsing.

use crate::{NodeId, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 64-bit OpenFlow datapath identifier.
///
/// Controllers name switches `openflow:<decimal dpid>`; switch
/// configuration and CLI output carry the hexadecimal form, with or
/// without a `0x` prefix. [`FromStr`] accepts both hex spellings.
///
/// # Examples
///
/// ```
/// use flowcheck_types::Dpid;
///
/// let dpid: Dpid = "0x101".parse().unwrap();
/// assert_eq!(dpid.as_u64(), 257);
/// assert_eq!(dpid.node_id().as_str(), "openflow:257");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dpid(u64);

impl Dpid {
    /// Creates a datapath id from its raw value.
    pub const fn new(raw: u64) -> Self {
        Dpid(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the controller-side node id, `openflow:<decimal>`.
    pub fn node_id(&self) -> NodeId {
        NodeId::from(format!("openflow:{}", self.0))
    }
}

impl fmt::Display for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for Dpid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        u64::from_str_radix(hex, 16)
            .map(Dpid)
            .map_err(|_| ParseError::InvalidDpid(s.to_string()))
    }
}

impl TryFrom<String> for Dpid {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Dpid> for String {
    fn from(dpid: Dpid) -> String {
        dpid.to_string()
    }
}

impl From<u64> for Dpid {
    fn from(raw: u64) -> Self {
        Dpid(raw)
    }
}
