//! Controller node identifiers.

use crate::Dpid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node identifier as it appears in controller topology and
/// inventory documents.
///
/// OpenFlow switches show up as `openflow:<decimal dpid>`, hosts as
/// `host:<name>`, and segment-routing anycast groups as `anycast:*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Node id of an OpenFlow switch, `openflow:<decimal>`.
    pub fn openflow(dpid: Dpid) -> Self {
        dpid.node_id()
    }

    /// Node id of a host, `host:<name>`.
    pub fn host(name: &str) -> Self {
        NodeId(format!("host:{name}"))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decimal dpid carried by an `openflow:*` id, if this is one.
    pub fn dpid(&self) -> Option<Dpid> {
        let decimal = self.0.strip_prefix("openflow:")?;
        decimal.parse::<u64>().ok().map(Dpid::new)
    }

    pub fn is_openflow(&self) -> bool {
        self.0.starts_with("openflow:")
    }

    pub fn is_host(&self) -> bool {
        self.0.starts_with("host:")
    }

    pub fn is_anycast(&self) -> bool {
        self.0.starts_with("anycast:")
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_openflow_id() {
        let id = NodeId::openflow(Dpid::new(257));
        assert_eq!(id.as_str(), "openflow:257");
        assert!(id.is_openflow());
        assert!(!id.is_host());
    }

    #[test]
    fn test_host_id() {
        let id = NodeId::host("server-1");
        assert_eq!(id.as_str(), "host:server-1");
        assert!(id.is_host());
    }

    #[test]
    fn test_anycast_id() {
        let id = NodeId::from("anycast:10.0.0.9");
        assert!(id.is_anycast());
        assert!(!id.is_openflow());
    }

    #[test]
    fn test_dpid_extraction() {
        let id = NodeId::from("openflow:31");
        assert_eq!(id.dpid(), Some(Dpid::new(31)));

        assert_eq!(NodeId::from("host:h1").dpid(), None);
        assert_eq!(NodeId::from("openflow:nope").dpid(), None);
    }
}
