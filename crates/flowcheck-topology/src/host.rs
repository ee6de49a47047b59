//! End-host entities.

use flowcheck_types::NodeId;

/// An end host attached to a switch port.
///
/// Hosts only participate in link endpoint resolution; no state is
/// validated on them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub openflow_name: NodeId,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let openflow_name = NodeId::host(&name);
        Host {
            name,
            openflow_name,
        }
    }
}
