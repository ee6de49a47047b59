//! Shape-tolerant extraction of controller feed payloads.
//!
//! Controller documents are schema-loose: container keys may carry a
//! model-name prefix, entries may omit fields, whole sections may be
//! missing. Extraction never errors; records that cannot be read are
//! skipped.

use flowcheck_types::{Cookie, NodeId};
use serde_json::Value;
use tracing::debug;

/// One link record from a topology document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopoLink {
    pub source_node: NodeId,
    pub source_port: String,
    pub dest_node: NodeId,
    pub dest_port: String,
}

/// One node from an inventory document, reduced to the fields the
/// merge consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryNode {
    pub id: NodeId,
    pub groups: Vec<u32>,
    pub tables: Vec<InventoryTable>,
}

/// One flow table within an inventory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryTable {
    pub id: u8,
    pub flows: Vec<FlowEntry>,
}

/// One flow within an inventory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    pub name: String,
    pub cookie: Option<Cookie>,
}

/// A calculated-feed reference to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub node: NodeId,
    pub group: u32,
}

/// A calculated-feed reference to a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRef {
    pub node: NodeId,
    pub table: u8,
    pub name: String,
}

/// Inventory containers appear bare (`group`) or prefixed with the
/// inventory model name (`flow-node-inventory:group`).
fn container<'a>(value: &'a Value, bare: &str) -> Option<&'a Value> {
    value
        .get(bare)
        .or_else(|| value.get(format!("flow-node-inventory:{bare}")))
}

/// Extracts the OpenFlow nodes of an inventory document.
///
/// `group_id_key` names the field carrying the group id; the plain
/// inventories use `group-id` while the forwarding-manager mirror
/// uses `id`.
pub(crate) fn parse_inventory(data: &Value, group_id_key: &str) -> Vec<InventoryNode> {
    let Some(nodes) = data
        .get("nodes")
        .and_then(|nodes| nodes.get("node"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for node in nodes {
        let Some(id) = node.get("id").and_then(Value::as_str) else {
            continue;
        };
        let id = NodeId::from(id);
        if !id.is_openflow() {
            continue;
        }

        let mut groups = Vec::new();
        if let Some(entries) = container(node, "group").and_then(Value::as_array) {
            for group in entries {
                if let Some(group_id) = group
                    .get(group_id_key)
                    .and_then(Value::as_u64)
                    .and_then(|raw| u32::try_from(raw).ok())
                {
                    groups.push(group_id);
                }
            }
        }

        let mut tables = Vec::new();
        if let Some(entries) = container(node, "table").and_then(Value::as_array) {
            for table in entries {
                let Some(table_id) = table
                    .get("id")
                    .and_then(Value::as_u64)
                    .and_then(|raw| u8::try_from(raw).ok())
                else {
                    continue;
                };
                let mut flows = Vec::new();
                if let Some(flow_entries) = container(table, "flow").and_then(Value::as_array) {
                    for flow in flow_entries {
                        let Some(name) = flow.get("id").and_then(Value::as_str) else {
                            continue;
                        };
                        let cookie = flow.get("cookie").and_then(Value::as_u64).map(Cookie::new);
                        flows.push(FlowEntry {
                            name: name.to_string(),
                            cookie,
                        });
                    }
                }
                tables.push(InventoryTable {
                    id: table_id,
                    flows,
                });
            }
        }

        result.push(InventoryNode { id, groups, tables });
    }
    result
}

/// Node ids of a topology document, with host and anycast entries
/// filtered out.
pub(crate) fn parse_topology_node_ids(topology: &Value) -> Vec<NodeId> {
    let Some(nodes) = topology.get("node").and_then(Value::as_array) else {
        return Vec::new();
    };
    nodes
        .iter()
        .filter_map(|node| node.get("node-id").and_then(Value::as_str))
        .map(NodeId::from)
        .filter(|id| !id.is_host() && !id.is_anycast())
        .collect()
}

/// Link records of a topology document, with links touching hosts
/// filtered out.
pub(crate) fn parse_topology_links(topology: &Value) -> Vec<TopoLink> {
    let Some(links) = topology.get("link").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for link in links {
        let source = link.get("source");
        let destination = link.get("destination");
        let fields = (
            source
                .and_then(|s| s.get("source-node"))
                .and_then(Value::as_str),
            source
                .and_then(|s| s.get("source-tp"))
                .and_then(Value::as_str),
            destination
                .and_then(|d| d.get("dest-node"))
                .and_then(Value::as_str),
            destination
                .and_then(|d| d.get("dest-tp"))
                .and_then(Value::as_str),
        );
        let (Some(source_node), Some(source_port), Some(dest_node), Some(dest_port)) = fields
        else {
            debug!("skipping malformed topology link record");
            continue;
        };

        let source_node = NodeId::from(source_node);
        let dest_node = NodeId::from(dest_node);
        if source_node.is_host() || dest_node.is_host() {
            continue;
        }
        result.push(TopoLink {
            source_node,
            source_port: source_port.to_string(),
            dest_node,
            dest_port: dest_port.to_string(),
        });
    }
    result
}

/// Group references of one calculated payload.
pub fn calculated_group_refs(data: &Value) -> Vec<GroupRef> {
    let Some(groups) = data
        .get("calculated-groups")
        .and_then(|groups| groups.get("calculated-group"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    groups
        .iter()
        .filter_map(|group| {
            let node = group.get("node-id").and_then(Value::as_str)?;
            let id = group
                .get("group-id")
                .and_then(Value::as_u64)
                .and_then(|raw| u32::try_from(raw).ok())?;
            Some(GroupRef {
                node: NodeId::from(node),
                group: id,
            })
        })
        .collect()
}

/// Flow references of one calculated payload.
///
/// Payloads either carry `calculated-flows` directly or nest one such
/// container per node under `calculated-flow-nodes`.
pub fn calculated_flow_refs(data: &Value) -> Vec<FlowRef> {
    let mut refs = Vec::new();
    if let Some(nodes) = data
        .get("calculated-flow-nodes")
        .and_then(|nodes| nodes.get("calculated-flow-node"))
        .and_then(Value::as_array)
    {
        for node in nodes {
            collect_flow_refs(node, &mut refs);
        }
    } else {
        collect_flow_refs(data, &mut refs);
    }
    refs
}

fn collect_flow_refs(data: &Value, refs: &mut Vec<FlowRef>) {
    let Some(flows) = data
        .get("calculated-flows")
        .and_then(|flows| flows.get("calculated-flow"))
        .and_then(Value::as_array)
    else {
        return;
    };
    for flow in flows {
        let fields = (
            flow.get("node-id").and_then(Value::as_str),
            flow.get("flow-name").and_then(Value::as_str),
            flow.get("table-id")
                .and_then(Value::as_u64)
                .and_then(|raw| u8::try_from(raw).ok()),
        );
        let (Some(node), Some(name), Some(table)) = fields else {
            continue;
        };
        refs.push(FlowRef {
            node: NodeId::from(node),
            table,
            name: name.to_string(),
        });
    }
}

/// Owner string of an entity-owners query response.
pub(crate) fn parse_entity_owner(data: &Value) -> Option<String> {
    data.get("entity")?
        .as_array()?
        .first()?
        .get("owner")?
        .as_str()
        .map(str::to_string)
}
