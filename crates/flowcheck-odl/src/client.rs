//! RESTCONF client with a per-client response cache.

use crate::feeds::{self, InventoryNode, TopoLink};
use crate::rest::{HttpRestClient, RestFetch};
use flowcheck_topology::ControllerInfo;
use flowcheck_types::NodeId;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The base OpenFlow topology maintained by the controller.
pub const BASE_TOPOLOGY: &str = "flow:1";
/// The segment-routing overlay topology.
pub const SR_TOPOLOGY: &str = "flow:1:sr";

/// Read access to one controller's RESTCONF datastores.
///
/// Responses are cached per URL for the lifetime of the client, so a
/// validation run fetches each document at most once no matter how
/// many feeds consume it. Ownership queries bypass the cache; they
/// must reflect the cluster's current state.
pub struct OdlClient {
    controller: ControllerInfo,
    rest: Arc<dyn RestFetch>,
    cache: Mutex<HashMap<String, Value>>,
}

impl OdlClient {
    pub fn new(controller: ControllerInfo, rest: Arc<dyn RestFetch>) -> Self {
        OdlClient {
            controller,
            rest,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A client talking HTTP to the given controller.
    pub fn connect(controller: &ControllerInfo) -> Result<Self, reqwest::Error> {
        let rest = HttpRestClient::new(controller)?;
        Ok(OdlClient::new(controller.clone(), Arc::new(rest)))
    }

    pub fn controller(&self) -> &ControllerInfo {
        &self.controller
    }

    /// Fetches and decodes one document. Unreachable, empty and
    /// undecodable responses all come back as absent.
    async fn fetch(&self, url: &str, use_cache: bool) -> Option<Value> {
        if use_cache {
            if let Some(hit) = self.cache.lock().get(url) {
                return Some(hit.clone());
            }
        }

        let body = self.rest.get(url).await?;
        if body.is_empty() {
            debug!(url, "empty response body");
            return None;
        }
        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(err) => {
                debug!(url, error = %err, "response is not valid json");
                return None;
            }
        };

        if use_cache {
            self.cache.lock().insert(url.to_string(), value.clone());
        }
        Some(value)
    }

    /// The named topology document from the operational datastore.
    pub async fn topology(&self, name: &str) -> Option<Value> {
        let url = format!(
            "{}/network-topology:network-topology/topology/{}",
            self.controller.operational_url(),
            name
        );
        let data = self.fetch(&url, true).await?;
        data.get("topology")?.as_array()?.first().cloned()
    }

    /// Switch node ids present in the named topology. Host and
    /// anycast entries are not switches and are dropped.
    pub async fn topology_node_ids(&self, name: &str) -> Vec<NodeId> {
        match self.topology(name).await {
            Some(topology) => feeds::parse_topology_node_ids(&topology),
            None => Vec::new(),
        }
    }

    /// Switch-to-switch links present in the named topology.
    pub async fn topology_links(&self, name: &str) -> Vec<TopoLink> {
        match self.topology(name).await {
            Some(topology) => feeds::parse_topology_links(&topology),
            None => Vec::new(),
        }
    }

    /// The config datastore inventory.
    pub async fn config_inventory(&self) -> Vec<InventoryNode> {
        let url = format!("{}/opendaylight-inventory:nodes", self.controller.config_url());
        match self.fetch(&url, true).await {
            Some(data) => feeds::parse_inventory(&data, "group-id"),
            None => Vec::new(),
        }
    }

    /// The operational datastore inventory.
    pub async fn operational_inventory(&self) -> Vec<InventoryNode> {
        let url = format!(
            "{}/opendaylight-inventory:nodes",
            self.controller.operational_url()
        );
        match self.fetch(&url, true).await {
            Some(data) => feeds::parse_inventory(&data, "group-id"),
            None => Vec::new(),
        }
    }

    /// The forwarding manager's mirror of the inventory. Its groups
    /// carry their id under `id` rather than `group-id`.
    pub async fn fm_inventory(&self) -> Vec<InventoryNode> {
        let url = self.controller.operational_fm_url("openflow:nodes");
        match self.fetch(&url, true).await {
            Some(data) => feeds::parse_inventory(&data, "id"),
            None => Vec::new(),
        }
    }

    /// Switches the controller currently holds a channel to, read
    /// from the operational inventory.
    pub async fn connected_node_ids(&self) -> Vec<NodeId> {
        self.operational_inventory()
            .await
            .into_iter()
            .map(|node| node.id)
            .collect()
    }

    /// Computed point-to-point paths.
    pub async fn paths(&self) -> Vec<Value> {
        self.fm_list("path:paths", "paths", "path").await
    }

    /// Computed ethernet lines.
    pub async fn elines(&self) -> Vec<Value> {
        self.fm_list("eline:elines", "elines", "eline").await
    }

    /// Computed tree paths.
    pub async fn treepaths(&self) -> Vec<Value> {
        self.fm_list("tree-path:treepaths", "treepaths", "treepath")
            .await
    }

    /// Computed ethernet trees.
    pub async fn etrees(&self) -> Vec<Value> {
        self.fm_list("etree:etrees", "etrees", "etree").await
    }

    /// Per-node MPLS path programming.
    pub async fn path_mpls_nodes(&self) -> Option<Value> {
        self.fm_node_container("path-mpls:mpls-nodes", "mpls-nodes")
            .await
    }

    /// Per-node MPLS eline programming.
    pub async fn eline_mpls_nodes(&self) -> Option<Value> {
        self.fm_node_container("eline-mpls:eline-nodes", "eline-nodes")
            .await
    }

    /// Per-node segment-routing etree programming.
    pub async fn etree_sr_nodes(&self) -> Option<Value> {
        self.fm_node_container("etree-sr:etree-nodes", "etree-nodes")
            .await
    }

    /// Per-node segment-routing containers embedded in the named
    /// topology's node list.
    pub async fn sr_calculated_containers(&self, name: &str) -> Vec<Value> {
        let Some(topology) = self.topology(name).await else {
            return Vec::new();
        };
        let Some(nodes) = topology.get("node").and_then(Value::as_array) else {
            return Vec::new();
        };
        let container_key = self.controller.fm_container("sr:sr");
        nodes
            .iter()
            .filter_map(|node| node.get(container_key.as_str()).cloned())
            .collect()
    }

    /// The cluster member currently owning the given switch entity,
    /// for example `member-2`. Never served from cache.
    pub async fn entity_owner(&self, node: &NodeId) -> Option<String> {
        let url = format!(
            "{}/entity-owners:entity-owners/entity-type/org.opendaylight.mdsal.ServiceEntityType/entity/%2Fodl-general-entity%3Aentity%5Bodl-general-entity%3Aname%3D%27{}%27%5D",
            self.controller.operational_url(),
            node
        );
        let data = self.fetch(&url, false).await?;
        feeds::parse_entity_owner(&data)
    }

    async fn fm_list(&self, container: &str, outer: &str, inner: &str) -> Vec<Value> {
        let url = self.controller.operational_fm_url(container);
        let Some(data) = self.fetch(&url, true).await else {
            return Vec::new();
        };
        data.get(outer)
            .and_then(|list| list.get(inner))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    async fn fm_node_container(&self, container: &str, key: &str) -> Option<Value> {
        let url = self.controller.operational_fm_url(container);
        let data = self.fetch(&url, true).await?;
        data.get(key).cloned()
    }
}
