//! The entity registry: switches, hosts, controllers and their lookups.

use crate::{
    ControllerInfo, Host, LinkConfig, Switch, SwitchKind, TopologyConfig,
};
use flowcheck_types::NodeId;
use rand::seq::IteratorRandom;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// The registry every data source folds into.
///
/// Switches live in an arena indexed three ways (configured name,
/// `openflow:<dpid>` name, hex dpid) so any feed's spelling of a
/// switch resolves to the same instance. Entities are only ever
/// created and enriched during a run, never removed.
pub struct Topology {
    switches: Vec<Arc<Switch>>,
    by_name: HashMap<String, usize>,
    by_openflow_name: HashMap<String, usize>,
    by_dpid: HashMap<String, usize>,
    hosts: Vec<Host>,
    hosts_by_name: HashMap<String, usize>,
    hosts_by_openflow_name: HashMap<String, usize>,
    controllers: BTreeMap<String, ControllerInfo>,
    default_ctrl: ControllerInfo,
}

impl Topology {
    /// Builds the registry from a configuration document.
    ///
    /// Declared hosts, switches and links are registered up front;
    /// feeds enrich them later. With no controllers configured one is
    /// synthesized with stock settings. One controller is picked at
    /// random as the read endpoint for the run; cluster members are
    /// equivalent for reads, so this just spreads load across runs.
    pub fn from_config(config: &TopologyConfig) -> Self {
        let mut controllers = BTreeMap::new();
        for ctrl in &config.controller {
            controllers.insert(
                ctrl.name.clone(),
                ctrl.to_info(config.controller_vip.as_ref()),
            );
        }
        if controllers.is_empty() {
            let mut info = ControllerInfo::with_defaults("c0");
            info.vip = config.controller_vip.clone();
            controllers.insert(info.name.clone(), info);
        }
        let default_ctrl = controllers
            .values()
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| ControllerInfo::with_defaults("c0"));
        debug!(controller = %default_ctrl.name, "selected default controller");

        let mut topology = Topology {
            switches: Vec::new(),
            by_name: HashMap::new(),
            by_openflow_name: HashMap::new(),
            by_dpid: HashMap::new(),
            hosts: Vec::new(),
            hosts_by_name: HashMap::new(),
            hosts_by_openflow_name: HashMap::new(),
            controllers,
            default_ctrl,
        };

        for host in &config.host {
            topology.add_host(Host::new(&host.name));
        }
        for switch in &config.switch {
            if topology.find_switch(&switch.name).is_some() {
                warn!(switch = %switch.name, "duplicate switch in configuration, keeping first");
                continue;
            }
            topology.add_switch(Switch::new(
                &switch.name,
                switch.dpid,
                SwitchKind::from_config_name(switch.kind.as_deref()),
                true,
            ));
        }
        topology.declare_links(&config.link);

        topology
    }

    /// An empty registry with a stock controller, mostly for tests.
    pub fn empty() -> Self {
        Topology::from_config(&TopologyConfig::default())
    }

    fn add_switch(&mut self, switch: Switch) -> Arc<Switch> {
        let switch = Arc::new(switch);
        let index = self.switches.len();
        self.by_name.insert(switch.name.clone(), index);
        self.by_openflow_name
            .insert(switch.openflow_name.as_str().to_string(), index);
        self.by_dpid.insert(switch.dpid.to_string(), index);
        self.switches.push(Arc::clone(&switch));
        switch
    }

    /// Resolves a switch through the key schemes in priority order:
    /// configured name, `openflow:*` name, bare decimal dpid with the
    /// prefix applied, hex dpid.
    pub fn find_switch(&self, key: &str) -> Option<&Arc<Switch>> {
        let index = self
            .by_name
            .get(key)
            .or_else(|| self.by_openflow_name.get(key))
            .or_else(|| self.by_openflow_name.get(&format!("openflow:{key}")))
            .or_else(|| self.by_dpid.get(key))?;
        self.switches.get(*index)
    }

    /// Resolves a switch, synthesizing one from an `openflow:<dpid>`
    /// feed id on first reference. Ids that are not OpenFlow node ids
    /// resolve to nothing.
    pub fn find_or_create_switch(&mut self, node: &NodeId) -> Option<Arc<Switch>> {
        if let Some(existing) = self.find_switch(node.as_str()) {
            return Some(Arc::clone(existing));
        }
        match Switch::from_openflow_name(node) {
            Some(switch) => {
                debug!(node = %node, "discovered switch not present in configuration");
                Some(self.add_switch(switch))
            }
            None => {
                debug!(node = %node, "ignoring non-openflow node id");
                None
            }
        }
    }

    pub fn switches(&self) -> impl Iterator<Item = &Arc<Switch>> {
        self.switches.iter()
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    fn add_host(&mut self, host: Host) {
        let index = self.hosts.len();
        self.hosts_by_name.insert(host.name.clone(), index);
        self.hosts_by_openflow_name
            .insert(host.openflow_name.as_str().to_string(), index);
        self.hosts.push(host);
    }

    /// Resolves a host by name, `host:*` id, or bare name with the
    /// prefix applied.
    pub fn find_host(&self, key: &str) -> Option<&Host> {
        let index = self
            .hosts_by_name
            .get(key)
            .or_else(|| self.hosts_by_openflow_name.get(key))
            .or_else(|| self.hosts_by_openflow_name.get(&format!("host:{key}")))?;
        self.hosts.get(*index)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter()
    }

    pub fn controller(&self, name: &str) -> Option<&ControllerInfo> {
        self.controllers.get(name)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerInfo> {
        self.controllers.values()
    }

    /// The controller all read queries in this run go through.
    pub fn default_controller(&self) -> &ControllerInfo {
        &self.default_ctrl
    }

    /// Registers declared links on their endpoint switches. Ports not
    /// spelled out are drawn per switch in declaration order starting
    /// at 1. Switch-to-switch links register on both endpoints;
    /// switch-to-host links only on the switch side.
    fn declare_links(&mut self, links: &[LinkConfig]) {
        let mut next_ports: HashMap<String, u32> = HashMap::new();

        for link in links {
            let src_switch = self.find_switch(&link.source).cloned();
            let dst_switch = self.find_switch(&link.destination).cloned();
            let src_host = match src_switch {
                None => self.find_host(&link.source).cloned(),
                Some(_) => None,
            };
            let dst_host = match dst_switch {
                None => self.find_host(&link.destination).cloned(),
                Some(_) => None,
            };

            let src_port = src_switch.as_ref().map(|switch| {
                link.source_port
                    .unwrap_or_else(|| next_port(&mut next_ports, switch.openflow_name.as_str()))
            });
            let dst_port = dst_switch.as_ref().map(|switch| {
                link.destination_port
                    .unwrap_or_else(|| next_port(&mut next_ports, switch.openflow_name.as_str()))
            });

            match (&src_switch, &dst_switch, &src_host, &dst_host) {
                (Some(src), Some(dst), _, _) => {
                    let src_id = port_id(src, src_port);
                    let dst_id = port_id(dst, dst_port);
                    src.state().link(&src_id).declare_destination(&dst_id);
                    dst.state().link(&dst_id).declare_destination(&src_id);
                }
                (Some(src), None, _, Some(host)) => {
                    src.state()
                        .link(&port_id(src, src_port))
                        .declare_destination(host.openflow_name.as_str());
                }
                (None, Some(dst), Some(host), _) => {
                    dst.state()
                        .link(&port_id(dst, dst_port))
                        .declare_destination(host.openflow_name.as_str());
                }
                _ => {
                    warn!(
                        source = %link.source,
                        destination = %link.destination,
                        "link endpoint not found in configuration, skipping"
                    );
                }
            }
        }
    }
}

fn next_port(next_ports: &mut HashMap<String, u32>, switch: &str) -> u32 {
    let counter = next_ports.entry(switch.to_string()).or_insert(1);
    let port = *counter;
    *counter += 1;
    port
}

fn port_id(switch: &Switch, port: Option<u32>) -> String {
    // Port is always assigned for a resolved switch endpoint.
    let port = port.unwrap_or(0);
    format!("{}:{}", switch.openflow_name, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(text: &str) -> TopologyConfig {
        serde_yaml::from_str(text).unwrap()
    }

    fn three_switch_config() -> TopologyConfig {
        config(
            r#"
switch:
  - name: s1
    dpid: "0x1"
  - name: s2
    dpid: "0x2"
  - name: s3
    dpid: "0x1f"
host:
  - name: h1
link:
  - source: s1
    destination: s2
  - source: s1
    destination: h1
  - source: h1
    destination: s3
"#,
        )
    }

    #[test]
    fn test_lookup_by_any_key_scheme_resolves_same_switch() {
        let topology = Topology::from_config(&three_switch_config());

        let by_name = topology.find_switch("s3").unwrap();
        let by_openflow = topology.find_switch("openflow:31").unwrap();
        let by_bare_decimal = topology.find_switch("31").unwrap();
        let by_dpid = topology.find_switch("0x1f").unwrap();

        assert!(Arc::ptr_eq(by_name, by_openflow));
        assert!(Arc::ptr_eq(by_name, by_bare_decimal));
        assert!(Arc::ptr_eq(by_name, by_dpid));
    }

    #[test]
    fn test_find_or_create_synthesizes_once() {
        let mut topology = Topology::empty();
        let node = NodeId::from("openflow:42");

        let first = topology.find_or_create_switch(&node).unwrap();
        let second = topology.find_or_create_switch(&node).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(topology.switch_count(), 1);
        assert!(!first.expected);
    }

    #[test]
    fn test_find_or_create_rejects_non_openflow_ids() {
        let mut topology = Topology::empty();
        assert!(topology
            .find_or_create_switch(&NodeId::from("host:h1"))
            .is_none());
        assert_eq!(topology.switch_count(), 0);
    }

    #[test]
    fn test_default_controller_synthesized_when_unconfigured() {
        let topology = Topology::empty();
        let ctrl = topology.default_controller();
        assert_eq!(ctrl.name, "c0");
        assert_eq!(ctrl.port, 8181);
    }

    #[test]
    fn test_controller_vip_applies_to_synthesized_controller() {
        let topology = Topology::from_config(&config("controller_vip: 10.0.0.5"));
        assert_eq!(
            topology.default_controller().vip.as_deref(),
            Some("10.0.0.5")
        );
    }

    #[test]
    fn test_links_register_on_both_switch_endpoints() {
        let topology = Topology::from_config(&three_switch_config());

        let s1 = topology.find_switch("s1").unwrap();
        let s2 = topology.find_switch("s2").unwrap();

        assert_eq!(
            s1.state().link("openflow:1:1").destination.as_deref(),
            Some("openflow:2:1")
        );
        assert_eq!(
            s2.state().link("openflow:2:1").destination.as_deref(),
            Some("openflow:1:1")
        );
    }

    #[test]
    fn test_host_links_register_on_switch_side_only() {
        let topology = Topology::from_config(&three_switch_config());

        // Second link on s1 draws the next port.
        let s1 = topology.find_switch("s1").unwrap();
        assert_eq!(
            s1.state().link("openflow:1:2").destination.as_deref(),
            Some("host:h1")
        );

        // Host-to-switch declaration registers on the switch too.
        let s3 = topology.find_switch("s3").unwrap();
        assert_eq!(
            s3.state().link("openflow:31:1").destination.as_deref(),
            Some("host:h1")
        );
    }

    #[test]
    fn test_host_lookup_schemes() {
        let topology = Topology::from_config(&three_switch_config());
        assert!(topology.find_host("h1").is_some());
        assert!(topology.find_host("host:h1").is_some());
        assert!(topology.find_host("h2").is_none());
    }
}
