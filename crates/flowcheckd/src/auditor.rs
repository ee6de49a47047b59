//! The reconciliation engine.
//!
//! Every validation follows the same shape: pull the relevant feeds,
//! fold them into the topology registry, then walk the registry and
//! check each entity's accumulated picture. Feeds only ever add
//! annotations, so validations can run back to back on one registry
//! and later sources refine, never erase, earlier ones.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use flowcheck_device::DeviceBackend;
use flowcheck_odl::{
    calculated_flow_refs, calculated_group_refs, InventoryNode, OdlClient, BASE_TOPOLOGY,
    SR_TOPOLOGY,
};
use flowcheck_topology::{
    FlowLookup, FlowObservation, GroupObservation, Report, Switch, Topology,
};
use flowcheck_types::{MastershipRole, MemberIndex};

use crate::devices::DeviceManager;

/// Which inventory facet a fold pass is recording.
#[derive(Clone, Copy)]
enum InventoryFacet {
    Config,
    Operational,
    Fm,
}

/// Merges controller and switch state into the topology registry and
/// validates the result.
pub struct Auditor {
    topology: Topology,
    client: OdlClient,
    devices: DeviceManager,
}

impl Auditor {
    pub fn new(topology: Topology, client: OdlClient, devices: DeviceManager) -> Self {
        Auditor {
            topology,
            client,
            devices,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Checks switch presence across the base topology, the SR
    /// topology and the connected-nodes view.
    #[instrument(skip(self))]
    pub async fn validate_nodes(&mut self, expect_up: bool, include_sr: bool) -> Report {
        self.load_nodes().await;
        let mut report = Report::new();
        for switch in self.topology.switches() {
            switch.check_presence(expect_up, include_sr, &mut report);
        }
        report
    }

    /// Checks every known link's observed peers against the expected
    /// ones.
    #[instrument(skip(self))]
    pub async fn validate_links(&mut self, expect_up: bool, include_sr: bool) -> Report {
        self.load_links().await;
        let mut report = Report::new();
        for switch in self.topology.switches() {
            let state = switch.state();
            for link in state.links() {
                link.check(expect_up, include_sr, &mut report);
            }
        }
        report
    }

    /// Merges groups and flows from every source and checks facet
    /// consistency per element.
    #[instrument(skip(self))]
    pub async fn validate_openflow_elements(&mut self, check_stats: bool) -> Report {
        self.load_openflow_elements().await;
        let mut report = Report::new();
        for switch in self.topology.switches() {
            let label = switch.label();
            let state = switch.state();
            for group in state.groups() {
                group.check(check_stats, &label, &mut report);
            }
            for flow in state.flows() {
                flow.check(check_stats, &label, &mut report);
            }
        }
        report
    }

    /// Checks that the cluster member owning each switch holds the
    /// master role on that switch.
    #[instrument(skip(self))]
    pub async fn validate_node_roles(&mut self) -> Report {
        let mut report = Report::new();
        for switch in self.topology.switches() {
            let backend = self.devices.backend_for(&switch.name);
            let roles = match backend.list_controller_roles().await {
                Ok(Some(roles)) => roles
                    .iter()
                    .map(|role| MastershipRole::from(role.as_str()))
                    .collect(),
                Ok(None) => Vec::new(),
                Err(err) => {
                    debug!(switch = %switch.label(), error = %err, "no role data");
                    Vec::new()
                }
            };
            let owner = self.client.entity_owner(&switch.openflow_name).await;
            check_node_roles(switch, &roles, owner.as_deref(), &mut report);
        }
        report
    }

    /// Runs all four validations in sequence on one registry.
    #[instrument(skip(self))]
    pub async fn validate_all(&mut self, check_stats: bool) -> Report {
        let mut report = self.validate_nodes(true, true).await;
        report.merge(self.validate_links(true, true).await);
        report.merge(self.validate_openflow_elements(check_stats).await);
        report.merge(self.validate_node_roles().await);
        report
    }

    async fn load_nodes(&mut self) {
        for node in self.client.topology_node_ids(BASE_TOPOLOGY).await {
            if let Some(switch) = self.topology.find_or_create_switch(&node) {
                switch.state().found_openflow_topology = true;
            }
        }
        for node in self.client.topology_node_ids(SR_TOPOLOGY).await {
            if let Some(switch) = self.topology.find_or_create_switch(&node) {
                switch.state().found_sr_topology = true;
            }
        }
        for node in self.client.connected_node_ids().await {
            if let Some(switch) = self.topology.find_or_create_switch(&node) {
                switch.state().found_connected = true;
            }
        }
        debug!(switches = self.topology.switch_count(), "node feeds merged");
    }

    async fn load_links(&mut self) {
        for link in self.client.topology_links(BASE_TOPOLOGY).await {
            if let Some(switch) = self.topology.find_or_create_switch(&link.source_node) {
                switch
                    .state()
                    .link(&link.source_port)
                    .observe_openflow_destination(&link.dest_port);
            }
        }
        for link in self.client.topology_links(SR_TOPOLOGY).await {
            if let Some(switch) = self.topology.find_or_create_switch(&link.source_node) {
                switch
                    .state()
                    .link(&link.source_port)
                    .observe_sr_destination(&link.dest_port);
            }
        }
    }

    /// Source order matters only for readability of the result; the
    /// merge itself is additive. Controller inventories first, then
    /// the live poll, then the calculated feeds.
    async fn load_openflow_elements(&mut self) {
        let nodes = self.client.config_inventory().await;
        self.fold_inventory(nodes, InventoryFacet::Config);
        let nodes = self.client.operational_inventory().await;
        self.fold_inventory(nodes, InventoryFacet::Operational);
        let nodes = self.client.fm_inventory().await;
        self.fold_inventory(nodes, InventoryFacet::Fm);

        self.poll_switches().await;

        for container in self.client.sr_calculated_containers(SR_TOPOLOGY).await {
            self.mark_calculated(&container);
        }
        for path in self.client.paths().await {
            self.mark_calculated(&path);
        }
        for eline in self.client.elines().await {
            self.mark_calculated(&eline);
        }
        for treepath in self.client.treepaths().await {
            self.mark_calculated(&treepath);
        }
        for etree in self.client.etrees().await {
            self.mark_calculated(&etree);
        }
        if let Some(nodes) = self.client.path_mpls_nodes().await {
            self.mark_calculated(&nodes);
        }
        if let Some(nodes) = self.client.etree_sr_nodes().await {
            self.mark_calculated(&nodes);
        }
        if let Some(nodes) = self.client.eline_mpls_nodes().await {
            self.mark_calculated(&nodes);
        }
    }

    fn fold_inventory(&mut self, nodes: Vec<InventoryNode>, facet: InventoryFacet) {
        for node in nodes {
            let Some(switch) = self.topology.find_or_create_switch(&node.id) else {
                continue;
            };
            let mut state = switch.state();
            for group_id in node.groups {
                let group = state.group(group_id);
                match facet {
                    InventoryFacet::Config => group.record_config(),
                    InventoryFacet::Operational => group.record_operational(),
                    InventoryFacet::Fm => group.record_fm(),
                }
            }
            for table in node.tables {
                for entry in table.flows {
                    let observation = FlowObservation::with_cookie(entry.cookie);
                    let flow = state.flow(FlowLookup::Named {
                        table: table.id,
                        name: entry.name,
                        cookie: entry.cookie,
                    });
                    match facet {
                        InventoryFacet::Config => flow.record_config(observation),
                        InventoryFacet::Operational => flow.record_operational(observation),
                        InventoryFacet::Fm => flow.record_fm(observation),
                    }
                }
            }
        }
    }

    /// Marks the groups and flows one calculated payload references.
    /// References to switches no source has reported are dropped.
    fn mark_calculated(&self, data: &Value) {
        for group_ref in calculated_group_refs(data) {
            if let Some(switch) = self.topology.find_switch(group_ref.node.as_str()) {
                switch.state().group(group_ref.group).mark_calculated();
            }
        }
        for flow_ref in calculated_flow_refs(data) {
            if let Some(switch) = self.topology.find_switch(flow_ref.node.as_str()) {
                switch
                    .state()
                    .flow(FlowLookup::Named {
                        table: flow_ref.table,
                        name: flow_ref.name,
                        cookie: None,
                    })
                    .mark_calculated();
            }
        }
    }

    /// Polls every switch concurrently, one task per switch. Each
    /// worker writes only to its own switch's state, and a worker
    /// failing or panicking costs that switch's live data only.
    async fn poll_switches(&self) {
        let mut handles = Vec::new();
        for switch in self.topology.switches() {
            let backend = self.devices.backend_for(&switch.name);
            let switch = Arc::clone(switch);
            handles.push(tokio::spawn(poll_one_switch(switch, backend)));
        }
        for handle in handles {
            if let Err(err) = handle.await {
                debug!(error = %err, "switch poll task aborted");
            }
        }
    }
}

async fn poll_one_switch(switch: Arc<Switch>, backend: Arc<dyn DeviceBackend>) {
    match backend.list_live_groups().await {
        Ok(Some(groups)) => {
            let mut state = switch.state();
            for group in groups {
                state.group(group.id).record_live(GroupObservation {
                    packets: group.packets,
                    bytes: group.bytes,
                });
            }
        }
        Ok(None) => debug!(switch = %switch.label(), "no live group data"),
        Err(err) if err.is_unsupported() => warn!(switch = %switch.label(), "{err}"),
        Err(err) => debug!(switch = %switch.label(), "{err}"),
    }

    match backend.list_live_flows().await {
        Ok(Some(flows)) => {
            let mut state = switch.state();
            for flow in flows {
                let Some(cookie) = flow.cookie else {
                    debug!(switch = %switch.label(), flow = %flow.id, "live flow without a cookie");
                    continue;
                };
                state
                    .flow(FlowLookup::ByCookie {
                        table: flow.table,
                        cookie,
                    })
                    .record_live(FlowObservation {
                        cookie: Some(cookie),
                        packets: flow.packets,
                        bytes: flow.bytes,
                    });
            }
        }
        Ok(None) => debug!(switch = %switch.label(), "no live flow data"),
        Err(err) if err.is_unsupported() => warn!(switch = %switch.label(), "{err}"),
        Err(err) => debug!(switch = %switch.label(), "{err}"),
    }
}

/// The ownership arithmetic: the owner string names a cluster member,
/// `member-N`, and the switch's role list is ordered by member, so
/// the role at position N-1 must be master. A switch holding no
/// master at all is reported independently of the positional check.
fn check_node_roles(
    switch: &Switch,
    roles: &[MastershipRole],
    owner: Option<&str>,
    report: &mut Report,
) -> bool {
    report.note_checked();
    let label = switch.label();
    let roles_text = roles_label(roles);
    let mut ok = true;

    if owner.is_some() && !roles.is_empty() && !roles.iter().any(MastershipRole::is_master) {
        report.fail(
            &label,
            format!("no master role on the switch, roles {roles_text}"),
        );
        ok = false;
    }

    let Some(owner) = owner else {
        report.fail(
            &label,
            format!("controller reports no owner for the node, roles {roles_text}"),
        );
        return false;
    };
    if roles.is_empty() {
        report.fail(&label, format!("switch reports no roles, owner {owner}"));
        return false;
    }

    match owner.parse::<MemberIndex>() {
        Err(_) => {
            report.fail(
                &label,
                format!("cannot find a member id in owner {owner}, roles {roles_text}"),
            );
            false
        }
        Ok(member) => match member.position(roles.len()) {
            None => {
                report.fail(
                    &label,
                    format!(
                        "owner member id {} ({owner}) is out of range, roles {roles_text}",
                        member.as_u32()
                    ),
                );
                false
            }
            Some(position) if !roles[position].is_master() => {
                report.fail(
                    &label,
                    format!(
                        "member {} ({owner}) is not master on the switch, roles {roles_text}",
                        member.as_u32()
                    ),
                );
                false
            }
            Some(_) => ok,
        },
    }
}

fn roles_label(roles: &[MastershipRole]) -> String {
    let joined = roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcheck_topology::SwitchKind;
    use flowcheck_types::Dpid;
    use pretty_assertions::assert_eq;

    fn switch() -> Switch {
        Switch::new("s1", Dpid::new(1), SwitchKind::Base, true)
    }

    fn roles(names: &[&str]) -> Vec<MastershipRole> {
        names.iter().map(|name| MastershipRole::from(*name)).collect()
    }

    #[test]
    fn test_roles_pass_when_owner_position_is_master() {
        let mut report = Report::new();
        let ok = check_node_roles(
            &switch(),
            &roles(&["slave", "master", "slave"]),
            Some("member-2"),
            &mut report,
        );
        assert!(ok);
        assert!(report.passed());
        assert_eq!(report.entities_checked(), 1);
    }

    #[test]
    fn test_roles_fail_without_owner() {
        let mut report = Report::new();
        let ok = check_node_roles(&switch(), &roles(&["master"]), None, &mut report);
        assert!(!ok);
        assert_eq!(report.findings().len(), 1);
    }

    #[test]
    fn test_roles_fail_with_owner_but_no_roles() {
        let mut report = Report::new();
        assert!(!check_node_roles(&switch(), &[], Some("member-1"), &mut report));
        assert_eq!(report.findings().len(), 1);
    }

    #[test]
    fn test_roles_fail_on_unparseable_owner() {
        let mut report = Report::new();
        assert!(!check_node_roles(
            &switch(),
            &roles(&["master"]),
            Some("octopus"),
            &mut report
        ));
        assert!(report.findings()[0].detail.contains("cannot find a member id"));
    }

    #[test]
    fn test_roles_fail_on_out_of_range_member() {
        let mut report = Report::new();
        assert!(!check_node_roles(
            &switch(),
            &roles(&["master", "slave"]),
            Some("member-4"),
            &mut report
        ));
        assert!(report.findings()[0].detail.contains("out of range"));
    }

    #[test]
    fn test_roles_double_finding_when_no_master_anywhere() {
        let mut report = Report::new();
        let ok = check_node_roles(
            &switch(),
            &roles(&["slave", "slave"]),
            Some("member-1"),
            &mut report,
        );
        assert!(!ok);
        // missing master on the switch plus the positional mismatch
        assert_eq!(report.findings().len(), 2);
    }

    #[test]
    fn test_roles_positional_mismatch_with_master_elsewhere() {
        let mut report = Report::new();
        assert!(!check_node_roles(
            &switch(),
            &roles(&["master", "slave"]),
            Some("member-2"),
            &mut report
        ));
        assert_eq!(report.findings().len(), 1);
        assert!(report.findings()[0].detail.contains("not master"));
    }

    #[test]
    fn test_roles_label_rendering() {
        assert_eq!(roles_label(&roles(&["master", "slave"])), "[master, slave]");
        assert_eq!(roles_label(&[]), "[]");
    }
}
