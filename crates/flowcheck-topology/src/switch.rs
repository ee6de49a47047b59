//! Switch entities and their per-switch mutable state.

use crate::{Flow, FlowKey, FlowLookup, Group, Link, Report};
use flowcheck_types::{Cookie, Dpid, NodeId};
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeMap, HashMap};

/// Capability set of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwitchKind {
    /// Vendor-neutral switch; no live-query capability.
    #[default]
    Base,
    /// NoviFlow switch; live flows, groups and roles over its CLI.
    Noviflow,
}

impl SwitchKind {
    /// Maps the configuration `type` field to a kind. Unknown or
    /// missing values fall back to the base kind.
    pub fn from_config_name(name: Option<&str>) -> Self {
        match name {
            Some(n) if n.eq_ignore_ascii_case("noviflow") => SwitchKind::Noviflow,
            _ => SwitchKind::Base,
        }
    }
}

/// One switch: immutable identity plus lockable merge state.
///
/// Identity never changes after creation; everything the data sources
/// report lands in [`SwitchState`] behind the switch's own mutex, so
/// concurrent polling workers touching different switches never
/// contend.
#[derive(Debug)]
pub struct Switch {
    pub name: String,
    pub openflow_name: NodeId,
    pub dpid: Dpid,
    pub kind: SwitchKind,
    /// Declared in configuration, as opposed to synthesized from a
    /// controller feed.
    pub expected: bool,
    state: Mutex<SwitchState>,
}

impl Switch {
    pub fn new(name: impl Into<String>, dpid: Dpid, kind: SwitchKind, expected: bool) -> Self {
        Switch {
            name: name.into(),
            openflow_name: dpid.node_id(),
            dpid,
            kind,
            expected,
            state: Mutex::new(SwitchState::default()),
        }
    }

    /// Synthesizes a switch from an `openflow:<dpid>` id seen in a
    /// controller feed. The feed id doubles as the name.
    pub fn from_openflow_name(node: &NodeId) -> Option<Self> {
        let dpid = node.dpid()?;
        Some(Switch::new(
            node.as_str(),
            dpid,
            SwitchKind::Base,
            false,
        ))
    }

    /// `name (openflow-name)`, the label findings use.
    pub fn label(&self) -> String {
        format!("switch {} ({})", self.name, self.openflow_name)
    }

    pub fn state(&self) -> MutexGuard<'_, SwitchState> {
        self.state.lock()
    }

    /// Checks topology membership against the expectation.
    pub fn check_presence(&self, expect_up: bool, include_sr: bool, report: &mut Report) -> bool {
        report.note_checked();
        let subject = self.label();
        let state = self.state();
        let mut ok = true;

        if expect_up {
            if !state.found_openflow_topology {
                report.fail(
                    &subject,
                    format!(
                        "not found in openflow topology (connected: {})",
                        state.found_connected
                    ),
                );
                ok = false;
            }
            if include_sr && !state.found_sr_topology {
                report.fail(&subject, "not found in segment routing topology");
                ok = false;
            }
        } else {
            if state.found_openflow_topology {
                report.fail(&subject, "still present in openflow topology");
                ok = false;
            }
            if include_sr && state.found_sr_topology {
                report.fail(&subject, "still present in segment routing topology");
                ok = false;
            }
        }

        ok
    }
}

/// Mutable per-switch state: discovery flags and the owned link,
/// group and flow collections.
#[derive(Debug, Default)]
pub struct SwitchState {
    pub found_openflow_topology: bool,
    pub found_sr_topology: bool,
    pub found_connected: bool,
    links: BTreeMap<String, Link>,
    groups: BTreeMap<u32, Group>,
    flows: BTreeMap<FlowKey, Flow>,
    cookie_index: HashMap<(Option<u8>, Cookie), FlowKey>,
}

impl SwitchState {
    /// Find-or-create by local port id.
    pub fn link(&mut self, source: &str) -> &mut Link {
        self.links
            .entry(source.to_string())
            .or_insert_with(|| Link::new(source))
    }

    /// Find-or-create by group id.
    pub fn group(&mut self, id: u32) -> &mut Group {
        self.groups.entry(id).or_insert_with(|| Group::new(id))
    }

    /// Find-or-create with the cookie-fallback merge rule.
    ///
    /// Named lookups register their cookie so a later cookie-only
    /// lookup lands on the same flow. A flow first created by cookie
    /// is re-keyed when a named source later claims the same cookie,
    /// keeping one record regardless of arrival order. The cookie
    /// index is scoped per table; a cookie-only lookup with no table
    /// matches the lowest-table registration for that cookie.
    pub fn flow(&mut self, lookup: FlowLookup) -> &mut Flow {
        let key = self.resolve_flow_key(&lookup);

        if let FlowLookup::Named {
            table,
            cookie: Some(cookie),
            ..
        } = &lookup
        {
            self.cookie_index.insert((Some(*table), *cookie), key.clone());
        }

        self.flows
            .entry(key.clone())
            .or_insert_with(|| Flow::new(key))
    }

    fn resolve_flow_key(&mut self, lookup: &FlowLookup) -> FlowKey {
        match lookup {
            FlowLookup::Named {
                table,
                name,
                cookie,
            } => {
                let key = FlowKey::Named {
                    table: *table,
                    name: name.clone(),
                };
                if self.flows.contains_key(&key) {
                    return key;
                }
                // A cookie-keyed record created earlier for the same
                // cookie is this flow; re-key it under its name.
                if let Some(cookie) = cookie {
                    for indexed in [(Some(*table), *cookie), (None, *cookie)] {
                        let existing = self.cookie_index.get(&indexed).cloned();
                        if let Some(old_key @ FlowKey::ByCookie { .. }) = existing {
                            if let Some(mut flow) = self.flows.remove(&old_key) {
                                flow.key = key.clone();
                                self.flows.insert(key.clone(), flow);
                                self.cookie_index.insert(indexed, key.clone());
                                return key;
                            }
                        }
                    }
                }
                key
            }
            FlowLookup::ByCookie { table, cookie } => {
                if let Some(key) = self.cookie_index.get(&(*table, *cookie)) {
                    return key.clone();
                }
                if table.is_some() {
                    if let Some(key) = self.cookie_index.get(&(None, *cookie)).cloned() {
                        self.cookie_index.insert((*table, *cookie), key.clone());
                        return key;
                    }
                }
                if table.is_none() {
                    let mut candidates: Vec<_> = self
                        .cookie_index
                        .iter()
                        .filter(|((_, c), _)| c == cookie)
                        .collect();
                    candidates.sort_by_key(|((t, _), _)| *t);
                    if let Some((_, key)) = candidates.first() {
                        return (*key).clone();
                    }
                }
                let key = FlowKey::ByCookie {
                    table: *table,
                    cookie: *cookie,
                };
                self.cookie_index.insert((*table, *cookie), key.clone());
                key
            }
        }
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }
}
