//! Forwarding group entities and their facet checks.

use crate::Report;

/// Live counters a switch reported for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupObservation {
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
}

/// A forwarding group, keyed by group id within its switch.
///
/// The four facets are populated independently as sources arrive:
/// controller config inventory, controller operational inventory, the
/// forwarding-manager mirror, and the switch's own CLI. `calculated`
/// is set when a computed path/tree references the group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub id: u32,
    pub config: bool,
    pub operational: bool,
    pub fm: bool,
    pub live: Option<GroupObservation>,
    pub calculated: bool,
}

impl Group {
    pub fn new(id: u32) -> Self {
        Group {
            id,
            ..Default::default()
        }
    }

    pub fn record_config(&mut self) {
        self.config = true;
    }

    pub fn record_operational(&mut self) {
        self.operational = true;
    }

    pub fn record_fm(&mut self) {
        self.fm = true;
    }

    pub fn record_live(&mut self, observation: GroupObservation) {
        self.live = Some(observation);
    }

    pub fn mark_calculated(&mut self) {
        self.calculated = true;
    }

    /// True when some source expects this group to exist: a computed
    /// reference or a config inventory entry.
    pub fn expected(&self) -> bool {
        self.calculated || self.config
    }

    /// Checks facet presence against what the group's status demands.
    pub fn check(&self, check_stats: bool, switch: &str, report: &mut Report) -> bool {
        report.note_checked();
        let subject = format!("{switch} group {}", self.id);
        let mut ok = true;

        if !self.expected() {
            let mut seen = Vec::new();
            if self.operational {
                seen.push("operational inventory");
            }
            if self.fm {
                seen.push("flow manager");
            }
            if self.live.is_some() {
                seen.push("switch");
            }
            if !seen.is_empty() {
                report.fail(
                    &subject,
                    format!("not configured or calculated but found in {}", seen.join(", ")),
                );
                ok = false;
            }
            return ok;
        }

        if self.calculated && !self.config {
            report.fail(&subject, "calculated but not found in config inventory");
            ok = false;
        }
        if !self.operational {
            report.fail(&subject, "not found in operational inventory");
            ok = false;
        }
        if self.calculated && !self.fm {
            report.fail(&subject, "not found in flow manager");
            ok = false;
        }
        match self.live {
            None => {
                report.fail(&subject, "not found in switch");
                ok = false;
            }
            Some(observation) if check_stats => {
                if observation.packets.is_none() || observation.bytes.is_none() {
                    report.fail(&subject, "switch did not report packet and byte counters");
                    ok = false;
                }
            }
            Some(_) => {}
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fully_present() -> Group {
        let mut group = Group::new(2);
        group.record_config();
        group.record_operational();
        group.record_fm();
        group.record_live(GroupObservation {
            packets: Some(10),
            bytes: Some(1000),
        });
        group.mark_calculated();
        group
    }

    #[test]
    fn test_fully_present_group_passes() {
        let mut report = Report::new();
        assert!(fully_present().check(true, "switch s1", &mut report));
        assert!(report.passed());
    }

    #[test]
    fn test_configured_group_missing_from_switch_fails() {
        let mut group = Group::new(2);
        group.record_config();
        group.record_operational();

        let mut report = Report::new();
        assert!(!group.check(false, "switch s1", &mut report));
        assert_eq!(report.findings().len(), 1);
        assert!(report.findings()[0].detail.contains("switch"));
    }

    #[test]
    fn test_calculated_group_requires_fm_and_config() {
        let mut group = Group::new(7);
        group.mark_calculated();
        group.record_operational();
        group.record_live(GroupObservation::default());

        let mut report = Report::new();
        assert!(!group.check(false, "switch s1", &mut report));
        let details: Vec<_> = report.findings().iter().map(|f| f.detail.as_str()).collect();
        assert!(details.iter().any(|d| d.contains("config inventory")));
        assert!(details.iter().any(|d| d.contains("flow manager")));
    }

    #[test]
    fn test_config_only_group_does_not_require_fm() {
        let mut group = Group::new(3);
        group.record_config();
        group.record_operational();
        group.record_live(GroupObservation::default());

        let mut report = Report::new();
        assert!(group.check(false, "switch s1", &mut report));
    }

    #[test]
    fn test_orphan_group_fails() {
        let mut group = Group::new(9);
        group.record_live(GroupObservation::default());

        let mut report = Report::new();
        assert!(!group.check(false, "switch s1", &mut report));
        assert!(report.findings()[0]
            .detail
            .contains("not configured or calculated"));
    }

    #[test]
    fn test_stats_check_requires_counters() {
        let mut group = fully_present();
        group.record_live(GroupObservation {
            packets: Some(10),
            bytes: None,
        });

        let mut report = Report::new();
        assert!(group.check(false, "switch s1", &mut report));
        assert!(!group.check(true, "switch s1", &mut report));
    }
}
