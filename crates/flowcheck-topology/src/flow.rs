//! Flow entry entities, identity keys and facet checks.

use crate::Report;
use flowcheck_types::Cookie;
use std::fmt;

/// Identity of a flow within its switch.
///
/// Controller inventories name flows, so `(table, name)` is the
/// primary identity. Live device scrapes only carry the cookie; a flow
/// first seen that way is keyed by cookie until a named source claims
/// it (see [`crate::SwitchState::flow`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlowKey {
    Named { table: u8, name: String },
    ByCookie { table: Option<u8>, cookie: Cookie },
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKey::Named { table, name } => write!(f, "flow {name} (table {table})"),
            FlowKey::ByCookie {
                table: Some(table),
                cookie,
            } => write!(f, "flow cookie {cookie} (table {table})"),
            FlowKey::ByCookie {
                table: None,
                cookie,
            } => write!(f, "flow cookie {cookie}"),
        }
    }
}

/// How a caller identifies the flow it wants merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowLookup {
    /// Controller-side identity; `cookie`, when known, is registered
    /// so a later cookie-only lookup lands on the same flow.
    Named {
        table: u8,
        name: String,
        cookie: Option<Cookie>,
    },
    /// Device-side identity: cookie, plus the table when the scrape
    /// reported one.
    ByCookie { table: Option<u8>, cookie: Cookie },
}

/// What one source reported about a flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowObservation {
    pub cookie: Option<Cookie>,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
}

impl FlowObservation {
    pub fn with_cookie(cookie: Option<Cookie>) -> Self {
        FlowObservation {
            cookie,
            ..Default::default()
        }
    }
}

/// A flow entry with its four independently-populated facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub key: FlowKey,
    pub config: Option<FlowObservation>,
    pub operational: Option<FlowObservation>,
    pub fm: Option<FlowObservation>,
    pub live: Option<FlowObservation>,
    pub calculated: bool,
}

impl Flow {
    pub fn new(key: FlowKey) -> Self {
        Flow {
            key,
            config: None,
            operational: None,
            fm: None,
            live: None,
            calculated: false,
        }
    }

    pub fn record_config(&mut self, observation: FlowObservation) {
        self.config = Some(observation);
    }

    pub fn record_operational(&mut self, observation: FlowObservation) {
        self.operational = Some(observation);
    }

    pub fn record_fm(&mut self, observation: FlowObservation) {
        self.fm = Some(observation);
    }

    pub fn record_live(&mut self, observation: FlowObservation) {
        self.live = Some(observation);
    }

    pub fn mark_calculated(&mut self) {
        self.calculated = true;
    }

    /// True when some source expects this flow to exist.
    pub fn expected(&self) -> bool {
        self.calculated || self.config.is_some()
    }

    /// Checks facet presence and config/live cookie agreement.
    pub fn check(&self, check_stats: bool, switch: &str, report: &mut Report) -> bool {
        report.note_checked();
        let subject = format!("{switch} {}", self.key);
        let mut ok = true;

        if !self.expected() {
            let mut seen = Vec::new();
            if self.operational.is_some() {
                seen.push("operational inventory");
            }
            if self.fm.is_some() {
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

        if self.calculated && self.config.is_none() {
            report.fail(&subject, "calculated but not found in config inventory");
            ok = false;
        }
        if self.operational.is_none() {
            report.fail(&subject, "not found in operational inventory");
            ok = false;
        }
        if self.calculated && self.fm.is_none() {
            report.fail(&subject, "not found in flow manager");
            ok = false;
        }
        match self.live {
            None => {
                report.fail(&subject, "not found in switch");
                ok = false;
            }
            Some(live) => {
                if let Some(config) = self.config {
                    if let (Some(expected), Some(observed)) = (config.cookie, live.cookie) {
                        if expected != observed {
                            report.fail(
                                &subject,
                                format!(
                                    "switch reports cookie {observed}, config expects {expected}"
                                ),
                            );
                            ok = false;
                        }
                    }
                }
                if check_stats && (live.packets.is_none() || live.bytes.is_none()) {
                    report.fail(&subject, "switch did not report packet and byte counters");
                    ok = false;
                }
            }
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named_key() -> FlowKey {
        FlowKey::Named {
            table: 0,
            name: "f1".to_string(),
        }
    }

    fn fully_present() -> Flow {
        let mut flow = Flow::new(named_key());
        let observation = FlowObservation::with_cookie(Some(Cookie::new(0xabc)));
        flow.record_config(observation);
        flow.record_operational(observation);
        flow.record_fm(observation);
        flow.record_live(FlowObservation {
            cookie: Some(Cookie::new(0xabc)),
            packets: Some(4),
            bytes: Some(512),
        });
        flow.mark_calculated();
        flow
    }

    #[test]
    fn test_key_display() {
        assert_eq!(named_key().to_string(), "flow f1 (table 0)");
        let by_cookie = FlowKey::ByCookie {
            table: Some(2),
            cookie: Cookie::new(0xabc),
        };
        assert_eq!(by_cookie.to_string(), "flow cookie 0xabc (table 2)");
    }

    #[test]
    fn test_fully_present_flow_passes() {
        let mut report = Report::new();
        assert!(fully_present().check(true, "switch s1", &mut report));
        assert!(report.passed());
    }

    #[test]
    fn test_cookie_mismatch_fails() {
        let mut flow = fully_present();
        flow.record_live(FlowObservation {
            cookie: Some(Cookie::new(0xdead)),
            packets: Some(1),
            bytes: Some(1),
        });

        let mut report = Report::new();
        assert!(!flow.check(false, "switch s1", &mut report));
        assert!(report.findings()[0].detail.contains("0xdead"));
    }

    #[test]
    fn test_unknown_live_cookie_is_not_a_mismatch() {
        let mut flow = fully_present();
        flow.record_live(FlowObservation::default());

        let mut report = Report::new();
        assert!(flow.check(false, "switch s1", &mut report));
    }

    #[test]
    fn test_configured_flow_missing_from_switch_fails() {
        let mut flow = Flow::new(named_key());
        flow.record_config(FlowObservation::default());
        flow.record_operational(FlowObservation::default());

        let mut report = Report::new();
        assert!(!flow.check(false, "switch s1", &mut report));
        assert_eq!(report.findings().len(), 1);
    }

    #[test]
    fn test_orphan_flow_fails() {
        let mut flow = Flow::new(FlowKey::ByCookie {
            table: Some(0),
            cookie: Cookie::new(0xbeef),
        });
        flow.record_live(FlowObservation::default());

        let mut report = Report::new();
        assert!(!flow.check(false, "switch s1", &mut report));
        assert!(report.findings()[0].subject.contains("0xbeef"));
    }

    #[test]
    fn test_stats_check_requires_counters() {
        let mut flow = fully_present();
        flow.record_live(FlowObservation {
            cookie: Some(Cookie::new(0xabc)),
            packets: None,
            bytes: Some(12),
        });

        let mut report = Report::new();
        assert!(flow.check(false, "switch s1", &mut report));
        assert!(!flow.check(true, "switch s1", &mut report));
    }
}
