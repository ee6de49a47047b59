//! Inter-switch and switch-to-host links.

use crate::Report;

/// A link owned by one switch, keyed by its local port id.
///
/// The declared destination comes from static configuration; the two
/// observed destinations come from the base OpenFlow topology feed and
/// the segment-routing topology feed, each reported independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Local port id, `openflow:<dpid>:<port>`.
    pub source: String,
    /// Peer declared by configuration, when the link was declared.
    pub destination: Option<String>,
    /// Peer observed in the base OpenFlow topology.
    pub openflow_destination: Option<String>,
    /// Peer observed in the segment-routing topology.
    pub sr_destination: Option<String>,
}

impl Link {
    pub fn new(source: impl Into<String>) -> Self {
        Link {
            source: source.into(),
            destination: None,
            openflow_destination: None,
            sr_destination: None,
        }
    }

    /// Records the declared peer. First declaration wins.
    pub fn declare_destination(&mut self, destination: impl Into<String>) {
        if self.destination.is_none() {
            self.destination = Some(destination.into());
        }
    }

    /// Records the peer observed in the base OpenFlow topology.
    pub fn observe_openflow_destination(&mut self, destination: impl Into<String>) {
        self.openflow_destination = Some(destination.into());
    }

    /// Records the peer observed in the segment-routing topology.
    pub fn observe_sr_destination(&mut self, destination: impl Into<String>) {
        self.sr_destination = Some(destination.into());
    }

    /// The peer this link is expected to reach: the declared
    /// destination when configuration named one, otherwise whatever
    /// the base topology observed (presence is then what is asserted).
    pub fn expected_destination(&self) -> Option<&str> {
        self.destination
            .as_deref()
            .or(self.openflow_destination.as_deref())
    }

    /// Checks the observed peers against the expectation.
    ///
    /// With `expect_up` the base observation must exist and match the
    /// expected peer, and with `include_sr` the segment-routing
    /// observation must as well. With `expect_up == false` both
    /// observations must be absent.
    pub fn check(&self, expect_up: bool, include_sr: bool, report: &mut Report) -> bool {
        report.note_checked();
        let subject = format!("link {}", self.source);
        let mut ok = true;

        if expect_up {
            let expected = self.expected_destination().map(str::to_string);
            match (expected, self.openflow_destination.as_deref()) {
                (None, _) | (_, None) => {
                    report.fail(&subject, "not found in openflow topology");
                    ok = false;
                }
                (Some(expected), Some(observed)) if observed != expected => {
                    report.fail(
                        &subject,
                        format!(
                            "openflow topology reports destination {observed}, expected {expected}"
                        ),
                    );
                    ok = false;
                }
                _ => {}
            }

            if include_sr {
                let expected = self.expected_destination().map(str::to_string);
                match (expected, self.sr_destination.as_deref()) {
                    (None, _) | (_, None) => {
                        report.fail(&subject, "not found in segment routing topology");
                        ok = false;
                    }
                    (Some(expected), Some(observed)) if observed != expected => {
                        report.fail(
                            &subject,
                            format!(
                                "segment routing topology reports destination {observed}, expected {expected}"
                            ),
                        );
                        ok = false;
                    }
                    _ => {}
                }
            }
        } else {
            if let Some(observed) = self.openflow_destination.as_deref() {
                report.fail(
                    &subject,
                    format!("still present in openflow topology (destination {observed})"),
                );
                ok = false;
            }
            if include_sr {
                if let Some(observed) = self.sr_destination.as_deref() {
                    report.fail(
                        &subject,
                        format!(
                            "still present in segment routing topology (destination {observed})"
                        ),
                    );
                    ok = false;
                }
            }
        }

        ok
    }
}
