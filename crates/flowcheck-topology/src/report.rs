//! Consistency findings and the per-validation report.

use std::fmt;
use tracing::warn;

/// One failed consistency check, tied to the entity that failed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// What was checked, e.g. `switch s1 (openflow:1) group 2`.
    pub subject: String,
    /// Why it failed.
    pub detail: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.detail)
    }
}

/// Accumulates the outcome of one validation walk.
///
/// Checks never short-circuit: every entity is visited and every
/// failure recorded, so one report carries the complete damage list
/// for a run. Each failure is logged when recorded.
#[derive(Debug, Default)]
pub struct Report {
    findings: Vec<Finding>,
    checked: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one entity as checked.
    pub fn note_checked(&mut self) {
        self.checked += 1;
    }

    /// Records one failure.
    pub fn fail(&mut self, subject: impl Into<String>, detail: impl Into<String>) {
        let finding = Finding {
            subject: subject.into(),
            detail: detail.into(),
        };
        warn!(subject = %finding.subject, "{}", finding.detail);
        self.findings.push(finding);
    }

    /// True when no failures were recorded.
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of entities visited.
    pub fn entities_checked(&self) -> usize {
        self.checked
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: Report) {
        self.checked += other.checked;
        self.findings.extend(other.findings);
    }
}
