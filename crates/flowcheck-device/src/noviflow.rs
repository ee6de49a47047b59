//! The NoviWare CLI grammar.
//!
//! NoviWare show commands print indented blocks: a `[TABLE n]` marker
//! opens a table section, `[FLOW_ID n]` opens a flow entry, and the
//! entry's fields follow one per line. Groups print a `Group id:`
//! header followed by counter lines. Parsing walks the output line by
//! line and keeps whatever fields are present.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use flowcheck_types::Cookie;

use crate::backend::DeviceBackend;
use crate::error::DeviceResult;
use crate::records::{LiveFlow, LiveGroup};
use crate::session::CliSession;

const SHOW_FLOWS: &str = "show status flow tableid all";
const SHOW_GROUPS: &str = "show stats group groupid all";
const SHOW_OFCHANNEL: &str = "show status ofchannel";

static TABLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[TABLE\s+(\d+)\]").expect("Invalid regex pattern"));
static FLOW_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[FLOW_ID\s*(\d+)\]").expect("Invalid regex pattern"));
static COOKIE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Cookie\s*=\s*(\S+)").expect("Invalid regex pattern"));
static PACKET_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Packet_count\s*=\s*(\d+)").expect("Invalid regex pattern"));
static BYTE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Byte_count\s*=\s*(\d+)").expect("Invalid regex pattern"));

static GROUP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Group id:\s*(\d+)").expect("Invalid regex pattern"));
static GROUP_PACKETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Reference count:\s*\d+\s*\S\s+Packet count:\s*(\d+)")
        .expect("Invalid regex pattern")
});
static GROUP_BYTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Byte count:\s*(\d+)").expect("Invalid regex pattern"));

static ROLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(Group\s+\S+\s+Role\s+-\s+\S+)").expect("Invalid regex pattern"));
static ROLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Group\s+\S+\s+Role\s+-\s+(\S+)").expect("Invalid regex pattern"));

/// [`DeviceBackend`] for NoviFlow switches.
pub struct NoviflowBackend {
    switch: String,
    session: Arc<dyn CliSession>,
}

impl NoviflowBackend {
    pub fn new(switch: impl Into<String>, session: Arc<dyn CliSession>) -> Self {
        NoviflowBackend {
            switch: switch.into(),
            session,
        }
    }
}

#[async_trait]
impl DeviceBackend for NoviflowBackend {
    fn switch(&self) -> &str {
        &self.switch
    }

    async fn list_live_flows(&self) -> DeviceResult<Option<Vec<LiveFlow>>> {
        let Some(text) = self.session.run(SHOW_FLOWS).await? else {
            return Ok(None);
        };
        Ok(Some(parse_flows(&text)))
    }

    async fn list_live_groups(&self) -> DeviceResult<Option<Vec<LiveGroup>>> {
        let Some(text) = self.session.run(SHOW_GROUPS).await? else {
            return Ok(None);
        };
        Ok(Some(parse_groups(&text)))
    }

    async fn list_controller_roles(&self) -> DeviceResult<Option<Vec<String>>> {
        let Some(text) = self.session.run(SHOW_OFCHANNEL).await? else {
            return Ok(None);
        };
        let roles = parse_roles(&text);
        if roles.is_empty() {
            return Ok(None);
        }
        Ok(Some(roles))
    }
}

/// Walks flow listing output. A table marker sets the table for the
/// entries after it and closes any open entry, so field lines outside
/// an entry are dropped.
fn parse_flows(text: &str) -> Vec<LiveFlow> {
    let mut flows: Vec<LiveFlow> = Vec::new();
    let mut current_table: Option<u8> = None;
    let mut open = false;

    for line in text.lines() {
        if let Some(caps) = TABLE_MARKER.captures(line) {
            current_table = caps[1].parse().ok();
            open = false;
            continue;
        }
        if let Some(caps) = FLOW_MARKER.captures(line) {
            flows.push(LiveFlow::new(&caps[1], current_table));
            open = true;
            continue;
        }
        if !open {
            continue;
        }
        let Some(flow) = flows.last_mut() else {
            continue;
        };

        if let Some(caps) = COOKIE_FIELD.captures(line) {
            match caps[1].parse::<Cookie>() {
                Ok(cookie) => flow.cookie = Some(cookie),
                Err(_) => debug!(token = &caps[1], "unreadable cookie token"),
            }
            continue;
        }
        if let Some(caps) = PACKET_FIELD.captures(line) {
            flow.packets = caps[1].parse().ok();
            continue;
        }
        if let Some(caps) = BYTE_FIELD.captures(line) {
            flow.bytes = caps[1].parse().ok();
        }
    }
    flows
}

/// Walks group stats output. An entry closes once both counters have
/// been seen, in either order; counter lines outside an entry are
/// dropped.
fn parse_groups(text: &str) -> Vec<LiveGroup> {
    let mut groups: Vec<LiveGroup> = Vec::new();
    let mut open = false;

    for line in text.lines() {
        if let Some(caps) = GROUP_MARKER.captures(line) {
            match caps[1].parse() {
                Ok(id) => {
                    groups.push(LiveGroup::new(id));
                    open = true;
                }
                Err(_) => open = false,
            }
            continue;
        }
        if !open {
            continue;
        }
        let Some(group) = groups.last_mut() else {
            continue;
        };

        if let Some(caps) = GROUP_PACKETS.captures(line) {
            group.packets = caps[1].parse().ok();
            if group.bytes.is_some() {
                open = false;
            }
            continue;
        }
        if let Some(caps) = GROUP_BYTES.captures(line) {
            group.bytes = caps[1].parse().ok();
            if group.packets.is_some() {
                open = false;
            }
        }
    }
    groups
}

/// Collects the per-controller role lines of ofchannel output. Lines
/// sort by controller group name so the result has a stable order.
fn parse_roles(text: &str) -> Vec<String> {
    let mut lines: Vec<&str> = ROLE_LINE
        .find_iter(text)
        .map(|found| found.as_str())
        .collect();
    lines.sort_unstable();
    lines
        .iter()
        .filter_map(|line| ROLE_TOKEN.captures(line))
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct FixedSession {
        replies: HashMap<String, String>,
        fail: bool,
    }

    impl FixedSession {
        fn new() -> Self {
            FixedSession {
                replies: HashMap::new(),
                fail: false,
            }
        }

        fn with(mut self, command: &str, output: &str) -> Self {
            self.replies.insert(command.to_string(), output.to_string());
            self
        }
    }

    #[async_trait]
    impl CliSession for FixedSession {
        async fn run(&self, command: &str) -> DeviceResult<Option<String>> {
            if self.fail {
                return Err(DeviceError::session("s1", "connection refused"));
            }
            Ok(self.replies.get(command).cloned())
        }
    }

    fn backend_with(session: FixedSession) -> NoviflowBackend {
        NoviflowBackend::new("s1", Arc::new(session))
    }

    #[test]
    fn test_parse_flows_walk() {
        let text = "\
Displaying flow entries
 Packet_count = 999
[TABLE 0]
[FLOW_ID1]
 Priority = 100
 Cookie = bc614e
 Packet_count = 17
 Byte_count = 1534
[FLOW_ID 2]
 Cookie = 2b
[TABLE 1]
 Byte_count = 888
[FLOW_ID7]
 Byte_count = 12
";
        let flows = parse_flows(text);
        assert_eq!(flows.len(), 3);

        assert_eq!(flows[0].id, "1");
        assert_eq!(flows[0].table, Some(0));
        assert_eq!(flows[0].cookie, Some(Cookie::new(0x00bc_614e)));
        assert_eq!(flows[0].packets, Some(17));
        assert_eq!(flows[0].bytes, Some(1534));

        assert_eq!(flows[1].id, "2");
        assert_eq!(flows[1].cookie, Some(Cookie::new(0x2b)));
        assert_eq!(flows[1].packets, None);

        // the stray Byte_count after [TABLE 1] belongs to no entry
        assert_eq!(flows[2].id, "7");
        assert_eq!(flows[2].table, Some(1));
        assert_eq!(flows[2].bytes, Some(12));
    }

    #[test]
    fn test_parse_flows_before_any_table_marker() {
        let flows = parse_flows("[FLOW_ID4]\n Cookie = ff\n");
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].table, None);
        assert_eq!(flows[0].cookie, Some(Cookie::new(0xff)));
    }

    #[test]
    fn test_parse_flows_keeps_entry_on_bad_cookie() {
        let flows = parse_flows("[TABLE 0]\n[FLOW_ID1]\n Cookie = zz!!\n Packet_count = 3\n");
        assert_eq!(flows[0].cookie, None);
        assert_eq!(flows[0].packets, Some(3));
    }

    #[test]
    fn test_parse_groups_either_counter_order() {
        let text = "\
Group id:     3
  Reference count: 2 / Packet count: 101
  Byte count: 2048
Group id:     4
  Byte count: 10
  Reference count: 0 / Packet count: 5
  Byte count: 999
";
        let groups = parse_groups(text);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].id, 3);
        assert_eq!(groups[0].packets, Some(101));
        assert_eq!(groups[0].bytes, Some(2048));

        // group 4 closed after both counters; the trailing byte line
        // belongs to no entry
        assert_eq!(groups[1].id, 4);
        assert_eq!(groups[1].packets, Some(5));
        assert_eq!(groups[1].bytes, Some(10));
    }

    #[test]
    fn test_parse_groups_ignores_counters_before_first_group() {
        let groups = parse_groups("Byte count: 77\nGroup id: 1\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bytes, None);
    }

    #[test]
    fn test_parse_roles_sorted_by_controller_group() {
        let text = "\
OFCHANNEL status:
Group c2 Role - Slave
Group c1 Role - Master
Group c3 Role - Equal
";
        assert_eq!(parse_roles(text), vec!["master", "slave", "equal"]);
    }

    #[test]
    fn test_parse_roles_empty_without_role_lines() {
        assert!(parse_roles("no channels configured\n").is_empty());
    }

    #[tokio::test]
    async fn test_backend_maps_missing_output_to_none() {
        let backend = backend_with(FixedSession::new());
        assert_eq!(backend.list_live_flows().await.ok(), Some(None));
        assert_eq!(backend.list_live_groups().await.ok(), Some(None));
        assert_eq!(backend.list_controller_roles().await.ok(), Some(None));
    }

    #[tokio::test]
    async fn test_backend_runs_show_commands() {
        let session = FixedSession::new()
            .with(SHOW_FLOWS, "[TABLE 0]\n[FLOW_ID1]\n Cookie = 1f\n")
            .with(SHOW_GROUPS, "Group id: 9\n")
            .with(SHOW_OFCHANNEL, "Group c1 Role - Master\n");
        let backend = backend_with(session);

        let flows = backend.list_live_flows().await.ok().flatten();
        assert_eq!(flows.map(|flows| flows.len()), Some(1));

        let groups = backend.list_live_groups().await.ok().flatten();
        assert_eq!(groups.map(|groups| groups[0].id), Some(9));

        let roles = backend.list_controller_roles().await.ok().flatten();
        assert_eq!(roles, Some(vec!["master".to_string()]));
    }

    #[tokio::test]
    async fn test_backend_surfaces_session_failures() {
        let mut session = FixedSession::new();
        session.fail = true;
        let backend = backend_with(session);
        assert!(matches!(
            backend.list_live_flows().await,
            Err(DeviceError::Session { .. })
        ));
    }
}
