//! Topology configuration file loading.

use crate::{ConfigError, ConfigResult, ControllerInfo};
use flowcheck_types::Dpid;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Topology configuration document.
///
/// YAML (JSON parses too); every section is optional. Switches,
/// links and hosts declare the expected network; controllers describe
/// where to read cluster state from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyConfig {
    #[serde(default)]
    pub controller: Vec<ControllerConfig>,
    #[serde(default)]
    pub controller_vip: Option<String>,
    #[serde(default)]
    pub switch: Vec<SwitchConfig>,
    #[serde(default)]
    pub link: Vec<LinkConfig>,
    #[serde(default)]
    pub host: Vec<HostConfig>,
}

impl TopologyConfig {
    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::read(path.display().to_string(), e))?;
        serde_yaml::from_str(&text).map_err(|e| ConfigError::parse(path.display().to_string(), e))
    }
}

/// One controller cluster member.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    pub name: String,
    #[serde(default = "default_controller_ip")]
    pub ip: String,
    #[serde(default = "default_controller_port")]
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_fm_prefix")]
    pub fm_prefix: String,
}

impl ControllerConfig {
    /// Builds the reachable-endpoint description, applying the
    /// cluster VIP when one is configured.
    pub fn to_info(&self, vip: Option<&String>) -> ControllerInfo {
        ControllerInfo {
            name: self.name.clone(),
            ip: self.ip.clone(),
            port: self.port,
            protocol: self.protocol.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            vip: vip.cloned(),
            fm_prefix: self.fm_prefix.clone(),
        }
    }
}

/// One expected switch.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    pub name: String,
    #[serde(deserialize_with = "de_dpid")]
    pub dpid: Dpid,
    /// Vendor kind, e.g. `noviflow`. Anything else is the base kind.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Management address for live CLI queries.
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// One declared link. Ports left out are auto-assigned in declaration
/// order, starting at 1 per switch.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub source_port: Option<u32>,
    #[serde(default)]
    pub destination_port: Option<u32>,
}

/// One expected end host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub name: String,
}

fn default_controller_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_controller_port() -> u16 {
    8181
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_user() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

fn default_fm_prefix() -> String {
    "brocade".to_string()
}

/// YAML writers quote dpids ("0x1f") or leave them bare (0x1f, which
/// YAML reads as an integer). Both spell the same value.
fn de_dpid<'de, D>(deserializer: D) -> Result<Dpid, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Raw(u64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Raw(raw) => Ok(Dpid::new(raw)),
        Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_full_document() {
        let text = r#"
controller:
  - name: c0
    ip: 10.0.0.11
  - name: c1
    ip: 10.0.0.12
    port: 8282
controller_vip: 10.0.0.5
switch:
  - name: s1
    dpid: "0x1"
    type: noviflow
    ip: 192.168.0.1
    user: superuser
  - name: s2
    dpid: 0x2
link:
  - source: s1
    destination: s2
  - source: s1
    destination: h1
    source_port: 7
host:
  - name: h1
"#;
        let config: TopologyConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.controller.len(), 2);
        assert_eq!(config.controller[0].port, 8181);
        assert_eq!(config.controller[1].port, 8282);
        assert_eq!(config.controller_vip.as_deref(), Some("10.0.0.5"));

        assert_eq!(config.switch[0].dpid, Dpid::new(1));
        assert_eq!(config.switch[0].kind.as_deref(), Some("noviflow"));
        assert_eq!(config.switch[1].dpid, Dpid::new(2));
        assert_eq!(config.switch[1].kind, None);

        assert_eq!(config.link[1].source_port, Some(7));
        assert_eq!(config.host[0].name, "h1");
    }

    #[test]
    fn test_missing_link_endpoint_is_rejected() {
        let text = r#"
link:
  - source: s1
"#;
        let err = serde_yaml::from_str::<TopologyConfig>(text).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_empty_document() {
        let config: TopologyConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.controller.is_empty());
        assert!(config.switch.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "switch:\n  - name: s1\n    dpid: \"0xa\"").unwrap();

        let config = TopologyConfig::load(file.path()).unwrap();
        assert_eq!(config.switch.len(), 1);
        assert_eq!(config.switch[0].dpid, Dpid::new(10));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TopologyConfig::load("/nonexistent/topology.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
