//! Controller endpoints and URL construction.

/// One controller cluster member and how to reach it.
///
/// Read queries go to the RESTCONF datastores under
/// `{protocol}://{host}:{port}/restconf`; when a cluster VIP is
/// configured it replaces the member's own address, so any member may
/// answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub name: String,
    pub ip: String,
    pub port: u16,
    pub protocol: String,
    pub user: String,
    pub password: String,
    pub vip: Option<String>,
    /// Module prefix the forwarding manager mounts its containers
    /// under, e.g. `brocade` for `brocade-path:paths`.
    pub fm_prefix: String,
}

impl ControllerInfo {
    /// A controller with stock settings, reachable on localhost.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        ControllerInfo {
            name: name.into(),
            ip: "127.0.0.1".to_string(),
            port: 8181,
            protocol: "http".to_string(),
            user: "admin".to_string(),
            password: "admin".to_string(),
            vip: None,
            fm_prefix: "brocade".to_string(),
        }
    }

    fn host(&self) -> &str {
        self.vip.as_deref().unwrap_or(&self.ip)
    }

    fn base_url(&self) -> String {
        format!("{}://{}:{}/restconf", self.protocol, self.host(), self.port)
    }

    /// Config datastore root.
    pub fn config_url(&self) -> String {
        format!("{}/config", self.base_url())
    }

    /// Operational datastore root.
    pub fn operational_url(&self) -> String {
        format!("{}/operational", self.base_url())
    }

    /// Expands a forwarding-manager container name with the module
    /// prefix, `sr:sr` becoming e.g. `brocade-sr:sr`.
    pub fn fm_container(&self, name: &str) -> String {
        format!("{}-{}", self.fm_prefix, name)
    }

    /// Operational datastore URL of a forwarding-manager container.
    pub fn operational_fm_url(&self, container: &str) -> String {
        format!("{}/{}", self.operational_url(), self.fm_container(container))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_urls() {
        let ctrl = ControllerInfo::with_defaults("c0");
        assert_eq!(ctrl.config_url(), "http://127.0.0.1:8181/restconf/config");
        assert_eq!(
            ctrl.operational_url(),
            "http://127.0.0.1:8181/restconf/operational"
        );
    }

    #[test]
    fn test_vip_replaces_member_address() {
        let mut ctrl = ControllerInfo::with_defaults("c1");
        ctrl.ip = "10.0.0.11".to_string();
        ctrl.vip = Some("10.0.0.5".to_string());
        assert_eq!(ctrl.config_url(), "http://10.0.0.5:8181/restconf/config");
    }

    #[test]
    fn test_fm_urls() {
        let ctrl = ControllerInfo::with_defaults("c0");
        assert_eq!(ctrl.fm_container("sr:sr"), "brocade-sr:sr");
        assert_eq!(
            ctrl.operational_fm_url("path:paths"),
            "http://127.0.0.1:8181/restconf/operational/brocade-path:paths"
        );
    }
}
