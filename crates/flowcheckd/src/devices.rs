//! Switch-to-backend wiring.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use flowcheck_device::{BaseBackend, DeviceBackend, NoviflowBackend, SshCliSession, SshTarget};
use flowcheck_topology::{SwitchKind, TopologyConfig};

/// Maps configured switch names to the backend that can query them.
///
/// Switches without a management address, and switches synthesized
/// from controller feeds, fall back to [`BaseBackend`], whose queries
/// all answer unsupported.
pub struct DeviceManager {
    backends: HashMap<String, Arc<dyn DeviceBackend>>,
}

impl DeviceManager {
    /// Builds one backend per configured switch.
    pub fn from_config(config: &TopologyConfig) -> Self {
        let mut backends: HashMap<String, Arc<dyn DeviceBackend>> = HashMap::new();
        for switch in &config.switch {
            let kind = SwitchKind::from_config_name(switch.kind.as_deref());
            let backend: Arc<dyn DeviceBackend> = match (&kind, &switch.ip) {
                (SwitchKind::Noviflow, Some(ip)) => {
                    let target = SshTarget {
                        switch: switch.name.clone(),
                        host: ip.clone(),
                        port: switch.port.unwrap_or(22),
                        user: switch.user.clone().unwrap_or_else(|| "admin".to_string()),
                    };
                    Arc::new(NoviflowBackend::new(
                        &switch.name,
                        Arc::new(SshCliSession::new(target)),
                    ))
                }
                (SwitchKind::Noviflow, None) => {
                    debug!(switch = %switch.name, "noviflow switch without a management address");
                    Arc::new(BaseBackend::new(&switch.name))
                }
                _ => Arc::new(BaseBackend::new(&switch.name)),
            };
            backends.insert(switch.name.clone(), backend);
        }
        DeviceManager { backends }
    }

    /// A manager over explicit backends, for tests.
    pub fn from_backends(backends: HashMap<String, Arc<dyn DeviceBackend>>) -> Self {
        DeviceManager { backends }
    }

    /// The backend for a switch name. Unknown names get a fresh
    /// [`BaseBackend`].
    pub fn backend_for(&self, switch: &str) -> Arc<dyn DeviceBackend> {
        match self.backends.get(switch) {
            Some(backend) => Arc::clone(backend),
            None => Arc::new(BaseBackend::new(switch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcheck_topology::SwitchConfig;
    use flowcheck_types::Dpid;

    fn switch_entry(name: &str, kind: Option<&str>, ip: Option<&str>) -> SwitchConfig {
        SwitchConfig {
            name: name.to_string(),
            dpid: Dpid::new(1),
            kind: kind.map(str::to_string),
            ip: ip.map(str::to_string),
            port: None,
            user: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn test_backends_follow_switch_kind() {
        let config = TopologyConfig {
            switch: vec![
                switch_entry("s1", Some("noviflow"), Some("10.0.0.1")),
                switch_entry("s2", None, Some("10.0.0.2")),
            ],
            ..Default::default()
        };
        let manager = DeviceManager::from_config(&config);

        assert_eq!(manager.backend_for("s1").switch(), "s1");
        // base kind cannot answer live queries
        let err = manager.backend_for("s2").list_live_flows().await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_unknown_switch_gets_base_backend() {
        let manager = DeviceManager::from_backends(HashMap::new());
        let backend = manager.backend_for("ghost");
        assert!(backend.list_live_groups().await.is_err());
    }
}
