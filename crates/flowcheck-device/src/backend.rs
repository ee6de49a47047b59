//! The per-model query surface.

use async_trait::async_trait;

use crate::error::{DeviceError, DeviceResult};
use crate::records::{LiveFlow, LiveGroup};

/// Questions a switch can answer about its own state.
///
/// `Ok(None)` mirrors a session that produced no output; `Ok(Some)`
/// carries whatever entries could be parsed out of it.
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    /// Configured switch name.
    fn switch(&self) -> &str;

    /// Flow entries currently installed, across all tables.
    async fn list_live_flows(&self) -> DeviceResult<Option<Vec<LiveFlow>>>;

    /// Group entries currently installed, with their counters.
    async fn list_live_groups(&self) -> DeviceResult<Option<Vec<LiveGroup>>>;

    /// Per-controller roles as the switch sees them, lowercased, in a
    /// stable order.
    async fn list_controller_roles(&self) -> DeviceResult<Option<Vec<String>>>;
}

/// Fallback for switch models without CLI support. Every query
/// answers [`DeviceError::Unsupported`].
pub struct BaseBackend {
    switch: String,
}

impl BaseBackend {
    pub fn new(switch: impl Into<String>) -> Self {
        BaseBackend {
            switch: switch.into(),
        }
    }
}

#[async_trait]
impl DeviceBackend for BaseBackend {
    fn switch(&self) -> &str {
        &self.switch
    }

    async fn list_live_flows(&self) -> DeviceResult<Option<Vec<LiveFlow>>> {
        Err(DeviceError::unsupported(&self.switch, "flow listing"))
    }

    async fn list_live_groups(&self) -> DeviceResult<Option<Vec<LiveGroup>>> {
        Err(DeviceError::unsupported(&self.switch, "group listing"))
    }

    async fn list_controller_roles(&self) -> DeviceResult<Option<Vec<String>>> {
        Err(DeviceError::unsupported(&self.switch, "role listing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_base_backend_supports_nothing() {
        let backend = BaseBackend::new("s1");
        assert!(matches!(
            backend.list_live_flows().await,
            Err(DeviceError::Unsupported { .. })
        ));
        assert!(matches!(
            backend.list_live_groups().await,
            Err(DeviceError::Unsupported { .. })
        ));
        assert!(matches!(
            backend.list_controller_roles().await,
            Err(DeviceError::Unsupported { .. })
        ));
    }
}
