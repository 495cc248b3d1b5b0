use async_trait::async_trait;

use crate::domain::repositories::connectivity::ConnectivityMonitor;

/// Answers the same thing every time. Used when the network type is forced
/// by configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedConnectivity {
    wifi: bool,
}

impl FixedConnectivity {
    pub fn new(wifi: bool) -> Self {
        Self { wifi }
    }
}

#[async_trait]
impl ConnectivityMonitor for FixedConnectivity {
    async fn is_wifi_connected(&self) -> bool {
        self.wifi
    }
}
