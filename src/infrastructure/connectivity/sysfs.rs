use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::repositories::connectivity::ConnectivityMonitor;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/net";

/// Reads Linux network interface state from sysfs. An interface counts as
/// Wi-Fi when it exposes `wireless` or `phy80211`, and as connected when its
/// `operstate` is `up`.
#[derive(Debug, Clone)]
pub struct SysfsConnectivity {
    root: PathBuf,
}

impl SysfsConnectivity {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn scan(&self) -> Result<bool> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .with_context(|| format!("failed to read {}", self.root.display()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to list {}", self.root.display()))?
        {
            let interface = entry.path();
            if !is_wireless(&interface).await {
                continue;
            }

            let state = fs::read_to_string(interface.join("operstate"))
                .await
                .unwrap_or_default();
            if state.trim() == "up" {
                debug!(
                    interface = %entry.file_name().to_string_lossy(),
                    "connectivity: wifi interface is up"
                );
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl Default for SysfsConnectivity {
    fn default() -> Self {
        Self::new(DEFAULT_SYSFS_ROOT)
    }
}

#[async_trait]
impl ConnectivityMonitor for SysfsConnectivity {
    async fn is_wifi_connected(&self) -> bool {
        match self.scan().await {
            Ok(connected) => connected,
            Err(err) => {
                warn!(
                    root = %self.root.display(),
                    error = ?err,
                    "connectivity: unable to inspect interfaces; assuming no wifi"
                );
                false
            }
        }
    }
}

async fn is_wireless(interface: &Path) -> bool {
    for marker in ["wireless", "phy80211"] {
        if fs::try_exists(interface.join(marker)).await.unwrap_or(false) {
            return true;
        }
    }
    false
}
