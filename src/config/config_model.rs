use std::{fmt::Display, path::PathBuf, str::FromStr};

use crate::{
    application::usecases::media_upload::UploadSettings,
    infrastructure::album_service::album_http_client::AlbumHttpConfig,
};

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub album_service: AlbumHttpConfig,
    pub upload: UploadSettings,
    pub request_defaults: RequestDefaults,
    pub connectivity: Connectivity,
    pub notifications: Notifications,
}

#[derive(Clone, Default)]
pub struct RequestDefaults {
    pub owner: Option<String>,
    pub auth_token: Option<String>,
    pub wifi_only: bool,
}

impl std::fmt::Debug for RequestDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDefaults")
            .field("owner", &self.owner)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("wifi_only", &self.wifi_only)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Connectivity {
    pub mode: ConnectivityMode,
    pub sysfs_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityMode {
    /// Inspect the host's network interfaces.
    #[default]
    Auto,
    Wifi,
    Mobile,
}

impl Display for ConnectivityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            ConnectivityMode::Auto => "auto",
            ConnectivityMode::Wifi => "wifi",
            ConnectivityMode::Mobile => "mobile",
        };
        write!(f, "{}", mode)
    }
}

impl FromStr for ConnectivityMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(ConnectivityMode::Auto),
            "wifi" => Ok(ConnectivityMode::Wifi),
            "mobile" => Ok(ConnectivityMode::Mobile),
            other => Err(format!("Unsupported connectivity mode: {}", other)),
        }
    }
}
