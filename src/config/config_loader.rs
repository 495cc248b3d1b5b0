use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use url::Url;

use super::config_model::{
    Connectivity, ConnectivityMode, DotEnvyConfig, Notifications, RequestDefaults,
};
use crate::{
    application::usecases::media_upload::{
        DEFAULT_ALBUM_DESCRIPTION, DEFAULT_ALBUM_NAME, DEFAULT_JPEG_QUALITY, UploadSettings,
    },
    infrastructure::{
        album_service::album_http_client::{
            AlbumHttpConfig, DEFAULT_APPLICATION_NAME, DEFAULT_BASE_URL,
        },
        connectivity::sysfs::DEFAULT_SYSFS_ROOT,
    },
};

const DEFAULT_NOTIFICATION_QUEUE_CAPACITY: usize = 64;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DotEnvyConfig> {
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let album_service = AlbumHttpConfig {
        base_url: Url::parse(
            &var("ALBUM_SERVICE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )
        .context("ALBUM_SERVICE_BASE_URL is invalid")?,
        application_name: var("ALBUM_SERVICE_APPLICATION_NAME")
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string()),
    };

    let jpeg_quality: u8 = var("UPLOAD_JPEG_QUALITY")
        .unwrap_or_else(|| DEFAULT_JPEG_QUALITY.to_string())
        .parse()
        .context("UPLOAD_JPEG_QUALITY is invalid")?;
    if !(1..=100).contains(&jpeg_quality) {
        bail!("UPLOAD_JPEG_QUALITY must be between 1 and 100, got {jpeg_quality}");
    }

    let upload = UploadSettings {
        album_name: var("ALBUM_NAME").unwrap_or_else(|| DEFAULT_ALBUM_NAME.to_string()),
        album_description: var("ALBUM_DESCRIPTION")
            .unwrap_or_else(|| DEFAULT_ALBUM_DESCRIPTION.to_string()),
        jpeg_quality,
    };

    let request_defaults = RequestDefaults {
        owner: var("ALBUM_OWNER"),
        auth_token: var("ALBUM_AUTH_TOKEN"),
        wifi_only: var("UPLOAD_WIFI_ONLY")
            .map(|raw| parse_bool(&raw).context("UPLOAD_WIFI_ONLY is invalid"))
            .transpose()?
            .unwrap_or(false),
    };

    let connectivity = Connectivity {
        mode: var("CONNECTIVITY_MODE")
            .map(|raw| raw.parse::<ConnectivityMode>())
            .transpose()
            .map_err(|err| anyhow!(err))
            .context("CONNECTIVITY_MODE is invalid")?
            .unwrap_or_default(),
        sysfs_root: PathBuf::from(
            var("CONNECTIVITY_SYSFS_ROOT").unwrap_or_else(|| DEFAULT_SYSFS_ROOT.to_string()),
        ),
    };

    let queue_capacity: usize = var("NOTIFICATION_QUEUE_CAPACITY")
        .unwrap_or_else(|| DEFAULT_NOTIFICATION_QUEUE_CAPACITY.to_string())
        .parse()
        .context("NOTIFICATION_QUEUE_CAPACITY is invalid")?;
    if queue_capacity == 0 {
        bail!("NOTIFICATION_QUEUE_CAPACITY must be greater than zero");
    }

    Ok(DotEnvyConfig {
        album_service,
        upload,
        request_defaults,
        connectivity,
        notifications: Notifications { queue_capacity },
    })
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(pairs: &[(&str, &str)]) -> Result<DotEnvyConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_from(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load_with(&[]).unwrap();

        assert_eq!(config.album_service.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.album_service.application_name, "ImageUploader");
        assert_eq!(config.upload, UploadSettings::default());
        assert_eq!(config.upload.album_name, "smarter");
        assert_eq!(config.upload.jpeg_quality, 75);
        assert!(config.request_defaults.owner.is_none());
        assert!(!config.request_defaults.wifi_only);
        assert_eq!(config.connectivity.mode, ConnectivityMode::Auto);
        assert_eq!(config.connectivity.sysfs_root, PathBuf::from("/sys/class/net"));
        assert_eq!(config.notifications.queue_capacity, 64);
    }

    #[test]
    fn reads_overrides() {
        let config = load_with(&[
            ("ALBUM_SERVICE_BASE_URL", "http://localhost:8080/api"),
            ("ALBUM_NAME", "captures"),
            ("ALBUM_OWNER", "u1"),
            ("ALBUM_AUTH_TOKEN", "secret-token"),
            ("UPLOAD_WIFI_ONLY", "yes"),
            ("UPLOAD_JPEG_QUALITY", "90"),
            ("CONNECTIVITY_MODE", "Mobile"),
            ("NOTIFICATION_QUEUE_CAPACITY", "4"),
        ])
        .unwrap();

        assert_eq!(
            config.album_service.base_url.as_str(),
            "http://localhost:8080/api"
        );
        assert_eq!(config.upload.album_name, "captures");
        assert_eq!(config.upload.jpeg_quality, 90);
        assert_eq!(config.request_defaults.owner.as_deref(), Some("u1"));
        assert!(config.request_defaults.wifi_only);
        assert_eq!(config.connectivity.mode, ConnectivityMode::Mobile);
        assert_eq!(config.notifications.queue_capacity, 4);
        assert!(!format!("{:?}", config.request_defaults).contains("secret-token"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load_with(&[("ALBUM_NAME", "  "), ("ALBUM_OWNER", "")]).unwrap();

        assert_eq!(config.upload.album_name, "smarter");
        assert!(config.request_defaults.owner.is_none());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let cases = [
            ("UPLOAD_JPEG_QUALITY", "0"),
            ("UPLOAD_JPEG_QUALITY", "high"),
            ("UPLOAD_WIFI_ONLY", "sometimes"),
            ("CONNECTIVITY_MODE", "satellite"),
            ("NOTIFICATION_QUEUE_CAPACITY", "0"),
            ("ALBUM_SERVICE_BASE_URL", "not a url"),
        ];

        for (key, value) in cases {
            let err = load_with(&[(key, value)]).unwrap_err();
            assert!(
                format!("{err:#}").contains(key),
                "error for {key}={value} should mention {key}: {err:#}"
            );
        }
    }
}
