use std::{path::PathBuf, sync::Arc};

use album_uploader::{
    application::usecases::media_upload::MediaUploadTask,
    config::{
        config_loader,
        config_model::{ConnectivityMode, DotEnvyConfig},
    },
    domain::{
        repositories::connectivity::ConnectivityMonitor,
        value_objects::upload_request::{GeoLocation, UploadRequest},
    },
    infrastructure::{
        album_service::album_http_client::AlbumHttpClient,
        connectivity::{fixed::FixedConnectivity, sysfs::SysfsConnectivity},
    },
    observability::{
        self,
        console::ConsoleSink,
        notifier::{NotificationSink, UserNotifier},
    },
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "album-uploader",
    about = "Upload photos and videos into the capture album"
)]
struct Cli {
    /// Album owner (falls back to ALBUM_OWNER).
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Service token (falls back to ALBUM_AUTH_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Refuse to upload unless the host is on Wi-Fi.
    #[arg(long, global = true, default_value_t = false)]
    wifi_only: bool,

    #[arg(long, alias = "lat", global = true, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    #[arg(long, alias = "lon", global = true, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    #[command(subcommand)]
    media: MediaCommand,
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Upload images; each is decoded into memory and sent as JPEG.
    Image {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Upload videos. Each file is deleted once its upload attempt ends.
    Video {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config_loader::load()?;
    observability::init_observability("album-uploader")?;

    let failed = run(cli, config)?;
    if failed > 0 {
        error!(failed, "Some uploads failed");
        std::process::exit(1);
    }
    Ok(())
}

/// Uploads run on a worker runtime; this thread delivers notifications.
fn run(cli: Cli, config: DotEnvyConfig) -> Result<usize> {
    let requests = build_requests(&cli, &config)?;
    info!(count = requests.len(), "Uploads prepared");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let (notifier, dispatcher) = UserNotifier::channel(config.notifications.queue_capacity);

    let uploads = {
        let _guard = runtime.enter();
        let task = build_task(&config, notifier)?;
        requests
            .into_iter()
            .map(|(label, request)| (label, task.launch(request)))
            .collect::<Vec<_>>()
    };

    let sinks: Vec<Box<dyn NotificationSink>> = vec![Box::new(ConsoleSink::stderr())];
    let delivered = dispatcher.run_blocking(sinks);

    let (labels, handles): (Vec<_>, Vec<_>) = uploads.into_iter().unzip();
    let results = runtime.block_on(join_all(handles));

    let mut failed = 0;
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(result) if result.success => {
                info!(file = %label, "Upload finished");
            }
            Ok(result) => {
                failed += 1;
                error!(
                    file = %label,
                    kind = ?result.failure,
                    message = %result.message,
                    "Upload failed"
                );
            }
            Err(join_error) => {
                failed += 1;
                error!(file = %label, error = %join_error, "Upload task panicked");
            }
        }
    }

    info!(delivered, failed, "All uploads finished");
    Ok(failed)
}

fn build_task(config: &DotEnvyConfig, notifier: UserNotifier) -> Result<MediaUploadTask> {
    let album_service = Arc::new(AlbumHttpClient::new(config.album_service.clone())?);

    let connectivity: Arc<dyn ConnectivityMonitor + Send + Sync> = match config.connectivity.mode
    {
        ConnectivityMode::Auto => Arc::new(SysfsConnectivity::new(
            config.connectivity.sysfs_root.clone(),
        )),
        ConnectivityMode::Wifi => Arc::new(FixedConnectivity::new(true)),
        ConnectivityMode::Mobile => Arc::new(FixedConnectivity::new(false)),
    };
    info!(mode = %config.connectivity.mode, "Connectivity monitor selected");

    Ok(MediaUploadTask::new(
        album_service,
        connectivity,
        notifier,
        config.upload.clone(),
    ))
}

fn build_requests(cli: &Cli, config: &DotEnvyConfig) -> Result<Vec<(String, UploadRequest)>> {
    let defaults = &config.request_defaults;
    let owner = cli
        .owner
        .clone()
        .or_else(|| defaults.owner.clone())
        .context("no album owner: pass --owner or set ALBUM_OWNER")?;
    let token = cli
        .token
        .clone()
        .or_else(|| defaults.auth_token.clone())
        .context("no auth token: pass --token or set ALBUM_AUTH_TOKEN")?;
    let wifi_only = cli.wifi_only || defaults.wifi_only;

    let location = match (cli.latitude, cli.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoLocation::new(latitude, longitude)?),
        _ => None,
    };

    match &cli.media {
        MediaCommand::Image { paths } => paths
            .iter()
            .map(|path| {
                let image = image::open(path)
                    .with_context(|| format!("failed to decode image {}", path.display()))?;
                Ok((
                    path.display().to_string(),
                    UploadRequest::image(&owner, image, &token, location, wifi_only),
                ))
            })
            .collect(),
        MediaCommand::Video { paths } => Ok(paths
            .iter()
            .map(|path| {
                (
                    path.display().to_string(),
                    UploadRequest::video(&owner, path, &token, location, wifi_only),
                )
            })
            .collect()),
    }
}
