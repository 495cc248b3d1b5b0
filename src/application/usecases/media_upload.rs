use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use image::{DynamicImage, codecs::jpeg::JpegEncoder};
use tokio::{
    fs,
    task::{self, JoinHandle},
};
use tracing::{debug, error, info, trace, warn};

use crate::domain::{
    entities::{
        albums::{Album, NewAlbum},
        media_entries::{MediaBody, NewMediaEntry},
    },
    repositories::{album_service::AlbumService, connectivity::ConnectivityMonitor},
    value_objects::{
        album_accounts::AlbumAccount,
        album_service_errors::AlbumServiceError,
        enums::{
            notification_durations::NotificationDuration, upload_failure_kinds::UploadFailureKind,
        },
        upload_request::{MediaPayload, UploadRequest},
        upload_result::UploadResult,
    },
};
use crate::observability::notifier::UserNotifier;

pub const DEFAULT_ALBUM_NAME: &str = "smarter";
pub const DEFAULT_ALBUM_DESCRIPTION: &str = "Helios SmartHome Project Pics";
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

const IMAGE_TITLE_PREFIX: &str = "Barcode_";
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const FALLBACK_VIDEO_CONTENT_TYPE: &str = "video/mpeg4";
const NOT_ON_WIFI_MESSAGE: &str = "Upload unsuccessful - not on Wifi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub album_name: String,
    pub album_description: String,
    pub jpeg_quality: u8,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            album_name: DEFAULT_ALBUM_NAME.to_string(),
            album_description: DEFAULT_ALBUM_DESCRIPTION.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Uploads one photo or video into the owner's capture album.
///
/// Each request is independent: the album is looked up (and created when
/// missing) on every run, nothing is retried, and a video file is always
/// removed once the attempt is over. Failures reach the user through the
/// notifier; the caller gets an `UploadResult`.
#[derive(Clone)]
pub struct MediaUploadTask {
    album_service: Arc<dyn AlbumService + Send + Sync>,
    connectivity: Arc<dyn ConnectivityMonitor + Send + Sync>,
    notifier: UserNotifier,
    settings: UploadSettings,
}

#[derive(Debug)]
struct UploadFailure {
    kind: UploadFailureKind,
    message: String,
    duration: NotificationDuration,
}

#[derive(Debug, Clone, Copy)]
enum UploadStage {
    Album,
    Prepare,
    Insert,
}

impl MediaUploadTask {
    pub fn new(
        album_service: Arc<dyn AlbumService + Send + Sync>,
        connectivity: Arc<dyn ConnectivityMonitor + Send + Sync>,
        notifier: UserNotifier,
        settings: UploadSettings,
    ) -> Self {
        Self {
            album_service,
            connectivity,
            notifier,
            settings,
        }
    }

    /// Runs the upload on the tokio runtime and returns immediately.
    pub fn launch(&self, request: UploadRequest) -> JoinHandle<UploadResult> {
        let task = self.clone();
        tokio::spawn(async move { task.execute(request).await })
    }

    pub async fn execute(&self, request: UploadRequest) -> UploadResult {
        let outcome = self.upload(&request).await;

        if let Some(path) = request.payload().video_path() {
            remove_temp_video_file(path).await;
        }

        match outcome {
            Ok(()) => {
                info!(
                    owner = %request.owner(),
                    media = request.payload().kind(),
                    "media_upload: upload successful"
                );
                UploadResult::succeeded("Upload successful")
            }
            Err(failure) => {
                self.notifier.notify(failure.message.clone(), failure.duration);
                UploadResult::failed(failure.kind, failure.message)
            }
        }
    }

    async fn upload(&self, request: &UploadRequest) -> Result<(), UploadFailure> {
        if request.wifi_only() && !self.connectivity.is_wifi_connected().await {
            // Dropped, not queued: the request is not retried once Wi-Fi returns.
            info!(
                owner = %request.owner(),
                media = request.payload().kind(),
                "media_upload: upload unsuccessful - not on wifi"
            );
            return Err(UploadFailure {
                kind: UploadFailureKind::PolicyAbort,
                message: NOT_ON_WIFI_MESSAGE.to_string(),
                duration: NotificationDuration::Long,
            });
        }

        let account = AlbumAccount::new(request.owner(), request.auth_token());

        let album = self
            .resolve_album(&account)
            .await
            .map_err(|err| self.failure(request, UploadStage::Album, err))?;

        let entry = self
            .prepare_entry(request)
            .await
            .map_err(|err| self.failure(request, UploadStage::Prepare, err))?;

        debug!(
            owner = %account.owner,
            album = %album.name,
            title = %entry.title,
            content_type = %entry.content_type,
            size_bytes = entry.body.size_bytes(),
            "media_upload: inserting media"
        );

        let inserted = self
            .album_service
            .insert_media(&account, &album, entry)
            .await
            .map_err(|err| self.failure(request, UploadStage::Insert, err))?;

        debug!(
            owner = %account.owner,
            album = %album.name,
            media_id = ?inserted.id,
            title = %inserted.title,
            "media_upload: media inserted"
        );

        Ok(())
    }

    async fn resolve_album(&self, account: &AlbumAccount) -> Result<Album> {
        let albums = self.album_service.list_albums(account).await?;

        debug!(owner = %account.owner, count = albums.len(), "media_upload: got albums");
        for album in &albums {
            debug!(
                album = %album.name,
                feed = %album.feed_endpoint,
                "media_upload: album"
            );
        }

        if let Some(album) = albums
            .into_iter()
            .find(|album| album.name == self.settings.album_name)
        {
            return Ok(album);
        }

        let new_album = NewAlbum {
            name: self.settings.album_name.clone(),
            description: self.settings.album_description.clone(),
        };
        let album = self.album_service.create_album(account, &new_album).await?;

        info!(
            owner = %account.owner,
            album = %album.name,
            "media_upload: album created"
        );

        Ok(album)
    }

    async fn prepare_entry(&self, request: &UploadRequest) -> Result<NewMediaEntry> {
        match request.payload() {
            MediaPayload::Image(image) => {
                let image = image.clone();
                let quality = self.settings.jpeg_quality;
                let bytes = task::spawn_blocking(move || encode_jpeg(&image, quality))
                    .await
                    .context("jpeg encoding task failed")??;
                Ok(NewMediaEntry {
                    title: image_title(Local::now().naive_local()),
                    content_type: IMAGE_CONTENT_TYPE.to_string(),
                    body: MediaBody::Bytes(bytes),
                    location: request.location(),
                })
            }
            MediaPayload::Video(path) => {
                let title = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .with_context(|| format!("video path has no file name: {}", path.display()))?;
                let metadata = fs::metadata(path)
                    .await
                    .with_context(|| format!("failed to read video file {}", path.display()))?;
                if !metadata.is_file() {
                    anyhow::bail!("video path is not a file: {}", path.display());
                }

                if let Some(location) = request.location() {
                    trace!(
                        latitude = location.latitude(),
                        longitude = location.longitude(),
                        "media_upload: uploading video with location"
                    );
                }

                Ok(NewMediaEntry {
                    title,
                    content_type: video_content_type(path).to_string(),
                    body: MediaBody::File {
                        path: path.to_path_buf(),
                        size_bytes: metadata.len(),
                    },
                    location: request.location(),
                })
            }
        }
    }

    fn failure(
        &self,
        request: &UploadRequest,
        stage: UploadStage,
        err: anyhow::Error,
    ) -> UploadFailure {
        let service_error = AlbumServiceError::find(&err);
        let kind = match service_error {
            Some(service_error) if !service_error.is_transport() => UploadFailureKind::Service,
            _ => UploadFailureKind::Transport,
        };

        error!(
            owner = %request.owner(),
            media = request.payload().kind(),
            stage = ?stage,
            kind = %kind,
            status = ?service_error.and_then(|e| e.status()),
            error = ?err,
            "media_upload: upload failed"
        );

        let detail = format!("{err:#}");
        let (message, duration) = match (stage, request.payload()) {
            (UploadStage::Insert, MediaPayload::Image(_)) => (
                "Insertion error: Could not upload photo".to_string(),
                NotificationDuration::Short,
            ),
            (UploadStage::Insert, MediaPayload::Video(_)) => (
                format!("Video upload error: {detail}"),
                NotificationDuration::Long,
            ),
            _ => match service_error {
                Some(service_error) if service_error.is_forbidden() => (
                    format!("Service forbidden: {detail}"),
                    NotificationDuration::Short,
                ),
                Some(service_error) if !service_error.is_transport() => (
                    format!("Service error: {detail}"),
                    NotificationDuration::Short,
                ),
                _ => (
                    format!("Following error occurred, please try again. {detail}"),
                    NotificationDuration::Short,
                ),
            },
        };

        UploadFailure {
            kind,
            message,
            duration,
        }
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = image.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&rgb)
        .context("failed to encode image as jpeg")?;
    Ok(encoded)
}

/// `Barcode_dd_MM_yyyy_hh_mm_ss`, 12-hour clock.
fn image_title(now: NaiveDateTime) -> String {
    format!("{}{}", IMAGE_TITLE_PREFIX, now.format("%d_%m_%Y_%I_%M_%S"))
}

fn video_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .filter(|mime| mime.starts_with("video/"))
        .unwrap_or(FALLBACK_VIDEO_CONTENT_TYPE)
}

async fn remove_temp_video_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "media_upload: removed temp video file");
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "media_upload: temp video file already gone");
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "media_upload: failed to remove temp video file"
            );
        }
    }
}
