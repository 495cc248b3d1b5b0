use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use image::DynamicImage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            bail!("latitude out of range: {latitude}");
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            bail!("longitude out of range: {longitude}");
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// The media being uploaded. An image lives only in memory; a video is a
/// temporary file that is removed once the upload attempt ends.
#[derive(Debug, Clone)]
pub enum MediaPayload {
    Image(DynamicImage),
    Video(PathBuf),
}

impl MediaPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            MediaPayload::Image(_) => "image",
            MediaPayload::Video(_) => "video",
        }
    }

    pub fn video_path(&self) -> Option<&Path> {
        match self {
            MediaPayload::Video(path) => Some(path),
            MediaPayload::Image(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct UploadRequest {
    owner: String,
    payload: MediaPayload,
    auth_token: String,
    location: Option<GeoLocation>,
    wifi_only: bool,
}

impl UploadRequest {
    pub fn image(
        owner: impl Into<String>,
        image: DynamicImage,
        auth_token: impl Into<String>,
        location: Option<GeoLocation>,
        wifi_only: bool,
    ) -> Self {
        Self {
            owner: owner.into(),
            payload: MediaPayload::Image(image),
            auth_token: auth_token.into(),
            location,
            wifi_only,
        }
    }

    pub fn video(
        owner: impl Into<String>,
        video_path: impl Into<PathBuf>,
        auth_token: impl Into<String>,
        location: Option<GeoLocation>,
        wifi_only: bool,
    ) -> Self {
        Self {
            owner: owner.into(),
            payload: MediaPayload::Video(video_path.into()),
            auth_token: auth_token.into(),
            location,
            wifi_only,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn payload(&self) -> &MediaPayload {
        &self.payload
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    pub fn wifi_only(&self) -> bool {
        self.wifi_only
    }
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("owner", &self.owner)
            .field("payload", &self.payload.kind())
            .field("auth_token", &"<redacted>")
            .field("location", &self.location)
            .field("wifi_only", &self.wifi_only)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_coordinates_on_the_boundaries() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());

        let location = GeoLocation::new(37.0, -122.0).unwrap();
        assert_eq!(location.latitude(), 37.0);
        assert_eq!(location.longitude(), -122.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoLocation::new(90.5, 0.0).is_err());
        assert!(GeoLocation::new(0.0, -180.5).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
        assert!(GeoLocation::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn video_requests_expose_their_path() {
        let request = UploadRequest::video("u1", "/tmp/clip.mp4", "t", None, true);

        assert_eq!(request.payload().kind(), "video");
        assert_eq!(
            request.payload().video_path(),
            Some(Path::new("/tmp/clip.mp4"))
        );
        assert!(request.wifi_only());
    }

    #[test]
    fn image_requests_have_no_video_path() {
        let request =
            UploadRequest::image("u1", DynamicImage::new_rgb8(4, 4), "t", None, false);

        assert_eq!(request.payload().kind(), "image");
        assert!(request.payload().video_path().is_none());
        assert!(!format!("{request:?}").contains("\"t\""));
    }
}
