use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{
    Body, Client, Response,
    header::AUTHORIZATION,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{
    entities::{
        albums::{Album, NewAlbum},
        media_entries::{InsertedMedia, MediaBody, NewMediaEntry},
    },
    repositories::album_service::AlbumService,
    value_objects::{album_accounts::AlbumAccount, album_service_errors::AlbumServiceError},
};

pub const DEFAULT_BASE_URL: &str = "https://picasaweb.google.com/data/feed/api";
pub const DEFAULT_APPLICATION_NAME: &str = "ImageUploader";

const FEED_REL: &str = "feed";
const BODY_PREVIEW_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct AlbumHttpConfig {
    pub base_url: Url,
    pub application_name: String,
}

#[derive(Debug, Deserialize)]
struct UserFeed {
    #[serde(default)]
    entries: Vec<AlbumEntry>,
}

#[derive(Debug, Deserialize)]
struct AlbumEntry {
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

#[derive(Debug, Serialize)]
struct NewAlbumEntry<'a> {
    title: &'a str,
    summary: &'a str,
}

#[derive(Debug, Serialize)]
struct MediaMetadata<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo: Option<GeoPoint>,
}

#[derive(Debug, Serialize)]
struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct MediaEntry {
    #[serde(default)]
    id: Option<String>,
    title: String,
}

impl AlbumEntry {
    fn into_album(self) -> Option<Album> {
        let href = self
            .links
            .iter()
            .find(|link| link.rel == FEED_REL)
            .map(|link| link.href.as_str());

        let Some(href) = href else {
            warn!(album = %self.title, "album_http: album entry has no feed link; skipping");
            return None;
        };

        match Url::parse(href) {
            Ok(feed_endpoint) => Some(Album {
                name: self.title,
                description: self.summary,
                feed_endpoint,
            }),
            Err(err) => {
                warn!(
                    album = %self.title,
                    error = %err,
                    "album_http: album feed link is not a valid URL; skipping"
                );
                None
            }
        }
    }
}

/// `AlbumService` over HTTP. Albums live under `{base}/user/{owner}`; media is
/// posted as multipart (JSON metadata + raw bytes) to an album's feed link.
pub struct AlbumHttpClient {
    client: Client,
    base_url: Url,
}

impl AlbumHttpClient {
    pub fn new(config: AlbumHttpConfig) -> Result<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(anyhow!(
                "album service base URL cannot carry paths: {}",
                config.base_url
            ));
        }

        let client = Client::builder()
            .user_agent(config.application_name)
            .build()
            .context("failed to build album service http client")?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    /// `{base}/user/{owner}`, with a trailing slash when `trailing_slash` is set.
    fn user_feed_url(&self, owner: &str, trailing_slash: bool) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("album service base URL cannot carry paths"))?;
            segments.pop_if_empty().push("user").push(owner);
            if trailing_slash {
                segments.push("");
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl AlbumService for AlbumHttpClient {
    async fn list_albums(&self, account: &AlbumAccount) -> Result<Vec<Album>> {
        let url = self.user_feed_url(&account.owner, false)?;
        debug!(url = %url, "album_http: get feed");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth_header(&account.auth_token))
            .send()
            .await
            .map_err(|err| transport_error("list albums", err))?;

        let response = check_status(response, "list albums").await?;
        let feed: UserFeed = decode_json(response, "list albums").await?;

        Ok(feed
            .entries
            .into_iter()
            .filter_map(AlbumEntry::into_album)
            .collect())
    }

    async fn create_album(&self, account: &AlbumAccount, album: &NewAlbum) -> Result<Album> {
        let url = self.user_feed_url(&account.owner, true)?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, auth_header(&account.auth_token))
            .json(&NewAlbumEntry {
                title: &album.name,
                summary: &album.description,
            })
            .send()
            .await
            .map_err(|err| transport_error("create album", err))?;

        let response = check_status(response, "create album").await?;
        let status = response.status().as_u16();
        let entry: AlbumEntry = decode_json(response, "create album").await?;

        let created = entry.into_album().ok_or_else(|| {
            AlbumServiceError::service(
                status,
                format!(
                    "created album {} came back without a usable feed link",
                    album.name
                ),
            )
        })?;

        info!(
            owner = %account.owner,
            album = %created.name,
            "album_http: album created"
        );

        Ok(created)
    }

    async fn insert_media(
        &self,
        account: &AlbumAccount,
        album: &Album,
        entry: NewMediaEntry,
    ) -> Result<InsertedMedia> {
        let metadata = serde_json::to_string(&MediaMetadata {
            title: &entry.title,
            geo: entry.location.map(|location| GeoPoint {
                latitude: location.latitude(),
                longitude: location.longitude(),
            }),
        })
        .context("failed to encode media metadata")?;

        let metadata_part = Part::text(metadata)
            .mime_str("application/json")
            .map_err(|err| transport_error("build metadata part", err))?;
        let media_part = match entry.body {
            MediaBody::Bytes(bytes) => Part::bytes(bytes),
            MediaBody::File { path, size_bytes } => {
                let file = File::open(&path)
                    .await
                    .with_context(|| format!("failed to open media file {}", path.display()))?;
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), size_bytes)
            }
        };
        let media_part = media_part
            .file_name(entry.title.clone())
            .mime_str(&entry.content_type)
            .map_err(|err| transport_error("build media part", err))?;
        let form = Form::new()
            .part("metadata", metadata_part)
            .part("media", media_part);

        let response = self
            .client
            .post(album.feed_endpoint.clone())
            .header(AUTHORIZATION, auth_header(&account.auth_token))
            .multipart(form)
            .send()
            .await
            .map_err(|err| transport_error("insert media", err))?;

        let response = check_status(response, "insert media").await?;
        let inserted: MediaEntry = decode_json(response, "insert media").await?;

        Ok(InsertedMedia {
            id: inserted.id,
            title: inserted.title,
        })
    }
}

fn auth_header(token: &str) -> String {
    format!("AuthSub token=\"{}\"", token)
}

async fn check_status(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .map(|b| b.trim().to_owned())
        .unwrap_or_default();

    let mut detail = format!("failed to {} (status {})", action, status.as_u16());
    if !body.is_empty() {
        // Keep a short preview of the response body for debugging.
        let preview = body.chars().take(BODY_PREVIEW_CHARS).collect::<String>();
        detail.push_str(&format!(": {}", preview));
    }

    Err(AlbumServiceError::service(status.as_u16(), detail))
}

/// Reads a 2xx body as JSON. An undecodable body becomes a `Service` error
/// carrying the response status.
async fn decode_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|err| transport_error(action, err))?;

    serde_json::from_slice(&body).map_err(|err| {
        AlbumServiceError::service(
            status,
            format!("failed to {}: unreadable response body ({})", action, err),
        )
    })
}

fn transport_error(action: &str, err: reqwest::Error) -> anyhow::Error {
    let message = if err.is_timeout() {
        format!("failed to {}: request timed out", action)
    } else if err.is_connect() {
        format!("failed to {}: connection failed", action)
    } else {
        format!("failed to {}", action)
    };
    AlbumServiceError::transport_with_source(message, err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> AlbumHttpClient {
        AlbumHttpClient::new(AlbumHttpConfig {
            base_url: Url::parse(base).unwrap(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn user_feed_url_appends_owner_segment() {
        let client = client("https://albums.example.com/data/feed/api");

        assert_eq!(
            client.user_feed_url("u1@example.com", false).unwrap().as_str(),
            "https://albums.example.com/data/feed/api/user/u1@example.com"
        );
        assert_eq!(
            client.user_feed_url("u1", true).unwrap().as_str(),
            "https://albums.example.com/data/feed/api/user/u1/"
        );
    }

    #[test]
    fn user_feed_url_tolerates_trailing_slash_in_base() {
        let client = client("https://albums.example.com/api/");

        assert_eq!(
            client.user_feed_url("u1", false).unwrap().as_str(),
            "https://albums.example.com/api/user/u1"
        );
    }

    #[test]
    fn owner_is_escaped_as_a_single_segment() {
        let client = client("https://albums.example.com/api");

        assert_eq!(
            client.user_feed_url("a/b c", false).unwrap().as_str(),
            "https://albums.example.com/api/user/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_base_urls_without_paths() {
        let result = AlbumHttpClient::new(AlbumHttpConfig {
            base_url: Url::parse("mailto:someone@example.com").unwrap(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        });

        assert!(result.is_err());
    }

    #[test]
    fn auth_header_uses_authsub_scheme() {
        assert_eq!(auth_header("abc"), "AuthSub token=\"abc\"");
    }

    #[test]
    fn album_entry_without_feed_link_is_skipped() {
        let entry = AlbumEntry {
            title: "smarter".to_string(),
            summary: String::new(),
            links: vec![Link {
                rel: "alternate".to_string(),
                href: "https://albums.example.com/u1/smarter".to_string(),
            }],
        };

        assert!(entry.into_album().is_none());
    }

    #[test]
    fn album_entry_uses_feed_link_as_endpoint() {
        let entry = AlbumEntry {
            title: "smarter".to_string(),
            summary: "pics".to_string(),
            links: vec![
                Link {
                    rel: "alternate".to_string(),
                    href: "https://albums.example.com/u1/smarter".to_string(),
                },
                Link {
                    rel: "feed".to_string(),
                    href: "https://albums.example.com/feed/api/user/u1/albumid/9".to_string(),
                },
            ],
        };

        let album = entry.into_album().unwrap();
        assert_eq!(album.name, "smarter");
        assert_eq!(album.description, "pics");
        assert_eq!(
            album.feed_endpoint.as_str(),
            "https://albums.example.com/feed/api/user/u1/albumid/9"
        );
    }

    #[test]
    fn metadata_omits_geo_when_absent() {
        let json = serde_json::to_value(MediaMetadata {
            title: "clip.mp4",
            geo: None,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({ "title": "clip.mp4" }));
    }
}
