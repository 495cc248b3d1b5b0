use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::{
        albums::{Album, NewAlbum},
        media_entries::{InsertedMedia, NewMediaEntry},
    },
    value_objects::album_accounts::AlbumAccount,
};

/// Remote photo-hosting service. Failures should carry an
/// `AlbumServiceError` so callers can tell transport from rejection.
#[automock]
#[async_trait]
pub trait AlbumService {
    async fn list_albums(&self, account: &AlbumAccount) -> Result<Vec<Album>>;

    async fn create_album(&self, account: &AlbumAccount, album: &NewAlbum) -> Result<Album>;

    async fn insert_media(
        &self,
        account: &AlbumAccount,
        album: &Album,
        entry: NewMediaEntry,
    ) -> Result<InsertedMedia>;
}
