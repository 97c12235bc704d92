use async_trait::async_trait;

use crate::model::Track;
use crate::remote::RemoteError;

/// Decoupled representation of a source-catalog playlist listing entry.
#[derive(Debug, Clone)]
pub struct SourcePlaylist {
    pub id: String,
    pub name: String,
    /// Public link to the playlist, used in synced-from descriptions.
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// Port trait wrapping the read-only source catalog capabilities used by the
/// sync logic.
///
/// Implementations live in `spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn current_playlists(&self) -> Result<Vec<SourcePlaylist>, RemoteError>;

    /// One page of a playlist's tracks: one slot per remote record, `None`
    /// for records missing the fields matching needs (name, ISRC, duration).
    /// Slots keep the page count intact for end-of-listing detection.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Option<Track>>, RemoteError>;

    async fn cover_image(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}
