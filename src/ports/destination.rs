use async_trait::async_trait;

use crate::model::{Track, TrackId};
use crate::remote::RemoteError;

/// Handle to a folder in the destination account's playlist hierarchy.
#[derive(Debug, Clone)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// Handle to a destination playlist, as returned by listing or creation.
#[derive(Debug, Clone)]
pub struct PlaylistHandle {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: bool,
}

/// One entry of a folder listing; destination folders mix playlists and
/// nested folders. Entries of neither kind still occupy their page slot.
#[derive(Debug, Clone)]
pub enum FolderItem {
    Playlist(PlaylistHandle),
    Folder(Folder),
    Other,
}

/// Port trait wrapping the destination catalog capabilities used by the merge
/// and reorder engines. All methods may fail transiently; callers route them
/// through the retry wrapper.
///
/// Implementations live in `tidal::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn playlist_folders(&self) -> Result<Vec<Folder>, RemoteError>;

    async fn root_folder(&self) -> Result<Folder, RemoteError>;

    async fn create_folder(&self, name: &str) -> Result<Folder, RemoteError>;

    async fn folder_items(
        &self,
        folder_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FolderItem>, RemoteError>;

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        parent_folder_id: &str,
    ) -> Result<PlaylistHandle, RemoteError>;

    /// One page of a playlist's tracks: one slot per remote record, `None`
    /// for records missing the fields matching needs (name, ISRC, id,
    /// duration). Slots keep the page count intact for end-of-listing
    /// detection.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Option<Track>>, RemoteError>;

    async fn edit_description(
        &self,
        playlist_id: &str,
        description: &str,
    ) -> Result<(), RemoteError>;

    async fn set_public(&self, playlist_id: &str) -> Result<(), RemoteError>;

    /// Add a track to a playlist by its ISRC. `Ok(false)` means the remote
    /// accepted the call but added nothing.
    async fn add_track_by_isrc(
        &self,
        playlist_id: &str,
        isrc: &str,
    ) -> Result<bool, RemoteError>;

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, RemoteError>;

    /// Re-set the playlist's contents to exactly `track_ids`, in order.
    async fn replace_items(
        &self,
        playlist_id: &str,
        track_ids: &[TrackId],
    ) -> Result<(), RemoteError>;
}
