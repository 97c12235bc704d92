use serde::Deserialize;

/// One page of the my-collection folder listing. Entries are adjacently
/// tagged by `itemType`; anything unrecognized still occupies its slot.
#[derive(Debug, Clone, Deserialize)]
pub struct TidalCollectionPage {
    #[serde(default)]
    pub items: Vec<TidalCollectionItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "itemType", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TidalCollectionItem {
    Folder(TidalFolderData),
    Playlist(TidalPlaylistData),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TidalFolderData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPlaylistData {
    pub uuid: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub public_playlist: bool,
}

/// Generic item page returned by the v1 listing and search endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TidalPage<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

/// Tidal track from API
#[derive(Debug, Clone, Deserialize)]
pub struct TidalTrack {
    pub id: Option<i64>,
    pub title: Option<String>,
    /// Seconds.
    pub duration: Option<u64>,
    pub isrc: Option<String>,
    #[serde(default)]
    pub artists: Vec<TidalArtist>,
    pub album: Option<TidalAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TidalArtist {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalAlbum {
    pub title: Option<String>,
    pub number_of_tracks: Option<u32>,
    pub artist: Option<TidalArtist>,
    #[serde(default)]
    pub artists: Vec<TidalArtist>,
}

/// Response of the add-by-ISRC call; empty when the ISRC is unknown to the
/// catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalAddResponse {
    #[serde(default)]
    pub added_item_ids: Vec<i64>,
}
