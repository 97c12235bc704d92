use serde::Deserialize;

/// Spotify playlist listing entry
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub external_urls: Option<SpotifyExternalUrls>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistsResponse {
    pub items: Vec<SpotifyPlaylist>,
    pub next: Option<String>,
}

/// One slot of a playlist tracks page; `track` is absent for unavailable
/// items (removed episodes, region-locked entries).
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTracksPage {
    pub items: Vec<SpotifyPlaylistItem>,
}

/// Spotify track from API
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    pub external_ids: Option<SpotifyExternalIds>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: Option<String>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyExternalIds {
    pub isrc: Option<String>,
}
