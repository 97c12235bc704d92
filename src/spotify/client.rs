use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::model::{Album, Track, TrackId};
use crate::ports::source::{SourceCatalog, SourcePlaylist};
use crate::remote::{RemoteError, classify_response};
use crate::spotify::types::{
    SpotifyAlbum, SpotifyPlaylistsResponse, SpotifyTrack, SpotifyTracksPage,
};

const API_BASE: &str = "https://api.spotify.com/v1";

/// Spotify Web API client. The access token comes from configuration; token
/// acquisition and refresh live outside this tool.
pub struct SpotifyClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(access_token: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| API_BASE.to_string()),
            access_token,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let response = classify_response(response).await?;
        response
            .json()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }
}

#[async_trait]
impl SourceCatalog for SpotifyClient {
    async fn current_playlists(&self) -> Result<Vec<SourcePlaylist>, RemoteError> {
        let mut playlists = Vec::new();
        let mut next_url = Some(format!("{}/me/playlists?limit=50", self.base_url));

        while let Some(url) = next_url {
            let page: SpotifyPlaylistsResponse = self.get_json(&url).await?;

            for playlist in page.items {
                playlists.push(SourcePlaylist {
                    id: playlist.id,
                    name: playlist.name,
                    url: playlist.external_urls.and_then(|urls| urls.spotify),
                    image_url: playlist.images.into_iter().find_map(|image| image.url),
                });
            }

            next_url = page.next;
        }

        Ok(playlists)
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Option<Track>>, RemoteError> {
        let url = format!(
            "{}/playlists/{}/tracks?offset={}&limit={}",
            self.base_url, playlist_id, offset, limit
        );
        let page: SpotifyTracksPage = self.get_json(&url).await?;

        Ok(page
            .items
            .into_iter()
            .map(|item| item.track.and_then(parse_track))
            .collect())
    }

    async fn cover_image(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        let response = classify_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn parse_track(track: SpotifyTrack) -> Option<Track> {
    let Some(name) = track.name else {
        log::debug!("Spotify track has no name");
        return None;
    };

    let Some(isrc) = track.external_ids.and_then(|ids| ids.isrc) else {
        log::debug!("Spotify track '{name}' has no ISRC");
        return None;
    };

    let Some(duration_ms) = track.duration_ms else {
        log::debug!("Spotify track '{name}' has no duration");
        return None;
    };

    let artists = track
        .artists
        .into_iter()
        .filter_map(|artist| artist.name)
        .collect();

    let album = track.album.and_then(parse_album);

    let id = match track.id {
        Some(id) => TrackId::Text(id),
        None => TrackId::Numeric(-1),
    };

    Some(Track {
        id,
        isrc: isrc.to_uppercase(),
        name,
        duration: Duration::from_millis(duration_ms),
        artists,
        album,
    })
}

fn parse_album(album: SpotifyAlbum) -> Option<Album> {
    let Some(name) = album.name else {
        log::debug!("Spotify album has no name");
        return None;
    };

    let Some(total_tracks) = album.total_tracks else {
        log::debug!("Spotify album '{name}' has no track total");
        return None;
    };

    Some(Album {
        name,
        total_tracks,
        artists: album
            .artists
            .into_iter()
            .filter_map(|artist| artist.name)
            .collect(),
    })
}
