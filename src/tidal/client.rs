use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::model::{Album, Track, TrackId};
use crate::ports::destination::{DestinationCatalog, Folder, FolderItem, PlaylistHandle};
use crate::remote::{RemoteError, classify_response};
use crate::tidal::types::{
    TidalAddResponse, TidalAlbum, TidalCollectionItem, TidalCollectionPage, TidalFolderData,
    TidalPage, TidalPlaylistData, TidalTrack,
};

const API_BASE: &str = "https://api.tidal.com";

/// Identifier of the implicit top-level folder of the account's playlist
/// hierarchy.
const ROOT_FOLDER_ID: &str = "root";

/// Tidal API client. The access token comes from configuration; the OAuth
/// device flow that produces it lives outside this tool.
pub struct TidalClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl TidalClient {
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

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request
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

    async fn send_expect_ok(&self, request: reqwest::RequestBuilder) -> Result<(), RemoteError> {
        let response = request
            .bearer_auth(&self.access_token)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        classify_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DestinationCatalog for TidalClient {
    async fn playlist_folders(&self) -> Result<Vec<Folder>, RemoteError> {
        let url = format!(
            "{}/v2/my-collection/playlists/folders?folderId={ROOT_FOLDER_ID}&limit=50",
            self.base_url
        );
        let page: TidalCollectionPage = self.get_json(&url).await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(|item| match item {
                TidalCollectionItem::Folder(folder) => Some(parse_folder(folder)),
                _ => None,
            })
            .collect())
    }

    async fn root_folder(&self) -> Result<Folder, RemoteError> {
        Ok(Folder {
            id: ROOT_FOLDER_ID.to_string(),
            name: "Root".to_string(),
        })
    }

    async fn create_folder(&self, name: &str) -> Result<Folder, RemoteError> {
        let url = format!(
            "{}/v2/my-collection/playlists/folders/create-folder",
            self.base_url
        );
        let request = self
            .client
            .put(&url)
            .query(&[("name", name), ("folderId", ROOT_FOLDER_ID)]);

        let folder: TidalFolderData = self.send_json(request).await?;
        Ok(parse_folder(folder))
    }

    async fn folder_items(
        &self,
        folder_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FolderItem>, RemoteError> {
        let url = format!(
            "{}/v2/my-collection/playlists/folders/{}/items?offset={}&limit={}",
            self.base_url, folder_id, offset, limit
        );
        let page: TidalCollectionPage = self.get_json(&url).await?;

        Ok(page
            .items
            .into_iter()
            .map(|item| match item {
                TidalCollectionItem::Playlist(playlist) => {
                    FolderItem::Playlist(parse_playlist(playlist))
                }
                TidalCollectionItem::Folder(folder) => FolderItem::Folder(parse_folder(folder)),
                TidalCollectionItem::Unknown => FolderItem::Other,
            })
            .collect())
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        parent_folder_id: &str,
    ) -> Result<PlaylistHandle, RemoteError> {
        let url = format!(
            "{}/v2/my-collection/playlists/folders/create-playlist",
            self.base_url
        );
        let request = self.client.put(&url).query(&[
            ("name", name),
            ("description", description),
            ("folderId", parent_folder_id),
        ]);

        let playlist: TidalPlaylistData = self.send_json(request).await?;
        Ok(parse_playlist(playlist))
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Option<Track>>, RemoteError> {
        let url = format!(
            "{}/v1/playlists/{}/tracks?offset={}&limit={}",
            self.base_url, playlist_id, offset, limit
        );
        let page: TidalPage<TidalTrack> = self.get_json(&url).await?;

        Ok(page.items.into_iter().map(parse_track).collect())
    }

    async fn edit_description(
        &self,
        playlist_id: &str,
        description: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/v1/playlists/{}", self.base_url, playlist_id);
        let request = self
            .client
            .post(&url)
            .form(&[("description", description)]);

        self.send_expect_ok(request).await
    }

    async fn set_public(&self, playlist_id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/v2/playlists/{}/set-public", self.base_url, playlist_id);
        self.send_expect_ok(self.client.put(&url)).await
    }

    async fn add_track_by_isrc(
        &self,
        playlist_id: &str,
        isrc: &str,
    ) -> Result<bool, RemoteError> {
        let url = format!("{}/v1/playlists/{}/items", self.base_url, playlist_id);
        let request = self
            .client
            .post(&url)
            .form(&[("isrcs", isrc), ("onDupes", "SKIP")]);

        let added: TidalAddResponse = self.send_json(request).await?;
        Ok(!added.added_item_ids.is_empty())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, RemoteError> {
        let url = format!(
            "{}/v1/search/tracks?query={}&limit=50",
            self.base_url,
            urlencoding::encode(query)
        );
        let page: TidalPage<TidalTrack> = self.get_json(&url).await?;

        Ok(page.items.into_iter().filter_map(parse_track).collect())
    }

    async fn replace_items(
        &self,
        playlist_id: &str,
        track_ids: &[TrackId],
    ) -> Result<(), RemoteError> {
        let ids = track_ids
            .iter()
            .map(TrackId::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/v1/playlists/{}/tracks", self.base_url, playlist_id);
        let request = self.client.put(&url).form(&[("trackIds", ids.as_str())]);

        self.send_expect_ok(request).await
    }
}

fn parse_folder(folder: TidalFolderData) -> Folder {
    Folder {
        id: folder.id,
        name: folder.name,
    }
}

fn parse_playlist(playlist: TidalPlaylistData) -> PlaylistHandle {
    PlaylistHandle {
        id: playlist.uuid,
        name: playlist.title,
        description: playlist.description,
        public: playlist.public_playlist,
    }
}

fn parse_track(track: TidalTrack) -> Option<Track> {
    let Some(title) = track.title else {
        log::debug!("Tidal track has no title");
        return None;
    };

    let Some(isrc) = track.isrc else {
        log::debug!("Tidal track '{title}' has no ISRC");
        return None;
    };

    let Some(id) = track.id else {
        log::debug!("Tidal track '{title}' has no id");
        return None;
    };

    let Some(duration) = track.duration else {
        log::debug!("Tidal track '{title}' has no duration");
        return None;
    };

    let artists: HashSet<String> = track
        .artists
        .into_iter()
        .filter_map(|artist| artist.name)
        .collect();

    let album = track.album.and_then(parse_album);

    Some(Track {
        id: TrackId::Numeric(id),
        isrc: isrc.to_uppercase(),
        name: title,
        duration: Duration::from_secs(duration),
        artists,
        album,
    })
}

fn parse_album(album: TidalAlbum) -> Option<Album> {
    let Some(name) = album.title else {
        log::debug!("Tidal album has no title");
        return None;
    };

    let mut artists: HashSet<String> = album
        .artists
        .into_iter()
        .filter_map(|artist| artist.name)
        .collect();
    if let Some(main) = album.artist.and_then(|artist| artist.name) {
        artists.insert(main);
    }

    Some(Album {
        name,
        total_tracks: album.number_of_tracks.unwrap_or(0),
        artists,
    })
}
