//! Reconciliation engine: merge a source track list into a destination
//! playlist, creating the playlist (and its parent folder) when missing and
//! classifying every source track into one of four outcomes.

use color_eyre::eyre::{Result, WrapErr};
use futures::{StreamExt, future, pin_mut};

use crate::model::{AddedTracksResult, Track};
use crate::ports::destination::{DestinationCatalog, Folder, FolderItem, PlaylistHandle};
use crate::remote::fetch::{fetch_paginated, retry_on_transient};
use crate::services::DESTINATION_PAGE_SIZE;

/// A merged destination playlist together with its per-track outcomes.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub playlist: PlaylistHandle,
    pub result: AddedTracksResult,
}

/// Merge `source_tracks` into the destination playlist named `playlist_name`.
///
/// Folder and playlist resolution, description updates and the set-public
/// call are fatal when they fail; per-track outcomes (already present, no
/// search match, add rejected) are data in the returned result. Tracks
/// already added before a later fatal step stay added; there is no rollback.
pub async fn merge_playlist<D: DestinationCatalog>(
    destination: &D,
    source_tracks: &[Track],
    playlist_name: &str,
    description: Option<&str>,
    parent_folder_name: Option<&str>,
) -> Result<MergeOutcome> {
    log::info!(
        "Merging {} tracks into destination playlist '{}'",
        source_tracks.len(),
        playlist_name
    );

    // Step 1: resolve the parent folder
    let folder = resolve_folder(destination, parent_folder_name).await?;

    // Step 2: resolve the playlist and the dedup snapshot of its tracks
    let (playlist, existing_tracks) =
        resolve_playlist(destination, &folder, playlist_name, description).await?;

    // Step 3: bring description and visibility in line (no-ops when already correct)
    if let Some(description) = description
        && playlist.description.as_deref() != Some(description)
    {
        log::info!("Updating description of playlist '{}'", playlist.name);
        retry_on_transient(|| destination.edit_description(&playlist.id, description))
            .await
            .wrap_err_with(|| {
                format!("Failed to update description of playlist '{}'", playlist.name)
            })?;
    }

    if !playlist.public {
        log::info!("Setting playlist '{}' public", playlist.name);
        retry_on_transient(|| destination.set_public(&playlist.id))
            .await
            .wrap_err_with(|| format!("Failed to set playlist '{}' public", playlist.name))?;
    }

    // Step 4: classify every source track
    let mut result = AddedTracksResult::default();

    for (index, track) in source_tracks.iter().enumerate() {
        log::debug!(
            "Processing track {}/{}: {}",
            index + 1,
            source_tracks.len(),
            track.full_name()
        );

        if let Some(existing) = existing_tracks
            .iter()
            .find(|existing| existing.is_same_recording(track))
        {
            log::info!(
                "Track {} already in playlist '{}', skipping",
                existing.full_name(),
                playlist.name
            );
            result.record_skipped(existing.clone());
            continue;
        }

        let Some(found) = search_track(destination, track).await else {
            log::warn!(
                "Cannot add track {} to playlist '{}': no match found",
                track.full_name(),
                playlist.name
            );
            result.record_not_found(track.clone());
            continue;
        };

        log::info!(
            "Adding track {} to playlist '{}'",
            found.full_name(),
            playlist.name
        );
        let added =
            retry_on_transient(|| destination.add_track_by_isrc(&playlist.id, &found.isrc)).await;
        match added {
            Ok(true) => result.record_added(found),
            Ok(false) => {
                log::error!(
                    "Destination did not accept track {} for playlist '{}'",
                    found.full_name(),
                    playlist.name
                );
                result.record_add_error(found);
            }
            Err(err) => {
                log::error!(
                    "Error adding track {} to playlist '{}': {err}",
                    found.full_name(),
                    playlist.name
                );
                result.record_add_error(found);
            }
        }
    }

    Ok(MergeOutcome { playlist, result })
}

async fn resolve_folder<D: DestinationCatalog>(
    destination: &D,
    parent_folder_name: Option<&str>,
) -> Result<Folder> {
    let Some(name) = parent_folder_name else {
        return retry_on_transient(|| destination.root_folder())
            .await
            .wrap_err("Failed to fetch the root playlist folder");
    };

    let folders = retry_on_transient(|| destination.playlist_folders())
        .await
        .wrap_err_with(|| format!("Failed to fetch playlist folders looking for '{name}'"))?;

    if let Some(folder) = folders.into_iter().find(|folder| folder.name == name) {
        return Ok(folder);
    }

    log::info!("Folder '{name}' not found, creating it");
    retry_on_transient(|| destination.create_folder(name))
        .await
        .wrap_err_with(|| format!("Failed to create playlist folder '{name}'"))
}

async fn resolve_playlist<D: DestinationCatalog>(
    destination: &D,
    folder: &Folder,
    playlist_name: &str,
    description: Option<&str>,
) -> Result<(PlaylistHandle, Vec<Track>)> {
    log::info!("Fetching playlists from folder '{}'", folder.name);

    let items = fetch_paginated(DESTINATION_PAGE_SIZE, |offset, limit| {
        destination.folder_items(&folder.id, offset, limit)
    });
    pin_mut!(items);

    let mut playlist = None;
    while let Some(item) = items.next().await {
        if let FolderItem::Playlist(handle) = item
            && handle.name == playlist_name
        {
            playlist = Some(handle);
            break;
        }
    }

    match playlist {
        Some(playlist) => {
            log::info!("Fetching tracks from playlist '{}'", playlist.name);
            let tracks: Vec<Track> = fetch_paginated(DESTINATION_PAGE_SIZE, |offset, limit| {
                destination.playlist_tracks(&playlist.id, offset, limit)
            })
            .filter_map(future::ready)
            .collect()
            .await;
            Ok((playlist, tracks))
        }
        None => {
            log::info!("Playlist '{playlist_name}' not found, creating it");
            let fallback = format!("Playlist \"{playlist_name}\"");
            let description = description.unwrap_or(&fallback);
            let playlist = retry_on_transient(|| {
                destination.create_playlist(playlist_name, description, &folder.id)
            })
            .await
            .wrap_err_with(|| format!("Failed to create playlist '{playlist_name}'"))?;
            Ok((playlist, Vec::new()))
        }
    }
}

/// Search the destination catalog for a track equal to `track`. Returns the
/// destination-side instance, or `None` when no candidate matches or the
/// search itself gives up; both classify the track as not found.
async fn search_track<D: DestinationCatalog>(destination: &D, track: &Track) -> Option<Track> {
    log::info!("Searching destination for track {}", track.full_name());

    let mut query = track.name.clone();
    for artist in &track.artists {
        query.push(' ');
        query.push_str(artist);
    }
    log::debug!("Search query: {query}");

    let candidates = match retry_on_transient(|| destination.search_tracks(&query)).await {
        Ok(candidates) => candidates,
        Err(err) => {
            log::error!("Error searching for track {}: {err}", track.full_name());
            return None;
        }
    };

    let found = candidates
        .into_iter()
        .find(|candidate| candidate.is_same_recording(track));
    if let Some(found) = &found {
        log::info!("Found track: {found}");
    }
    found
}

// =============================================================================
// Tests
// =============================================================================
