//! Source library service: turns the raw source catalog into deduplicated
//! [`Playlist`] snapshots ready to merge.

use color_eyre::eyre::{Result, WrapErr};
use futures::{StreamExt, future};

use crate::model::{Playlist, Track, dedup_tracks};
use crate::ports::source::SourceCatalog;
use crate::remote::fetch::{fetch_paginated, retry_on_transient};

/// Source catalog listing endpoints page at 100 items.
const SOURCE_PAGE_SIZE: usize = 100;

pub struct SourceLibrary<S: SourceCatalog> {
    catalog: S,
}

impl<S: SourceCatalog> SourceLibrary<S> {
    pub fn new(catalog: S) -> Self {
        Self { catalog }
    }

    /// Fetch every source playlist whose name passes `filter`, tracks in
    /// playlist order with duplicates removed (first occurrence wins).
    /// A failed cover-image fetch is tolerated; a failed playlist listing
    /// is not.
    pub async fn playlists(&self, filter: impl Fn(&str) -> bool) -> Result<Vec<Playlist>> {
        log::info!("Fetching source playlists");

        let handles = retry_on_transient(|| self.catalog.current_playlists())
            .await
            .wrap_err("Failed to fetch source playlists")?;

        let mut playlists = Vec::new();

        for handle in handles {
            if !filter(&handle.name) {
                continue;
            }

            log::info!("Fetching tracks from source playlist '{}'", handle.name);
            let fetched: Vec<Track> = fetch_paginated(SOURCE_PAGE_SIZE, |offset, limit| {
                self.catalog.playlist_tracks(&handle.id, offset, limit)
            })
            .filter_map(future::ready)
            .collect()
            .await;
            log::debug!("Fetched {} tracks total", fetched.len());

            let tracks = dedup_tracks(fetched);
            if tracks.is_empty() {
                log::info!("No tracks found in source playlist '{}'", handle.name);
            } else {
                log::info!(
                    "{} unique tracks in source playlist '{}'",
                    tracks.len(),
                    handle.name
                );
            }

            let image = match &handle.image_url {
                Some(url) => match self.catalog.cover_image(url).await {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        log::warn!("Failed to fetch cover image from {url}: {err}");
                        None
                    }
                },
                None => None,
            };

            playlists.push(Playlist {
                name: handle.name,
                tracks,
                uri: handle.url,
                image,
            });
        }

        Ok(playlists)
    }
}

// =============================================================================
// Tests
// =============================================================================
