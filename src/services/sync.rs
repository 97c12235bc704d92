//! One full reconciliation cycle: list matched source playlists, merge each
//! into the destination, then bring the destination track order in line.

use color_eyre::eyre::Result;

use crate::model::{Playlist, Track};
use crate::ports::destination::DestinationCatalog;
use crate::ports::source::SourceCatalog;
use crate::services::merge::merge_playlist;
use crate::services::reorder::reorganize_playlist;
use crate::services::source::SourceLibrary;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Only source playlists whose name starts with this prefix are mirrored.
    pub playlist_prefix: Option<String>,
    /// Destination folder the mirrored playlists are filed under.
    pub parent_folder: Option<String>,
    /// Merge every matched source playlist into this single destination
    /// playlist instead of mirroring them one-to-one.
    pub combine_into: Option<String>,
}

/// Outcome summary for one destination playlist.
#[derive(Debug, Clone)]
pub struct PlaylistSyncSummary {
    pub name: String,
    pub added: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub add_error: usize,
    pub reordered: bool,
}

/// Run one reconciliation cycle. A failed merge is logged and skips that
/// playlist (including its reorder); the cycle continues with the rest.
pub async fn run_sync<S: SourceCatalog, D: DestinationCatalog>(
    source: &SourceLibrary<S>,
    destination: &D,
    options: &SyncOptions,
) -> Result<Vec<PlaylistSyncSummary>> {
    let prefix = options.playlist_prefix.clone().unwrap_or_default();
    let playlists = source
        .playlists(|name| name.starts_with(prefix.as_str()))
        .await?;

    if playlists.is_empty() {
        log::info!("No source playlists matched");
        return Ok(Vec::new());
    }

    match &options.combine_into {
        Some(name) => combine_playlists(destination, &playlists, name, options).await,
        None => mirror_playlists(destination, &playlists, options).await,
    }
}

/// Mirror every source playlist into a destination playlist of the same name.
async fn mirror_playlists<D: DestinationCatalog>(
    destination: &D,
    playlists: &[Playlist],
    options: &SyncOptions,
) -> Result<Vec<PlaylistSyncSummary>> {
    let mut summaries = Vec::new();

    for playlist in playlists {
        let description = playlist
            .uri
            .as_ref()
            .map(|uri| format!("Playlist synced from Spotify {uri}"));

        let outcome = match merge_playlist(
            destination,
            &playlist.tracks,
            &playlist.name,
            description.as_deref(),
            options.parent_folder.as_deref(),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("Failed to merge playlist '{}': {err:#}", playlist.name);
                continue;
            }
        };

        let reordered = match reorganize_playlist(
            destination,
            &outcome.playlist,
            outcome.result.confirmed_tracks(),
        )
        .await
        {
            Ok(changed) => changed,
            Err(err) => {
                log::error!("Failed to reorder playlist '{}': {err:#}", playlist.name);
                false
            }
        };

        let summary = PlaylistSyncSummary {
            name: playlist.name.clone(),
            added: outcome.result.added.len(),
            skipped: outcome.result.skipped.len(),
            not_found: outcome.result.not_found.len(),
            add_error: outcome.result.add_error.len(),
            reordered,
        };
        log::info!(
            "Playlist '{}': added {}, skipped {}, not found {}, errors {}",
            summary.name,
            summary.added,
            summary.skipped,
            summary.not_found,
            summary.add_error
        );
        summaries.push(summary);
    }

    Ok(summaries)
}

/// Merge every source playlist into one destination playlist, accumulating
/// the confirmed track order across merges, then reorder once at the end.
async fn combine_playlists<D: DestinationCatalog>(
    destination: &D,
    playlists: &[Playlist],
    name: &str,
    options: &SyncOptions,
) -> Result<Vec<PlaylistSyncSummary>> {
    let mut ordered_tracks: Vec<Track> = Vec::new();
    let mut target = None;
    let mut summary = PlaylistSyncSummary {
        name: name.to_string(),
        added: 0,
        skipped: 0,
        not_found: 0,
        add_error: 0,
        reordered: false,
    };

    for playlist in playlists {
        let outcome = match merge_playlist(
            destination,
            &playlist.tracks,
            name,
            None,
            options.parent_folder.as_deref(),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!(
                    "Failed to merge source playlist '{}' into '{name}': {err:#}",
                    playlist.name
                );
                continue;
            }
        };

        summary.added += outcome.result.added.len();
        summary.skipped += outcome.result.skipped.len();
        summary.not_found += outcome.result.not_found.len();
        summary.add_error += outcome.result.add_error.len();

        // Later merges re-confirm tracks earlier ones already placed; the
        // first position wins.
        for track in outcome.result.confirmed_tracks() {
            if !ordered_tracks.iter().any(|seen| seen.id == track.id) {
                ordered_tracks.push(track.clone());
            }
        }

        target = Some(outcome.playlist);
    }

    let Some(playlist) = target else {
        log::error!("Every merge into '{name}' failed, skipping reorder");
        return Ok(Vec::new());
    };

    summary.reordered = match reorganize_playlist(destination, &playlist, &ordered_tracks).await {
        Ok(changed) => changed,
        Err(err) => {
            log::error!("Failed to reorder playlist '{name}': {err:#}");
            false
        }
    };

    log::info!(
        "Playlist '{}': added {}, skipped {}, not found {}, errors {}",
        summary.name,
        summary.added,
        summary.skipped,
        summary.not_found,
        summary.add_error
    );

    Ok(vec![summary])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use crate::model::TrackId;
    use crate::ports::destination::{Folder, FolderItem, MockDestinationCatalog, PlaylistHandle};
    use crate::ports::source::{MockSourceCatalog, SourcePlaylist};
    use crate::remote::RemoteError;

    use super::*;

    fn source_playlist(id: &str, name: &str) -> SourcePlaylist {
        SourcePlaylist {
            id: id.into(),
            name: name.into(),
            url: None,
            image_url: None,
        }
    }

    fn track(id: i64, isrc: &str, name: &str) -> Track {
        // Distinct recordings get distinct durations so that only a shared
        // ISRC unifies them.
        let digit = isrc
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(0) as u64;
        Track {
            id: TrackId::Numeric(id),
            isrc: isrc.to_string(),
            name: name.to_string(),
            duration: Duration::from_secs(100 + digit * 50),
            artists: HashSet::from(["Artist".to_string()]),
            album: None,
        }
    }

    fn library(playlists: Vec<SourcePlaylist>, tracks: Vec<Track>) -> SourceLibrary<MockSourceCatalog> {
        let mut mock = MockSourceCatalog::new();
        mock.expect_current_playlists()
            .returning(move || Ok(playlists.clone()));
        mock.expect_playlist_tracks()
            .returning(move |_, _, _| Ok(tracks.iter().cloned().map(Some).collect()));
        SourceLibrary::new(mock)
    }

    #[tokio::test]
    async fn test_cycle_merges_and_reorders_each_matched_playlist() {
        let source = library(
            vec![source_playlist("p1", "Mix")],
            vec![track(0, "USRC10001", "First")],
        );

        let mut destination = MockDestinationCatalog::new();
        destination.expect_root_folder().returning(|| {
            Ok(Folder {
                id: "root".into(),
                name: "Root".into(),
            })
        });
        destination
            .expect_folder_items()
            .returning(|_, _, _| Ok(Vec::new()));
        destination.expect_create_playlist().returning(|name, _, _| {
            Ok(PlaylistHandle {
                id: "pl1".into(),
                name: name.into(),
                description: None,
                public: true,
            })
        });
        destination
            .expect_search_tracks()
            .returning(|_| Ok(vec![track(11, "USRC10001", "First")]));
        destination
            .expect_add_track_by_isrc()
            .returning(|_, _| Ok(true));
        // The freshly added track is reported back in merge order already.
        destination
            .expect_playlist_tracks()
            .returning(|_, _, _| Ok(vec![Some(track(11, "USRC10001", "First"))]));

        let summaries = run_sync(&source, &destination, &SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].added, 1);
        assert!(!summaries[0].reordered);
    }

    #[tokio::test]
    async fn test_failed_merge_skips_reorder_and_continues_cycle() {
        let source = library(
            vec![source_playlist("p1", "Mix")],
            vec![track(0, "USRC10001", "First")],
        );

        let mut destination = MockDestinationCatalog::new();
        // Folder resolution is fatal; no reorder call may follow.
        destination.expect_root_folder().returning(|| {
            Err(RemoteError::Rejected {
                status: 403,
                message: "forbidden".into(),
            })
        });

        let summaries = run_sync(&source, &destination, &SyncOptions::default())
            .await
            .unwrap();

        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn test_prefix_filter_limits_the_cycle() {
        let source = library(
            vec![
                source_playlist("p1", "EUROVISION 2025"),
                source_playlist("p2", "Workout"),
            ],
            Vec::new(),
        );

        let mut destination = MockDestinationCatalog::new();
        destination.expect_root_folder().returning(|| {
            Ok(Folder {
                id: "root".into(),
                name: "Root".into(),
            })
        });
        destination
            .expect_folder_items()
            .returning(|_, _, _| Ok(Vec::new()));
        destination
            .expect_create_playlist()
            .withf(|name, _, _| name == "EUROVISION 2025")
            .times(1)
            .returning(|name, _, _| {
                Ok(PlaylistHandle {
                    id: "pl1".into(),
                    name: name.into(),
                    description: None,
                    public: true,
                })
            });
        destination
            .expect_playlist_tracks()
            .returning(|_, _, _| Ok(Vec::new()));

        let options = SyncOptions {
            playlist_prefix: Some("EUROVISION".into()),
            ..SyncOptions::default()
        };
        let summaries = run_sync(&source, &destination, &options).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "EUROVISION 2025");
    }

    #[tokio::test]
    async fn test_combine_accumulates_order_across_merges() {
        let mut mock = MockSourceCatalog::new();
        mock.expect_current_playlists().returning(|| {
            Ok(vec![
                source_playlist("p1", "Part One"),
                source_playlist("p2", "Part Two"),
            ])
        });
        mock.expect_playlist_tracks().returning(|playlist_id, _, _| {
            if playlist_id == "p1" {
                Ok(vec![Some(track(0, "USRC10001", "First"))])
            } else {
                Ok(vec![Some(track(0, "USRC10002", "Second"))])
            }
        });
        let source = SourceLibrary::new(mock);

        let mut destination = MockDestinationCatalog::new();
        destination.expect_root_folder().returning(|| {
            Ok(Folder {
                id: "root".into(),
                name: "Root".into(),
            })
        });

        let combined = PlaylistHandle {
            id: "pl1".into(),
            name: "Everything".into(),
            description: None,
            public: true,
        };

        // First merge creates the playlist; the second finds it.
        let created = std::sync::atomic::AtomicBool::new(false);
        let listed = combined.clone();
        destination.expect_folder_items().returning(move |_, _, _| {
            if created.swap(true, std::sync::atomic::Ordering::SeqCst) {
                Ok(vec![FolderItem::Playlist(listed.clone())])
            } else {
                Ok(Vec::new())
            }
        });
        destination
            .expect_create_playlist()
            .times(1)
            .returning(|name, _, _| {
                Ok(PlaylistHandle {
                    id: "pl1".into(),
                    name: name.into(),
                    description: None,
                    public: true,
                })
            });

        destination.expect_search_tracks().returning(|query| {
            if query.starts_with("First") {
                Ok(vec![track(11, "USRC10001", "First")])
            } else {
                Ok(vec![track(12, "USRC10002", "Second")])
            }
        });
        destination
            .expect_add_track_by_isrc()
            .returning(|_, _| Ok(true));

        // Remote order after both merges is reversed, forcing a reorder.
        let replaced = std::sync::atomic::AtomicUsize::new(0);
        destination
            .expect_playlist_tracks()
            .returning(move |_, _, _| {
                match replaced.fetch_add(1, std::sync::atomic::Ordering::SeqCst) {
                    // Second merge's dedup snapshot: "First" is already there.
                    0 => Ok(vec![Some(track(11, "USRC10001", "First"))]),
                    _ => Ok(vec![
                        Some(track(12, "USRC10002", "Second")),
                        Some(track(11, "USRC10001", "First")),
                    ]),
                }
            });

        destination
            .expect_replace_items()
            .withf(|_, track_ids| {
                track_ids == [TrackId::Numeric(11), TrackId::Numeric(12)]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let options = SyncOptions {
            combine_into: Some("Everything".into()),
            ..SyncOptions::default()
        };
        let summaries = run_sync(&source, &destination, &options).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].added, 2);
        assert!(summaries[0].reordered);
    }
}
