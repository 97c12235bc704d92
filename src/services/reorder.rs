//! Reorder engine: re-sequence a destination playlist to mirror the order in
//! which its tracks were merged from the sources.

use color_eyre::eyre::{Result, WrapErr};
use futures::{StreamExt, future};

use crate::model::{Track, TrackId};
use crate::ports::destination::{DestinationCatalog, PlaylistHandle};
use crate::remote::fetch::{fetch_paginated, retry_on_transient};
use crate::services::DESTINATION_PAGE_SIZE;

/// Bring `playlist` into the order of `desired_order`, comparing by
/// destination-side track id. Returns whether anything changed.
///
/// Purely positional: never adds, removes or re-matches tracks. The desired
/// order is the accumulated, already-reconciled track list of one or more
/// merges into this playlist.
pub async fn reorganize_playlist<D: DestinationCatalog>(
    destination: &D,
    playlist: &PlaylistHandle,
    desired_order: &[Track],
) -> Result<bool> {
    log::info!("Checking track order of playlist '{}'", playlist.name);

    let current: Vec<Track> = fetch_paginated(DESTINATION_PAGE_SIZE, |offset, limit| {
        destination.playlist_tracks(&playlist.id, offset, limit)
    })
    .filter_map(future::ready)
    .collect()
    .await;

    let current_ids: Vec<&TrackId> = current.iter().map(|track| &track.id).collect();
    let desired_ids: Vec<&TrackId> = desired_order.iter().map(|track| &track.id).collect();

    if current_ids == desired_ids {
        log::info!("Playlist '{}' already in the desired order", playlist.name);
        return Ok(false);
    }

    log::info!(
        "Reordering {} tracks in playlist '{}'",
        desired_order.len(),
        playlist.name
    );

    let track_ids: Vec<TrackId> = desired_order.iter().map(|track| track.id.clone()).collect();
    retry_on_transient(|| destination.replace_items(&playlist.id, &track_ids))
        .await
        .wrap_err_with(|| format!("Failed to reorder playlist '{}'", playlist.name))?;

    Ok(true)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use crate::ports::destination::MockDestinationCatalog;
    use crate::remote::RemoteError;

    use super::*;

    fn track(id: i64, name: &str) -> Track {
        Track {
            id: TrackId::Numeric(id),
            isrc: format!("USRC1{id:04}"),
            name: name.to_string(),
            duration: Duration::from_secs(200),
            artists: HashSet::from(["Artist".to_string()]),
            album: None,
        }
    }

    fn playlist() -> PlaylistHandle {
        PlaylistHandle {
            id: "pl1".into(),
            name: "Mix".into(),
            description: None,
            public: true,
        }
    }

    #[tokio::test]
    async fn test_reorder_issues_replace_when_order_differs() {
        let mut mock = MockDestinationCatalog::new();

        mock.expect_playlist_tracks().returning(|_, _, _| {
            Ok(vec![
                Some(track(1, "A")),
                Some(track(2, "B")),
                Some(track(3, "C")),
            ])
        });

        mock.expect_replace_items()
            .withf(|playlist_id, track_ids| {
                playlist_id == "pl1"
                    && track_ids
                        == [
                            TrackId::Numeric(3),
                            TrackId::Numeric(1),
                            TrackId::Numeric(2),
                        ]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let desired = vec![track(3, "C"), track(1, "A"), track(2, "B")];
        let changed = reorganize_playlist(&mock, &playlist(), &desired)
            .await
            .unwrap();

        assert!(changed);
    }

    #[tokio::test]
    async fn test_reorder_is_a_noop_when_order_matches() {
        let mut mock = MockDestinationCatalog::new();

        // Same desired order as the remote reports back after a reorder.
        mock.expect_playlist_tracks().returning(|_, _, _| {
            Ok(vec![
                Some(track(3, "C")),
                Some(track(1, "A")),
                Some(track(2, "B")),
            ])
        });

        let desired = vec![track(3, "C"), track(1, "A"), track(2, "B")];
        let changed = reorganize_playlist(&mock, &playlist(), &desired)
            .await
            .unwrap();

        assert!(!changed);
    }

    #[tokio::test]
    async fn test_reorder_surfaces_remote_failure() {
        let mut mock = MockDestinationCatalog::new();

        mock.expect_playlist_tracks()
            .returning(|_, _, _| Ok(vec![Some(track(1, "A")), Some(track(2, "B"))]));

        mock.expect_replace_items().returning(|_, _| {
            Err(RemoteError::Rejected {
                status: 400,
                message: "bad request".into(),
            })
        });

        let desired = vec![track(2, "B"), track(1, "A")];
        let result = reorganize_playlist(&mock, &playlist(), &desired).await;

        assert!(result.is_err());
    }
}
