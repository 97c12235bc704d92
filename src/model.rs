//! Catalog-neutral track, album and playlist value objects, plus the fuzzy
//! identity predicate used for deduplication and cross-catalog matching.
//!
//! Records for the same recording fetched from different catalogs carry
//! different opaque ids but usually share an ISRC; everything else (duration,
//! artist spelling, album edition suffixes) varies in quality.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use unaccent::unaccent;

/// Opaque catalog-specific track identifier. Some catalogs hand out integers,
/// others strings; identity comparisons only ever happen within one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Numeric(id) => write!(f, "{id}"),
            TrackId::Text(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Album {
    pub name: String,
    pub total_tracks: u32,
    pub artists: HashSet<String>,
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let artists: Vec<&str> = self.artists.iter().map(String::as_str).collect();
        write!(
            f,
            "{} by {} ({} track(s))",
            self.name,
            artists.join(", "),
            self.total_tracks
        )
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    /// International Standard Recording Code, uppercased at parse time.
    pub isrc: String,
    pub name: String,
    pub duration: Duration,
    pub artists: HashSet<String>,
    pub album: Option<Album>,
}

/// Maximum duration difference for two records to still denote one recording.
const DURATION_TOLERANCE: Duration = Duration::from_secs(2);

/// Normalize an artist name into a set of comparable fragments: strip
/// diacritics, lowercase, split on `&` and `,`. The full normalized name is
/// kept alongside the fragments so "A & B" still intersects "A&B".
fn normalize_artist_name(name: &str) -> HashSet<String> {
    let normalized = unaccent(name.trim()).to_lowercase();

    let mut fragments: HashSet<String> = normalized
        .split(['&', ','])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_owned)
        .collect();

    if !normalized.is_empty() {
        fragments.insert(normalized);
    }

    fragments
}

fn normalized_artist_fragments(artists: &HashSet<String>) -> HashSet<String> {
    let mut fragments = HashSet::new();
    for artist in artists {
        fragments.extend(normalize_artist_name(artist));
    }
    fragments
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.duration.as_secs();
        write!(
            f,
            "{} [{}, {}:{:02}]",
            self.full_name(),
            self.isrc,
            secs / 60,
            secs % 60
        )?;
        if let Some(album) = &self.album {
            write!(f, " from {album}")?;
        }
        Ok(())
    }
}

impl Track {
    /// "Name - Artist1, Artist2" label used in logs and reports.
    pub fn full_name(&self) -> String {
        let artists: Vec<&str> = self.artists.iter().map(String::as_str).collect();
        format!("{} - {}", self.name, artists.join(", "))
    }

    /// Decide whether two track records denote the same recording.
    ///
    /// Checks short-circuit in a fixed precedence order:
    /// 1. Matching ISRC is ground truth, nothing else is consulted.
    /// 2. Durations further than 2 s apart are different recordings.
    /// 3. Normalized artist fragment sets must intersect.
    /// 4. A missing album on either side is not disqualifying.
    /// 5. One album name must be a case-insensitive prefix of the other, which
    ///    tolerates edition suffixes like "(Deluxe)" on one side.
    pub fn is_same_recording(&self, other: &Track) -> bool {
        if self.isrc.eq_ignore_ascii_case(&other.isrc) {
            return true;
        }

        if self.duration.abs_diff(other.duration) > DURATION_TOLERANCE {
            return false;
        }

        let ours = normalized_artist_fragments(&self.artists);
        let theirs = normalized_artist_fragments(&other.artists);
        if ours.is_disjoint(&theirs) {
            return false;
        }

        match (&self.album, &other.album) {
            (Some(ours), Some(theirs)) => {
                let our_name = ours.name.to_lowercase();
                let their_name = theirs.name.to_lowercase();
                our_name.starts_with(&their_name) || their_name.starts_with(&our_name)
            }
            _ => true,
        }
    }
}

/// Drop every track that denotes the same recording as an earlier one,
/// keeping the first occurrence in fetch order.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut unique: Vec<Track> = Vec::with_capacity(tracks.len());

    for track in tracks {
        if let Some(kept) = unique.iter().find(|kept| kept.is_same_recording(&track)) {
            log::debug!(
                "Duplicate of {} in fetched list, keeping first occurrence",
                kept.full_name()
            );
        } else {
            unique.push(track);
        }
    }

    unique
}

/// Snapshot of a playlist's contents. Track order is meaningful and preserved
/// end-to-end; remote mutations go through the merge engine, not this value.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
    /// Origin link, used to produce the synced-from description.
    pub uri: Option<String>,
    /// Cover art, when the source exposes one.
    pub image: Option<Vec<u8>>,
}

/// Per-track outcomes of one merge. Every source track lands in exactly one of
/// the four buckets, exactly once.
#[derive(Debug, Clone, Default)]
pub struct AddedTracksResult {
    pub added: Vec<Track>,
    pub skipped: Vec<Track>,
    pub not_found: Vec<Track>,
    pub add_error: Vec<Track>,
    confirmed: Vec<Track>,
}

impl AddedTracksResult {
    pub fn record_added(&mut self, track: Track) {
        self.confirmed.push(track.clone());
        self.added.push(track);
    }

    pub fn record_skipped(&mut self, track: Track) {
        self.confirmed.push(track.clone());
        self.skipped.push(track);
    }

    pub fn record_not_found(&mut self, track: Track) {
        self.not_found.push(track);
    }

    pub fn record_add_error(&mut self, track: Track) {
        self.add_error.push(track);
    }

    /// Tracks confirmed present in the destination after the merge (added and
    /// skipped, in source order). Input to the reorder step.
    pub fn confirmed_tracks(&self) -> &[Track] {
        &self.confirmed
    }
}

// =============================================================================
// Tests
// =============================================================================
