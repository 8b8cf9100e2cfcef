//! Delivery history, keyed by recording.
//!
//! A target playlist that keeps receiving "new music" must not receive the
//! same recording twice, even when it reappears as a different release. The
//! history is the set of ISRCs already delivered, materialized as a
//! designated history playlist and re-derived from it on every run.

use std::collections::HashSet;

use crate::client::{PlaylistApi, Source, Track};
use crate::collector;
use crate::error::Result;
use crate::identity;

/// The ISRCs of every track currently in the history playlist.
pub fn load_history(api: &mut dyn PlaylistApi, history_playlist: &str) -> Result<HashSet<String>> {
    let tracks = collector::fetch_all(api, &Source::Playlist(history_playlist.to_string()))?;
    Ok(tracks.into_iter().filter_map(|t| t.isrc).collect())
}

/// Filter `candidates` down to recordings not yet in `history`, resolving
/// each admitted track to its canonical (oldest) release and recording its
/// ISRC. Scan order is preserved; nothing is shuffled on this path.
///
/// Candidates without an ISRC are skipped: the history cannot track them.
pub fn admit(
    api: &mut dyn PlaylistApi,
    candidates: &[Track],
    history: &mut HashSet<String>,
) -> Result<Vec<String>> {
    let mut admitted = Vec::new();

    for track in candidates {
        let Some(isrc) = track.isrc.as_deref() else {
            log::warn!("skipping {} ({}): no ISRC", track.id, track.name);
            continue;
        };
        if history.contains(isrc) {
            continue;
        }
        admitted.push(identity::canonical_release(api, track)?);
        history.insert(isrc.to_string());
    }

    Ok(admitted)
}
