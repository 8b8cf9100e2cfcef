//! Converging a playlist to a computed track set.
//!
//! The remote API takes at most 100 ids per mutation call, so everything
//! here chunks its work. A failed call aborts the loop it is in; batches
//! already applied stay applied and nothing is retried here.

use chrono::NaiveDate;

use crate::client::{PlaylistApi, Source, Track};
use crate::collector;
use crate::dates;
use crate::error::Result;

/// Per-call ceiling on mutation batch length.
pub const BATCH_LIMIT: usize = 100;

/// Append tracks in batches of at most [`BATCH_LIMIT`]. An empty `ids` is a
/// no-op and issues no call at all.
pub fn add_in_batches(api: &mut dyn PlaylistApi, playlist: &str, ids: &[String]) -> Result<()> {
    for chunk in ids.chunks(BATCH_LIMIT) {
        api.add_items(playlist, chunk, None)?;
    }
    Ok(())
}

/// Remove tracks in batches of at most [`BATCH_LIMIT`]. Empty input issues
/// no call.
pub fn remove_in_batches(api: &mut dyn PlaylistApi, playlist: &str, ids: &[String]) -> Result<()> {
    for chunk in ids.chunks(BATCH_LIMIT) {
        api.remove_items(playlist, chunk)?;
    }
    Ok(())
}

/// Make the playlist's membership equal to `desired` with the fewest calls:
/// remove what is stale, add what is missing (in `desired` order). Running
/// this against an already-converged playlist issues no mutation at all.
pub fn converge(api: &mut dyn PlaylistApi, playlist: &str, desired: &[String]) -> Result<()> {
    let current = collector::fetch_all_ids(api, &Source::Playlist(playlist.to_string()))?;

    let desired_set: std::collections::HashSet<&str> =
        desired.iter().map(String::as_str).collect();
    let current_set: std::collections::HashSet<&str> =
        current.iter().map(String::as_str).collect();

    let stale: Vec<String> = current
        .iter()
        .filter(|id| !desired_set.contains(id.as_str()))
        .cloned()
        .collect();
    let missing: Vec<String> = desired
        .iter()
        .filter(|id| !current_set.contains(id.as_str()))
        .cloned()
        .collect();

    log::info!(
        "converging {}: {} stale, {} missing",
        playlist,
        stale.len(),
        missing.len()
    );
    remove_in_batches(api, playlist, &stale)?;
    add_in_batches(api, playlist, &missing)
}

/// Replace the playlist wholesale: drop everything currently in it, then
/// add `desired` in order. Used when the delivered order itself matters
/// (a freshly shuffled mix).
pub fn replace_all(api: &mut dyn PlaylistApi, playlist: &str, desired: &[String]) -> Result<()> {
    let current = collector::fetch_all_ids(api, &Source::Playlist(playlist.to_string()))?;
    remove_in_batches(api, playlist, &current)?;
    add_in_batches(api, playlist, desired)
}

/// Maintain an age-windowed playlist ordered newest-first.
///
/// Candidates not yet present and younger than `max_months` whole months
/// are inserted right before the first existing entry with an older release
/// date (appended when there is none). The listing is refetched before
/// every insertion because each one shifts positions. Existing entries that
/// have aged past the window are removed afterwards.
pub fn converge_ordered(
    api: &mut dyn PlaylistApi,
    playlist: &str,
    candidates: &[Track],
    max_months: i32,
    today: NaiveDate,
) -> Result<()> {
    let source = Source::Playlist(playlist.to_string());
    let snapshot = collector::fetch_all(api, &source)?;
    let present: std::collections::HashSet<&str> =
        snapshot.iter().map(|t| t.id.as_str()).collect();

    for track in candidates {
        if present.contains(track.id.as_str()) {
            continue;
        }
        let Some(released) = dates::normalize_release_date(&track.release_date) else {
            log::warn!("track {} has unusable release date, skipped", track.id);
            continue;
        };
        if dates::whole_months(today, released) >= max_months {
            continue;
        }

        // Positions shift with every insert, so look at the live listing
        let listing = collector::fetch_all(api, &source)?;
        let position = listing
            .iter()
            .position(|existing| track.release_date > existing.release_date);
        api.add_items(playlist, std::slice::from_ref(&track.id), position)?;
    }

    for track in &snapshot {
        let Some(released) = dates::normalize_release_date(&track.release_date) else {
            continue;
        };
        if dates::whole_months(today, released) >= max_months {
            api.remove_items(playlist, std::slice::from_ref(&track.id))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{track, Call, FakeApi};

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn adds_are_chunked_in_order() {
        let mut api = FakeApi::default().with_playlist("p", Vec::new());
        let desired = ids("t", 250);
        add_in_batches(&mut api, "p", &desired).unwrap();

        let sizes: Vec<usize> = api
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Add { ids, .. } => Some(ids.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        // No id lost or duplicated, original order preserved
        assert_eq!(api.playlist_ids("p"), desired.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn empty_batch_issues_no_call() {
        let mut api = FakeApi::default().with_playlist("p", Vec::new());
        add_in_batches(&mut api, "p", &[]).unwrap();
        remove_in_batches(&mut api, "p", &[]).unwrap();
        assert_eq!(api.mutation_count(), 0);
    }

    #[test]
    fn converge_removes_stale_and_adds_missing() {
        let mut api = FakeApi::default().with_playlist(
            "p",
            vec![track("keep", None, ""), track("stale", None, "")],
        );
        converge(&mut api, "p", &["keep".to_string(), "fresh".to_string()]).unwrap();

        assert_eq!(api.playlist_ids("p"), vec!["keep", "fresh"]);
        assert_eq!(api.mutation_count(), 2);
    }

    #[test]
    fn converge_is_idempotent() {
        let mut api = FakeApi::default().with_playlist("p", Vec::new());
        let desired = ids("t", 150);

        converge(&mut api, "p", &desired).unwrap();
        assert_eq!(api.mutation_count(), 2);

        api.calls.clear();
        converge(&mut api, "p", &desired).unwrap();
        assert_eq!(api.mutation_count(), 0);
    }

    #[test]
    fn replace_all_clears_then_adds_in_order() {
        let mut api = FakeApi::default()
            .with_playlist("p", vec![track("old1", None, ""), track("old2", None, "")]);
        let desired = vec!["n2".to_string(), "n1".to_string(), "n3".to_string()];
        replace_all(&mut api, "p", &desired).unwrap();

        assert_eq!(api.playlist_ids("p"), vec!["n2", "n1", "n3"]);
        assert!(matches!(&api.calls[1], Call::Remove { ids, .. } if ids.len() == 2));
    }

    // ── ordered maintenance ──────────────────────────────────────────────

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn young_candidates_insert_by_descending_release_date() {
        let mut api = FakeApi::default().with_playlist(
            "p",
            vec![
                track("newest", None, "2026-07-01"),
                track("middle", None, "2026-04-01"),
                track("oldest", None, "2026-02-01"),
            ],
        );
        let candidates = vec![track("incoming", None, "2026-05-20")];
        converge_ordered(&mut api, "p", &candidates, 6, today()).unwrap();

        assert_eq!(
            api.playlist_ids("p"),
            vec!["newest", "incoming", "middle", "oldest"]
        );
    }

    #[test]
    fn candidate_older_than_everything_is_appended() {
        let mut api = FakeApi::default().with_playlist(
            "p",
            vec![track("a", None, "2026-07-01"), track("b", None, "2026-06-01")],
        );
        let candidates = vec![track("tail", None, "2026-03-01")];
        converge_ordered(&mut api, "p", &candidates, 12, today()).unwrap();
        assert_eq!(api.playlist_ids("p"), vec!["a", "b", "tail"]);
    }

    #[test]
    fn aged_out_candidates_are_not_added() {
        let mut api = FakeApi::default().with_playlist("p", Vec::new());
        let candidates = vec![track("tooold", None, "2024-01-01")];
        converge_ordered(&mut api, "p", &candidates, 6, today()).unwrap();
        assert_eq!(api.mutation_count(), 0);
    }

    #[test]
    fn entries_past_the_window_are_removed() {
        let mut api = FakeApi::default().with_playlist(
            "p",
            vec![
                track("young", None, "2026-06-01"),
                track("expired", None, "2025-09-01"),
            ],
        );
        converge_ordered(&mut api, "p", &[], 6, today()).unwrap();
        assert_eq!(api.playlist_ids("p"), vec!["young"]);
    }

    #[test]
    fn present_candidates_are_left_alone() {
        let mut api = FakeApi::default()
            .with_playlist("p", vec![track("already", None, "2026-06-01")]);
        let candidates = vec![track("already", None, "2026-06-01")];
        converge_ordered(&mut api, "p", &candidates, 6, today()).unwrap();
        assert_eq!(api.mutation_count(), 0);
    }

    #[test]
    fn insertion_positions_follow_earlier_inserts() {
        // Two candidates: the second must account for the first's insertion
        let mut api = FakeApi::default().with_playlist(
            "p",
            vec![track("a", None, "2026-07-01"), track("d", None, "2026-01-15")],
        );
        let candidates = vec![
            track("b", None, "2026-06-01"),
            track("c", None, "2026-03-01"),
        ];
        api.register(&candidates);
        converge_ordered(&mut api, "p", &candidates, 12, today()).unwrap();
        assert_eq!(api.playlist_ids("p"), vec!["a", "b", "c", "d"]);
    }
}
