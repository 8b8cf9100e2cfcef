//! Canonical track identity across duplicate releases.
//!
//! The same recording usually exists several times in the catalog (album,
//! single, compilation, remaster), all sharing one ISRC. Whenever one
//! variant has to stand for the recording, the earliest-released one does.

use crate::client::{PlaylistApi, Track};
use crate::error::Result;

/// Search page size for the catalog-wide ISRC lookup.
const SEARCH_PAGE: usize = 50;

/// All releases sharing an ISRC, in catalog search order.
pub fn variants_for(api: &mut dyn PlaylistApi, isrc: &str) -> Result<Vec<Track>> {
    let mut variants = Vec::new();
    let mut offset = 0;
    loop {
        let page = api.search_isrc(isrc, SEARCH_PAGE, offset)?;
        let count = page.len();
        variants.extend(page);
        if count < SEARCH_PAGE {
            break;
        }
        offset += SEARCH_PAGE;
    }
    Ok(variants)
}

/// Pick the earliest-released variant's id, falling back to `track_id` when
/// no variants are known (e.g. the search has not indexed the code yet).
///
/// Raw partial ISO dates compare correctly: `"1998"` sorts before
/// `"1998-06-01"`, so a year-only release wins over anything later in it.
pub fn oldest_variant_id(track_id: &str, variants: &[Track]) -> String {
    variants
        .iter()
        .min_by(|a, b| a.release_date.cmp(&b.release_date))
        .map(|t| t.id.clone())
        .unwrap_or_else(|| track_id.to_string())
}

/// Resolve a track to the id of its canonical (oldest) release.
/// Tracks without an ISRC resolve to themselves.
pub fn canonical_release(api: &mut dyn PlaylistApi, track: &Track) -> Result<String> {
    let Some(isrc) = track.isrc.as_deref() else {
        return Ok(track.id.clone());
    };
    let variants = variants_for(api, isrc)?;
    Ok(oldest_variant_id(&track.id, &variants))
}
