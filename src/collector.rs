//! Full, order-preserving fetch of a source's tracks.
//!
//! The remote API caps every read at 50 items for the saved-tracks library
//! and 100 for playlists; this module pages through the whole collection so
//! nothing else in the crate has to care about offsets.

use crate::client::{PlaylistApi, Source, Track};
use crate::error::Result;

/// Fetch every track of `source`, in collection order.
///
/// A failed page aborts the whole fetch; a truncated list is never returned.
pub fn fetch_all(api: &mut dyn PlaylistApi, source: &Source) -> Result<Vec<Track>> {
    let limit = source.page_limit();
    let mut tracks = Vec::new();
    let mut offset = 0;

    loop {
        let page = api.list_page(source, limit, offset)?;
        let count = page.len();
        tracks.extend(page);
        // A short page is the last one
        if count < limit {
            break;
        }
        offset += limit;
    }

    Ok(tracks)
}

/// Like [`fetch_all`], keeping only the track ids.
pub fn fetch_all_ids(api: &mut dyn PlaylistApi, source: &Source) -> Result<Vec<String>> {
    Ok(fetch_all(api, source)?
        .into_iter()
        .map(|t| t.id)
        .collect())
}
