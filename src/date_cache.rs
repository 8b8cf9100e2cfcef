//! Durable ISRC → earliest-release-date cache.
//!
//! Catalog lookups for a recording's earliest release are slow (one search
//! per track), so the answers are kept in a small CSV file with one
//! `isrc,date` row per recording, no header. The file is append-only and
//! the first row written for an ISRC wins; duplicate rows from a racing
//! second writer are tolerated and ignored on read.
//!
//! The whole file is loaded into a map once on open, so lookups after that
//! cost nothing.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::client::{PlaylistApi, Track};
use crate::error::Result;
use crate::identity;

#[derive(Debug)]
pub struct ReleaseDateCache {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl ReleaseDateCache {
    /// Open (creating if absent) the cache file and load it.
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let mut entries = HashMap::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Some((isrc, date)) = line.split_once(',') {
                // First row wins; later duplicates are ignored
                entries
                    .entry(isrc.to_string())
                    .or_insert_with(|| date.to_string());
            }
        }

        Ok(ReleaseDateCache {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest release date of a recording, as a partial ISO date string.
    ///
    /// Cache hit: the stored date, no catalog traffic. Miss: search every
    /// release sharing the track's ISRC, take the minimum date (the track's
    /// own date when the search comes back empty), persist and return it.
    /// Tracks without an ISRC fall back to their own date and are not cached.
    pub fn earliest_release_date(
        &mut self,
        api: &mut dyn PlaylistApi,
        track: &Track,
    ) -> Result<String> {
        let Some(isrc) = track.isrc.as_deref() else {
            return Ok(track.release_date.clone());
        };

        if let Some(date) = self.entries.get(isrc) {
            return Ok(date.clone());
        }

        let variants = identity::variants_for(api, isrc)?;
        let date = variants
            .iter()
            .map(|t| t.release_date.as_str())
            .filter(|d| !d.is_empty())
            .min()
            .unwrap_or(track.release_date.as_str())
            .to_string();

        log::debug!("release date for {}: {}", isrc, date);
        self.append(isrc, &date)?;
        Ok(date)
    }

    fn append(&mut self, isrc: &str, date: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{},{}", isrc, date)?;
        self.entries
            .entry(isrc.to_string())
            .or_insert_with(|| date.to_string());
        Ok(())
    }
}
