//! Job descriptions for the binaries.
//!
//! Each bin is driven by a small JSON file (kept compatible with the
//! operator's existing job files), deserialized here and validated where a
//! policy has invariants.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::select::AgeBucket;

/// A mix of random tracks from several playlists.
///
/// * `new_playlist_name` — name for a newly created playlist; ignored when
///   `update_playlist` is set
/// * `date_in_name` — append ` — DD/MM/YY` to the new playlist's name
/// * `update_playlist` — replace this playlist's contents instead of
///   creating a new one
/// * `user` — owner of a newly created playlist
/// * `playlists` — sources and how many tracks to take from each
///   (`"saved"` is the saved-tracks library; a negative count takes all)
/// * `filler_playlist_id` — optional source used to top up after dedup
#[derive(Debug, Deserialize)]
pub struct MixJob {
    #[serde(default)]
    pub new_playlist_name: Option<String>,
    #[serde(default)]
    pub date_in_name: bool,
    pub update_playlist: Option<String>,
    #[serde(default)]
    pub user: String,
    pub playlists: Vec<MixEntry>,
    pub filler_playlist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MixEntry {
    pub playlist_id: String,
    pub count: i64,
}

/// An age-bucketed mix from a single source.
///
/// `selection` entries must be ordered by ascending `age` with a final
/// `null` catch-all.
#[derive(Debug, Deserialize)]
pub struct YearMixJob {
    #[serde(default)]
    pub new_playlist_name: Option<String>,
    #[serde(default)]
    pub date_in_name: bool,
    pub update_playlist: Option<String>,
    #[serde(default)]
    pub user: String,
    pub playlist_id: String,
    pub selection: Vec<SelectionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SelectionEntry {
    pub age: Option<u32>,
    pub count: usize,
}

impl YearMixJob {
    pub fn buckets(&self) -> Vec<AgeBucket> {
        self.selection
            .iter()
            .map(|entry| AgeBucket {
                max_age_years: entry.age,
                count: entry.count,
            })
            .collect()
    }
}

/// History-guarded delivery of new tracks into a target playlist.
#[derive(Debug, Deserialize)]
pub struct FreshJob {
    pub target_playlist_id: String,
    pub history_playlist_id: String,
    pub source_playlist_ids: Vec<String>,
}

/// Age-windowed ordered maintenance of a target playlist.
#[derive(Debug, Deserialize)]
pub struct LatestJob {
    pub playlist_id: String,
    pub update_playlist: String,
    pub max_months: i32,
}

/// Load and parse a JSON job file.
pub fn load_job<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
}

/// `name — DD/MM/YY`, the suffix used when `date_in_name` is set.
pub fn dated_name(name: &str, today: chrono::NaiveDate) -> String {
    format!("{} — {}", name, today.format("%d/%m/%y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_mix_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{
                "new_playlist_name": "Weekly Mix",
                "date_in_name": true,
                "update_playlist": null,
                "user": "listener",
                "playlists": [
                    { "playlist_id": "saved", "count": 10 },
                    { "playlist_id": "37i9dQ", "count": -1 }
                ],
                "filler_playlist_id": "fill123"
            }"#,
        )
        .unwrap();

        let job: MixJob = load_job(&path).unwrap();
        assert_eq!(job.new_playlist_name.as_deref(), Some("Weekly Mix"));
        assert!(job.date_in_name);
        assert_eq!(job.playlists.len(), 2);
        assert_eq!(job.playlists[1].count, -1);
        assert_eq!(job.filler_playlist_id.as_deref(), Some("fill123"));
    }

    #[test]
    fn parses_a_year_mix_job_into_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{
                "new_playlist_name": null,
                "update_playlist": "target1",
                "user": "listener",
                "playlist_id": "saved",
                "selection": [
                    { "age": 1, "count": 20 },
                    { "age": 5, "count": 10 },
                    { "age": null, "count": 5 }
                ]
            }"#,
        )
        .unwrap();

        let job: YearMixJob = load_job(&path).unwrap();
        let buckets = job.buckets();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].max_age_years, Some(1));
        assert_eq!(buckets[2].max_age_years, None);
        assert!(crate::select::validate_buckets(&buckets).is_ok());
    }

    #[test]
    fn rejects_malformed_job_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_job::<FreshJob>(&path).is_err());
        assert!(load_job::<FreshJob>(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn dated_name_uses_short_date() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(dated_name("Mix", today), "Mix — 07/08/26");
    }
}
