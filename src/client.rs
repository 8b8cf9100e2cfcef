//! Spotify Web API client.
//!
//! All remote access goes through the [`PlaylistApi`] trait so that the
//! selection and reconciliation code never knows about HTTP; [`HttpApi`] is
//! the blocking `ureq` implementation used by the binaries.
//!
//! Authentication: a pre-acquired OAuth bearer token, either from the
//! `SPOTIFY_TOKEN` environment variable or from a `playmix_credentials.toml`
//! (next to the binary, or `~/.config/playmix/credentials.toml`) with an
//! `access_token` key. Acquiring/refreshing the token is left to whatever
//! OAuth helper the operator prefers.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pacing::Pacer;

// ── Core data types ──────────────────────────────────────────────────────────

/// A track as fetched from the catalog. Read-only view; the library only
/// ever selects or discards ids, it never writes track data back.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// International Standard Recording Code, shared by all releases of the
    /// same recording. Absent on some local/regional tracks.
    pub isrc: Option<String>,
    /// Partial ISO date of the album release: `YYYY`, `YYYY-MM` or
    /// `YYYY-MM-DD`. Empty when the catalog reports none.
    pub release_date: String,
    /// Display-only.
    pub artists: Vec<String>,
}

/// Where tracks are pulled from: a playlist, or the user's saved-tracks
/// library ("Liked Songs"). The library is read-only and pages at 50 per
/// request instead of 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Saved,
    Playlist(String),
}

impl Source {
    /// The reserved id `"saved"` denotes the saved-tracks library.
    pub fn parse(id: &str) -> Source {
        if id == "saved" {
            Source::Saved
        } else {
            Source::Playlist(id.to_string())
        }
    }

    /// Per-request item ceiling for this source kind.
    pub fn page_limit(&self) -> usize {
        match self {
            Source::Saved => 50,
            Source::Playlist(_) => 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistMeta {
    pub name: String,
    pub total: usize,
}

// ── Collaborator trait ───────────────────────────────────────────────────────

/// The remote operations the toolkit needs. `&mut self` because the HTTP
/// implementation paces itself between calls.
pub trait PlaylistApi {
    /// One page of a source's tracks. `limit` must not exceed the source's
    /// [`Source::page_limit`].
    fn list_page(&mut self, source: &Source, limit: usize, offset: usize) -> Result<Vec<Track>>;

    /// Total number of tracks in a source, without fetching them.
    fn collection_total(&mut self, source: &Source) -> Result<usize>;

    /// Playlist display name and track total.
    fn playlist_meta(&mut self, playlist_id: &str) -> Result<PlaylistMeta>;

    /// One page of the catalog-wide search for all releases of a recording.
    fn search_isrc(&mut self, isrc: &str, limit: usize, offset: usize) -> Result<Vec<Track>>;

    /// Append tracks to a playlist, or insert at `position`. At most 100 ids
    /// per call.
    fn add_items(
        &mut self,
        playlist_id: &str,
        ids: &[String],
        position: Option<usize>,
    ) -> Result<()>;

    /// Remove all occurrences of the given tracks. At most 100 ids per call.
    fn remove_items(&mut self, playlist_id: &str, ids: &[String]) -> Result<()>;

    /// Create a playlist owned by `user`, returning its id.
    fn create_playlist(&mut self, user: &str, name: &str, public: bool) -> Result<String>;
}

// ── Credentials ──────────────────────────────────────────────────────────────

/// Try the environment, then known file paths, for an access token.
fn load_token() -> Option<String> {
    if let Ok(token) = std::env::var("SPOTIFY_TOKEN") {
        if !token.is_empty() {
            return Some(token);
        }
    }

    let mut paths = vec![std::path::PathBuf::from("playmix_credentials.toml")];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(
            std::path::PathBuf::from(home).join(".config/playmix/credentials.toml"),
        );
    }

    for path in paths {
        if let Ok(content) = std::fs::read_to_string(&path) {
            if let Ok(table) = content.parse::<toml::Table>() {
                if let Some(token) = table.get("access_token").and_then(|v| v.as_str()) {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

// ── API response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    items: Vec<ApiPageItem>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct ApiPageItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
    external_ids: Option<ApiExternalIds>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiExternalIds {
    isrc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    tracks: ApiSearchPage,
}

#[derive(Debug, Deserialize)]
struct ApiSearchPage {
    #[serde(default)]
    items: Vec<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistMeta {
    name: String,
    tracks: ApiTrackTotal,
}

#[derive(Debug, Deserialize)]
struct ApiTrackTotal {
    total: usize,
}

#[derive(Debug, Deserialize)]
struct ApiCreatedPlaylist {
    id: String,
}

impl ApiTrack {
    /// Local tracks have no catalog id; those are dropped.
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        Some(Track {
            id,
            name: self.name,
            isrc: self.external_ids.and_then(|e| e.isrc),
            release_date: self
                .album
                .and_then(|a| a.release_date)
                .unwrap_or_default(),
            artists: self.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

fn collect_tracks(items: Vec<ApiPageItem>) -> Vec<Track> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter_map(ApiTrack::into_track)
        .collect()
}

// ── HTTP implementation ──────────────────────────────────────────────────────

const API_BASE: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = "playmix/0.2 +https://github.com/playmix/playmix";

pub struct HttpApi {
    agent: ureq::Agent,
    token: String,
    pacer: Pacer,
}

impl HttpApi {
    pub fn new(token: String) -> Self {
        HttpApi {
            agent: ureq::Agent::new(),
            token,
            // Spotify allows bursts; ~5 req/s sustained keeps us clear.
            pacer: Pacer::from_millis(200),
        }
    }

    /// Build a client from `SPOTIFY_TOKEN` or a credentials file.
    pub fn from_env() -> Result<Self> {
        let token = load_token().ok_or_else(|| {
            Error::Auth(
                "no access token; set SPOTIFY_TOKEN or create playmix_credentials.toml"
                    .to_string(),
            )
        })?;
        Ok(Self::new(token))
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{}", API_BASE, path))
            .set("User-Agent", USER_AGENT)
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    /// GET `path` and deserialize the JSON body.
    fn get_json<T: serde::de::DeserializeOwned>(&mut self, path: &str) -> Result<T> {
        self.pacer.pace();
        let response = self.request("GET", path).call().map_err(|e| {
            if let ureq::Error::Status(429, _) = e {
                self.pacer.backoff();
            }
            Error::Fetch(e.to_string())
        })?;
        self.pacer.settle();
        serde_json::from_reader(response.into_reader()).map_err(|e| Error::Api(e.to_string()))
    }

    /// Send a JSON body with `method`, deserializing the response.
    fn send_json<T: serde::de::DeserializeOwned>(
        &mut self,
        method: &str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        self.pacer.pace();
        let response = self.request(method, path).send_json(body).map_err(|e| {
            if let ureq::Error::Status(429, _) = e {
                self.pacer.backoff();
            }
            Error::Mutation(e.to_string())
        })?;
        self.pacer.settle();
        serde_json::from_reader(response.into_reader()).map_err(|e| Error::Api(e.to_string()))
    }

    fn track_uris(ids: &[String]) -> Vec<String> {
        ids.iter().map(|id| format!("spotify:track:{}", id)).collect()
    }
}

impl PlaylistApi for HttpApi {
    fn list_page(&mut self, source: &Source, limit: usize, offset: usize) -> Result<Vec<Track>> {
        let path = match source {
            Source::Saved => format!("/me/tracks?limit={}&offset={}", limit, offset),
            Source::Playlist(id) => {
                format!("/playlists/{}/tracks?limit={}&offset={}", id, limit, offset)
            }
        };
        let page: ApiPage = self.get_json(&path)?;
        Ok(collect_tracks(page.items))
    }

    fn collection_total(&mut self, source: &Source) -> Result<usize> {
        match source {
            Source::Saved => {
                let page: ApiPage = self.get_json("/me/tracks?limit=1")?;
                Ok(page.total)
            }
            Source::Playlist(id) => Ok(self.playlist_meta(id)?.total),
        }
    }

    fn playlist_meta(&mut self, playlist_id: &str) -> Result<PlaylistMeta> {
        let meta: ApiPlaylistMeta =
            self.get_json(&format!("/playlists/{}?fields=name,tracks.total", playlist_id))?;
        Ok(PlaylistMeta {
            name: meta.name,
            total: meta.tracks.total,
        })
    }

    fn search_isrc(&mut self, isrc: &str, limit: usize, offset: usize) -> Result<Vec<Track>> {
        let response: ApiSearchResponse = self.get_json(&format!(
            "/search?q=isrc:{}&type=track&limit={}&offset={}",
            isrc, limit, offset
        ))?;
        Ok(response
            .tracks
            .items
            .into_iter()
            .filter_map(ApiTrack::into_track)
            .collect())
    }

    fn add_items(
        &mut self,
        playlist_id: &str,
        ids: &[String],
        position: Option<usize>,
    ) -> Result<()> {
        let mut body = serde_json::json!({ "uris": Self::track_uris(ids) });
        if let Some(pos) = position {
            body["position"] = serde_json::json!(pos);
        }
        let _: serde_json::Value =
            self.send_json("POST", &format!("/playlists/{}/tracks", playlist_id), body)?;
        Ok(())
    }

    fn remove_items(&mut self, playlist_id: &str, ids: &[String]) -> Result<()> {
        let tracks: Vec<serde_json::Value> = Self::track_uris(ids)
            .into_iter()
            .map(|uri| serde_json::json!({ "uri": uri }))
            .collect();
        let _: serde_json::Value = self.send_json(
            "DELETE",
            &format!("/playlists/{}/tracks", playlist_id),
            serde_json::json!({ "tracks": tracks }),
        )?;
        Ok(())
    }

    fn create_playlist(&mut self, user: &str, name: &str, public: bool) -> Result<String> {
        let created: ApiCreatedPlaylist = self.send_json(
            "POST",
            &format!("/users/{}/playlists", user),
            serde_json::json!({ "name": name, "public": public }),
        )?;
        Ok(created.id)
    }
}

// ── In-memory fake for tests ─────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Every remote call a [`FakeApi`] receives, for asserting call counts,
    /// batch sizes and ordering.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        List {
            source: Source,
            limit: usize,
            offset: usize,
        },
        Total(Source),
        Meta(String),
        Search(String),
        Add {
            playlist: String,
            ids: Vec<String>,
            position: Option<usize>,
        },
        Remove {
            playlist: String,
            ids: Vec<String>,
        },
        Create(String),
    }

    #[derive(Default)]
    pub struct FakeApi {
        pub saved: Vec<Track>,
        pub playlists: HashMap<String, Vec<Track>>,
        pub by_isrc: HashMap<String, Vec<Track>>,
        /// Full track data by id, so mutations insert real tracks.
        pub catalog: HashMap<String, Track>,
        pub calls: Vec<Call>,
        /// When set, any list page at or past this offset fails.
        pub fail_from_offset: Option<usize>,
    }

    /// Shorthand for a track with only the fields the engine cares about.
    pub fn track(id: &str, isrc: Option<&str>, release_date: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("track {}", id),
            isrc: isrc.map(str::to_string),
            release_date: release_date.to_string(),
            artists: vec!["artist".to_string()],
        }
    }

    impl FakeApi {
        pub fn with_playlist(mut self, id: &str, tracks: Vec<Track>) -> Self {
            self.register(&tracks);
            self.playlists.insert(id.to_string(), tracks);
            self
        }

        pub fn with_saved(mut self, tracks: Vec<Track>) -> Self {
            self.register(&tracks);
            self.saved = tracks;
            self
        }

        pub fn with_variants(mut self, isrc: &str, variants: Vec<Track>) -> Self {
            self.register(&variants);
            self.by_isrc.insert(isrc.to_string(), variants);
            self
        }

        /// Make tracks known to the fake catalog without putting them
        /// anywhere, so id-based adds insert full track data.
        pub fn register(&mut self, tracks: &[Track]) {
            for t in tracks {
                self.catalog.insert(t.id.clone(), t.clone());
            }
        }

        pub fn playlist_ids(&self, id: &str) -> Vec<&str> {
            self.playlists[id].iter().map(|t| t.id.as_str()).collect()
        }

        pub fn mutation_count(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Add { .. } | Call::Remove { .. }))
                .count()
        }

        fn source_tracks(&self, source: &Source) -> Vec<Track> {
            match source {
                Source::Saved => self.saved.clone(),
                Source::Playlist(id) => self.playlists.get(id).cloned().unwrap_or_default(),
            }
        }
    }

    impl PlaylistApi for FakeApi {
        fn list_page(
            &mut self,
            source: &Source,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<Track>> {
            assert!(limit <= source.page_limit(), "page limit exceeded");
            self.calls.push(Call::List {
                source: source.clone(),
                limit,
                offset,
            });
            if let Some(bad) = self.fail_from_offset {
                if offset >= bad {
                    return Err(Error::Fetch("injected page failure".to_string()));
                }
            }
            let tracks = self.source_tracks(source);
            Ok(tracks
                .into_iter()
                .skip(offset)
                .take(limit)
                .collect())
        }

        fn collection_total(&mut self, source: &Source) -> Result<usize> {
            self.calls.push(Call::Total(source.clone()));
            Ok(self.source_tracks(source).len())
        }

        fn playlist_meta(&mut self, playlist_id: &str) -> Result<PlaylistMeta> {
            self.calls.push(Call::Meta(playlist_id.to_string()));
            Ok(PlaylistMeta {
                name: format!("playlist {}", playlist_id),
                total: self.playlists.get(playlist_id).map_or(0, Vec::len),
            })
        }

        fn search_isrc(&mut self, isrc: &str, _limit: usize, offset: usize) -> Result<Vec<Track>> {
            self.calls.push(Call::Search(isrc.to_string()));
            if offset > 0 {
                return Ok(Vec::new());
            }
            Ok(self.by_isrc.get(isrc).cloned().unwrap_or_default())
        }

        fn add_items(
            &mut self,
            playlist_id: &str,
            ids: &[String],
            position: Option<usize>,
        ) -> Result<()> {
            assert!(!ids.is_empty(), "empty add batch issued");
            assert!(ids.len() <= 100, "add batch over the API ceiling");
            self.calls.push(Call::Add {
                playlist: playlist_id.to_string(),
                ids: ids.to_vec(),
                position,
            });
            let new: Vec<Track> = ids
                .iter()
                .map(|id| {
                    self.catalog
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| track(id, None, ""))
                })
                .collect();
            let tracks = self.playlists.entry(playlist_id.to_string()).or_default();
            match position {
                Some(pos) => {
                    let pos = pos.min(tracks.len());
                    tracks.splice(pos..pos, new);
                }
                None => tracks.extend(new),
            }
            Ok(())
        }

        fn remove_items(&mut self, playlist_id: &str, ids: &[String]) -> Result<()> {
            assert!(!ids.is_empty(), "empty remove batch issued");
            assert!(ids.len() <= 100, "remove batch over the API ceiling");
            self.calls.push(Call::Remove {
                playlist: playlist_id.to_string(),
                ids: ids.to_vec(),
            });
            if let Some(tracks) = self.playlists.get_mut(playlist_id) {
                tracks.retain(|t| !ids.contains(&t.id));
            }
            Ok(())
        }

        fn create_playlist(&mut self, _user: &str, name: &str, _public: bool) -> Result<String> {
            self.calls.push(Call::Create(name.to_string()));
            let id = format!("created-{}", self.playlists.len());
            self.playlists.insert(id.clone(), Vec::new());
            Ok(id)
        }
    }
}
