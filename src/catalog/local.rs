//! Offline catalog backed by a JSON file.
//!
//! ```json
//! {
//!   "genres": ["pop", "rock", "indie"],
//!   "top_genres": ["indie", "pop"],
//!   "recently_played": ["t1", "t7"],
//!   "tracks": [
//!     { "id": "t1", "uri": "spotify:track:t1", "name": "...", "artists": ["..."],
//!       "album": "...", "popularity": 61, "genres": ["indie"],
//!       "audio_features": { "energy": 0.7, "valence": 0.6, "tempo": 118.0 } }
//!   ]
//! }
//! ```
//!
//! Recommendation results omit audio features, which are only served through
//! [`Catalog::audio_features`], the same split a remote service makes.

use super::{rank_genres, Catalog, RecommendationQuery, Session, Track, MAX_AUDIO_FEATURE_IDS};
use crate::features::FeatureVector;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogEntry {
    #[serde(flatten)]
    track: Track,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct CatalogFile {
    genres: Vec<String>,
    top_genres: Vec<String>,
    recently_played: Vec<String>,
    tracks: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
pub struct LocalCatalog {
    file: CatalogFile,
}

impl LocalCatalog {
    pub fn open(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        info!(
            "Loaded local catalog with {} tracks and {} genres",
            catalog.track_count(),
            catalog.file.genres.len()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self { file })
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.file.tracks.len()
    }

    fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.file.tracks.iter().find(|entry| entry.track.id == id)
    }

    fn matches_seeds(&self, entry: &CatalogEntry, query: &RecommendationQuery) -> bool {
        let seeds = &query.seeds;
        if seeds.tracks.contains(&entry.track.id) {
            return false;
        }

        let by_genre = entry.genres.iter().any(|g| seeds.genres.contains(g));
        let by_artist = entry.track.artists.iter().any(|a| seeds.artists.contains(a));
        let by_track = seeds
            .tracks
            .iter()
            .filter_map(|id| self.entry(id))
            .any(|seed| seed.track.artists.iter().any(|a| entry.track.artists.contains(a)));

        by_genre || by_artist || by_track
    }
}

impl Catalog for LocalCatalog {
    fn available_genres(&self, _session: &Session) -> Result<Vec<String>> {
        Ok(self.file.genres.clone())
    }

    fn recommendations(
        &self,
        _session: &Session,
        query: &RecommendationQuery,
    ) -> Result<Vec<Track>> {
        query.seeds.validate()?;

        let tracks: Vec<Track> = self
            .file
            .tracks
            .iter()
            .filter(|entry| self.matches_seeds(entry, query))
            .filter(|entry| {
                entry
                    .track
                    .audio_features
                    .as_ref()
                    .map_or(true, |features| query.admits(features))
            })
            .take(query.limit)
            .map(|entry| Track {
                audio_features: None,
                ..entry.track.clone()
            })
            .collect();

        debug!("Local catalog answered {:?} with {} tracks", query.seeds, tracks.len());
        Ok(tracks)
    }

    fn audio_features(
        &self,
        _session: &Session,
        ids: &[String],
    ) -> Result<HashMap<String, FeatureVector>> {
        if ids.len() > MAX_AUDIO_FEATURE_IDS {
            bail!(
                "At most {MAX_AUDIO_FEATURE_IDS} ids per audio-feature lookup, got {}",
                ids.len()
            );
        }
        Ok(ids
            .iter()
            .filter_map(|id| {
                let features = self.entry(id)?.track.audio_features.clone()?;
                Some((id.clone(), features))
            })
            .collect())
    }

    /// The file's `top_genres`, or when it has none, the genres of the
    /// listening history ranked by frequency.
    fn top_genres(&self, _session: &Session) -> Result<Vec<String>> {
        if !self.file.top_genres.is_empty() {
            return Ok(self.file.top_genres.clone());
        }
        let history: Vec<Vec<String>> = self
            .file
            .recently_played
            .iter()
            .filter_map(|id| self.entry(id).map(|entry| entry.genres.clone()))
            .collect();
        Ok(rank_genres(&history))
    }

    fn recently_played(&self, _session: &Session) -> Result<Vec<Track>> {
        Ok(self
            .file
            .recently_played
            .iter()
            .filter_map(|id| self.entry(id).map(|entry| entry.track.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SeedSet;
    use crate::features::Feature;

    const CATALOG: &str = r#"{
        "genres": ["pop", "rock", "indie"],
        "top_genres": ["indie", "shoegaze"],
        "recently_played": ["r1", "missing"],
        "tracks": [
            {"id": "p1", "uri": "spotify:track:p1", "name": "Pop One", "artists": ["A"],
             "album": "X", "genres": ["pop"], "audio_features": {"energy": 0.8, "valence": 0.9}},
            {"id": "p2", "uri": "spotify:track:p2", "name": "Pop Two", "artists": ["B"],
             "album": "X", "genres": ["pop"], "audio_features": {"energy": 0.2, "valence": 0.3}},
            {"id": "r1", "uri": "spotify:track:r1", "name": "Rock One", "artists": ["C"],
             "album": "Y", "genres": ["rock"]},
            {"id": "r2", "uri": "spotify:track:r2", "name": "Rock Two", "artists": ["C", "A"],
             "album": "Y", "genres": ["rock"], "audio_features": {"energy": 0.9}}
        ]
    }"#;

    fn catalog() -> LocalCatalog {
        LocalCatalog::from_json(CATALOG).unwrap()
    }

    #[test]
    fn test_genre_query_filters_by_bounds() {
        let session = Session::local("u");
        let mut query = RecommendationQuery::new(SeedSet::from_genres(&["pop"]), 10);
        query.min.set(Feature::Energy, 0.5);

        let ids: Vec<String> = catalog()
            .recommendations(&session, &query)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[test]
    fn test_track_seed_matches_shared_artist() {
        let session = Session::local("u");
        let query = RecommendationQuery::new(SeedSet::from_tracks(&["r1"]), 10);
        let tracks = catalog().recommendations(&session, &query).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "r2");
        assert!(tracks[0].audio_features.is_none());
    }

    #[test]
    fn test_invalid_seed_set_rejected() {
        let session = Session::local("u");
        let query = RecommendationQuery::new(SeedSet::default(), 10);
        assert!(catalog().recommendations(&session, &query).is_err());
    }

    #[test]
    fn test_audio_features_and_history() {
        let session = Session::local("u");
        let catalog = catalog();

        let ids = vec!["p1".to_string(), "r1".to_string(), "nope".to_string()];
        let features = catalog.audio_features(&session, &ids).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features["p1"].get(Feature::Energy), Some(0.8));

        let recent = catalog.recently_played(&session).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "r1");

        let too_many: Vec<String> = (0..101).map(|i| i.to_string()).collect();
        assert!(catalog.audio_features(&session, &too_many).is_err());
    }

    #[test]
    fn test_top_genres_from_file() {
        let catalog = catalog();
        assert_eq!(catalog.track_count(), 4);
        let top = catalog.top_genres(&Session::local("u")).unwrap();
        assert_eq!(top, vec!["indie", "shoegaze"]);
    }

    #[test]
    fn test_top_genres_ranked_from_history() {
        let catalog = LocalCatalog::from_json(
            r#"{
                "recently_played": ["a", "b", "c", "a"],
                "tracks": [
                    {"id": "a", "uri": "u:a", "name": "A", "artists": ["X"], "album": "",
                     "genres": ["jazz", "soul"]},
                    {"id": "b", "uri": "u:b", "name": "B", "artists": ["Y"], "album": "",
                     "genres": ["soul"]},
                    {"id": "c", "uri": "u:c", "name": "C", "artists": ["Z"], "album": "",
                     "genres": ["funk"]}
                ]
            }"#,
        )
        .unwrap();

        let top = catalog.top_genres(&Session::local("u")).unwrap();
        assert_eq!(top, vec!["soul", "jazz", "funk"]);
    }
}
