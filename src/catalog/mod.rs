//! # Catalog collaborators
//!
//! The recommender never talks HTTP itself. Everything it needs from a music
//! service is expressed here as two traits:
//!
//! - [`Catalog`]: genre vocabulary, recommendations, audio features and the
//!   listener's history
//! - [`PlaylistSink`]: playlist creation and track insertion
//!
//! Both take an explicit [`Session`] on every call instead of reading a
//! process-wide token.

pub mod local;

pub use local::LocalCatalog;

use crate::error::MoodError;
use crate::features::FeatureVector;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catalog ceiling on seeds per recommendation query, across all three kinds.
pub const MAX_SEEDS: usize = 5;
/// Catalog ceiling on ids per audio-feature lookup.
pub const MAX_AUDIO_FEATURE_IDS: usize = 100;
/// Catalog ceiling on uris per track-add call.
pub const MAX_TRACKS_PER_ADD: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    #[serde(default)]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub audio_features: Option<FeatureVector>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub duration_ms: u32,
}

impl Track {
    /// Minimal track with a `spotify:track:` uri derived from the id.
    #[must_use]
    pub fn new(id: &str, name: &str, artist: &str, album: &str) -> Self {
        Self {
            id: id.to_string(),
            uri: format!("spotify:track:{id}"),
            name: name.to_string(),
            artists: vec![artist.to_string()],
            album: album.to_string(),
            popularity: None,
            audio_features: None,
            preview_url: None,
            explicit: false,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.audio_features = Some(features);
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: u8) -> Self {
        self.popularity = Some(popularity.min(100));
        self
    }

    /// First credited artist, or the empty string for an uncredited track.
    #[must_use]
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map_or("", String::as_str)
    }
}

/// Seeds anchoring one recommendation query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSet {
    pub genres: Vec<String>,
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
}

impl SeedSet {
    #[must_use]
    pub fn from_genres<S: AsRef<str>>(genres: &[S]) -> Self {
        Self {
            genres: genres.iter().map(|g| g.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_tracks<S: AsRef<str>>(tracks: &[S]) -> Self {
        Self {
            tracks: tracks.iter().map(|t| t.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genres.len() + self.artists.len() + self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A query may only be issued with between one and [`MAX_SEEDS`] seeds.
    pub fn validate(&self) -> Result<(), MoodError> {
        match self.len() {
            0 => Err(MoodError::InvalidSeedSet("no seeds".to_string())),
            n if n > MAX_SEEDS => Err(MoodError::InvalidSeedSet(format!(
                "{n} seeds exceeds the limit of {MAX_SEEDS}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Seeds plus `target_*`/`min_*`/`max_*` feature constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationQuery {
    pub seeds: SeedSet,
    pub target: FeatureVector,
    pub min: FeatureVector,
    pub max: FeatureVector,
    pub limit: usize,
}

impl RecommendationQuery {
    #[must_use]
    pub fn new(seeds: SeedSet, limit: usize) -> Self {
        Self {
            seeds,
            target: FeatureVector::new(),
            min: FeatureVector::new(),
            max: FeatureVector::new(),
            limit,
        }
    }

    /// Whether `features` satisfies every min/max bound. Features the track
    /// lacks are not checked.
    #[must_use]
    pub fn admits(&self, features: &FeatureVector) -> bool {
        let above_min = self
            .min
            .iter()
            .all(|(feature, lo)| features.get(feature).map_or(true, |v| v >= lo));
        let below_max = self
            .max
            .iter()
            .all(|(feature, hi)| features.get(feature).map_or(true, |v| v <= hi));
        above_min && below_max
    }
}

/// Short-lived credential threaded through every collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(access_token: &str, user_id: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
            expires_at,
        }
    }

    /// Session for offline collaborators, valid for a day.
    #[must_use]
    pub fn local(user_id: &str) -> Self {
        Self::new("local", user_id, Utc::now() + chrono::Duration::days(1))
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Read side of a music service.
///
/// Any `Err` is treated by callers as "nothing from this path"; none of these
/// calls is fatal to playlist generation.
pub trait Catalog {
    /// Genre vocabulary the service currently accepts as seeds.
    fn available_genres(&self, session: &Session) -> Result<Vec<String>>;

    fn recommendations(&self, session: &Session, query: &RecommendationQuery) -> Result<Vec<Track>>;

    /// At most [`MAX_AUDIO_FEATURE_IDS`] ids per call. Unknown ids are absent
    /// from the result.
    fn audio_features(
        &self,
        session: &Session,
        ids: &[String],
    ) -> Result<HashMap<String, FeatureVector>>;

    /// Listener's top genres, most significant first.
    fn top_genres(&self, session: &Session) -> Result<Vec<String>>;

    /// Most recent first.
    fn recently_played(&self, session: &Session) -> Result<Vec<Track>>;
}

/// Write side of a music service.
pub trait PlaylistSink {
    fn create_playlist(
        &mut self,
        session: &Session,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<String>;

    /// At most [`MAX_TRACKS_PER_ADD`] uris per call.
    fn add_tracks(&mut self, session: &Session, playlist_id: &str, uris: &[String]) -> Result<()>;
}

/// Flattens per-artist genre lists into one ranking: most frequent first,
/// ties broken by first appearance.
#[must_use]
pub fn rank_genres<S: AsRef<str>>(artist_genres: &[Vec<S>]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for genre in artist_genres.iter().flatten() {
        let genre = genre.as_ref();
        match counts.iter_mut().find(|(g, _)| g == genre) {
            Some((_, count)) => *count += 1,
            None => counts.push((genre.to_string(), 1)),
        }
    }
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|(_, a), (_, b)| b.cmp(a));
    counts.into_iter().map(|(genre, _)| genre).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;

    #[test]
    fn test_seed_set_validation() {
        assert!(SeedSet::default().validate().is_err());
        assert!(SeedSet::from_genres(&["pop"]).validate().is_ok());

        let mut seeds = SeedSet::from_genres(&["pop", "rock", "indie"]);
        seeds.tracks = vec!["a".into(), "b".into()];
        assert!(seeds.validate().is_ok());

        seeds.artists.push("x".into());
        assert!(matches!(seeds.validate(), Err(MoodError::InvalidSeedSet(_))));
    }

    #[test]
    fn test_query_admits() {
        let mut query = RecommendationQuery::new(SeedSet::from_genres(&["pop"]), 10);
        query.min.set(Feature::Energy, 0.5);
        query.max.set(Feature::Energy, 0.9);
        query.max.set(Feature::Tempo, 130.0);

        let fits = FeatureVector::from_pairs(&[(Feature::Energy, 0.6), (Feature::Tempo, 120.0)]);
        let too_fast =
            FeatureVector::from_pairs(&[(Feature::Energy, 0.6), (Feature::Tempo, 150.0)]);
        let too_quiet = FeatureVector::from_pairs(&[(Feature::Energy, 0.2)]);
        let unknown = FeatureVector::new();

        assert!(query.admits(&fits));
        assert!(!query.admits(&too_fast));
        assert!(!query.admits(&too_quiet));
        assert!(query.admits(&unknown));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session::new("token", "user", now + chrono::Duration::minutes(5));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + chrono::Duration::minutes(5)));
    }

    #[test]
    fn test_rank_genres() {
        let artist_genres = vec![
            vec!["indie", "rock"],
            vec!["pop"],
            vec!["rock", "pop"],
            vec!["jazz", "indie"],
        ];
        assert_eq!(rank_genres(&artist_genres), vec!["indie", "rock", "pop", "jazz"]);
        assert!(rank_genres::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_track_defaults() {
        let track = Track::new("abc", "Song", "Artist", "Album");
        assert_eq!(track.uri, "spotify:track:abc");
        assert_eq!(track.primary_artist(), "Artist");
        assert_eq!(track.clone().with_popularity(250).popularity, Some(100));
    }
}
