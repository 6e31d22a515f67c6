//! Track scoring and selection.
//!
//! Scores each candidate by its closeness to the target vector, blends in
//! popularity, then orders, diversifies and truncates.
//!
//! ```text
//! closeness(f) = 1 - min(1, |actual - target|)          (0-1 features)
//! closeness(t) = 1 - min(1, |actual - target| / 50)     (tempo)
//! score        = Σ weight(f) · closeness(f) + weight(p) · popularity / 100
//!                ───────────────────────────────────────────────────────
//!                          Σ weight of contributing terms
//! ```
//!
//! Tracks without audio features are excluded, never scored as zero.

use crate::catalog::{Catalog, Session, Track, MAX_AUDIO_FEATURE_IDS};
use crate::features::{Feature, FeatureVector};
use crate::mood::Emotion;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Per-feature weights of the closeness terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub instrumentalness: f64,
    pub acousticness: f64,
    pub speechiness: f64,
    pub liveness: f64,
    pub mode: f64,
    pub tempo: f64,
    pub popularity: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            energy: 1.0,
            valence: 1.0,
            danceability: 0.7,
            instrumentalness: 0.5,
            acousticness: 0.3,
            speechiness: 0.3,
            liveness: 0.2,
            mode: 0.2,
            tempo: 0.3,
            popularity: 0.5,
        }
    }
}

impl FeatureWeights {
    #[must_use]
    pub const fn weight(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Energy => self.energy,
            Feature::Valence => self.valence,
            Feature::Danceability => self.danceability,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Acousticness => self.acousticness,
            Feature::Speechiness => self.speechiness,
            Feature::Liveness => self.liveness,
            Feature::Mode => self.mode,
            Feature::Tempo => self.tempo,
            Feature::Popularity => self.popularity,
        }
    }
}

/// Scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringContext {
    pub weights: FeatureWeights,
    /// BPM difference at which tempo closeness bottoms out.
    pub tempo_span: f64,
    /// Scores closer than this are considered tied for mood ordering.
    pub tie_resolution: f64,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            tempo_span: 50.0,
            tie_resolution: 0.01,
        }
    }
}

/// Selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub playlist_length: usize,
    pub max_per_artist: usize,
    pub audio_feature_chunk: usize,
    pub scoring: ScoringContext,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            playlist_length: 20,
            max_per_artist: 2,
            audio_feature_chunk: MAX_AUDIO_FEATURE_IDS,
            scoring: ScoringContext::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub score: f64,
    pub track: Track,
}

impl AsRef<Track> for ScoredTrack {
    fn as_ref(&self) -> &Track {
        &self.track
    }
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

/// Closeness in [0, 1] between an actual and a target value.
#[must_use]
pub fn closeness(feature: Feature, actual: f64, target: f64, tempo_span: f64) -> f64 {
    let diff = (actual - target).abs();
    let normalized = match feature {
        Feature::Tempo => diff / tempo_span,
        _ => diff,
    };
    1.0 - normalized.min(1.0)
}

/// Score of one track, or `None` when it carries no audio features.
#[must_use]
pub fn score_track(track: &Track, target: &FeatureVector, context: &ScoringContext) -> Option<f64> {
    let features = track.audio_features.as_ref()?;

    let (mut sum, mut total_weight) = target
        .iter()
        .filter(|(feature, _)| *feature != Feature::Popularity)
        .filter_map(|(feature, wanted)| {
            features
                .get(feature)
                .map(|actual| (feature, actual, wanted))
        })
        .fold((0.0, 0.0), |(sum, total), (feature, actual, wanted)| {
            let weight = context.weights.weight(feature);
            (
                sum + weight * closeness(feature, actual, wanted, context.tempo_span),
                total + weight,
            )
        });

    let popularity = track
        .popularity
        .map(f64::from)
        .or_else(|| features.get(Feature::Popularity));
    if let Some(popularity) = popularity {
        let weight = context.weights.popularity;
        sum += weight * popularity / 100.0;
        total_weight += weight;
    }

    Some(if total_weight > 0.0 { sum / total_weight } else { 0.0 })
}

/// Scores every track that has audio features and sorts descending. Ties
/// keep their input order.
#[must_use]
pub fn score_tracks(
    tracks: Vec<Track>,
    target: &FeatureVector,
    context: &ScoringContext,
) -> Vec<ScoredTrack> {
    let total = tracks.len();
    let mut scored: Vec<ScoredTrack> = tracks
        .into_par_iter()
        .filter_map(|track| {
            score_track(&track, target, context).map(|score| ScoredTrack { score, track })
        })
        .collect();

    if scored.len() < total {
        debug!("Excluded {} tracks without audio features", total - scored.len());
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Fills in missing audio features from the catalog, `chunk` ids per call.
/// A failed lookup leaves its chunk unenriched.
pub fn enrich_audio_features(
    catalog: &dyn Catalog,
    session: &Session,
    tracks: &mut [Track],
    chunk: usize,
) {
    let missing: Vec<String> = tracks
        .iter()
        .filter(|t| t.audio_features.is_none())
        .map(|t| t.id.clone())
        .collect();
    if missing.is_empty() {
        return;
    }

    let mut fetched: HashMap<String, FeatureVector> = HashMap::new();
    for ids in missing.chunks(chunk.clamp(1, MAX_AUDIO_FEATURE_IDS)) {
        match catalog.audio_features(session, ids) {
            Ok(features) => fetched.extend(features),
            Err(e) => warn!("Audio feature lookup for {} tracks failed: {e:#}", ids.len()),
        }
    }
    debug!("Fetched audio features for {}/{} tracks", fetched.len(), missing.len());

    for track in tracks.iter_mut().filter(|t| t.audio_features.is_none()) {
        track.audio_features = fetched.remove(&track.id);
    }
}

/// Reorders tracks with near-equal scores by a mood-consistent secondary key.
///
/// Scores are bucketed at `resolution`; only happy, sad, energetic and calm
/// have a secondary key, everything else keeps pure score order.
pub fn apply_mood_tie_break(scored: &mut [ScoredTrack], emotion: Emotion, resolution: f64) {
    let resolution = if resolution > 0.0 { resolution } else { 0.01 };
    let bucket = |t: &ScoredTrack| (t.score / resolution).round() as i64;

    scored.sort_by(|a, b| bucket(b).cmp(&bucket(a)).then_with(|| mood_order(emotion, a, b)));
}

fn feature_or(track: &ScoredTrack, feature: Feature, default: f64) -> f64 {
    track
        .track
        .audio_features
        .as_ref()
        .and_then(|f| f.get(feature))
        .unwrap_or(default)
}

fn mood_order(emotion: Emotion, a: &ScoredTrack, b: &ScoredTrack) -> Ordering {
    let desc =
        |feature: Feature| feature_or(b, feature, 0.0).total_cmp(&feature_or(a, feature, 0.0));
    let asc =
        |feature: Feature| feature_or(a, feature, 1.0).total_cmp(&feature_or(b, feature, 1.0));

    match emotion {
        Emotion::Happy => desc(Feature::Valence).then_with(|| desc(Feature::Energy)),
        Emotion::Sad => asc(Feature::Valence).then_with(|| asc(Feature::Energy)),
        Emotion::Energetic => desc(Feature::Energy).then_with(|| desc(Feature::Tempo)),
        Emotion::Calm => asc(Feature::Energy).then_with(|| desc(Feature::Acousticness)),
        _ => Ordering::Equal,
    }
}

/// Keeps at most `max_per_artist` tracks per primary artist, preserving
/// order. A cap of zero is treated as one.
#[must_use]
pub fn diversify<T: AsRef<Track>>(items: Vec<T>, max_per_artist: usize) -> Vec<T> {
    let cap = max_per_artist.max(1);
    let mut counts: HashMap<String, usize> = HashMap::new();

    items
        .into_iter()
        .filter(|item| {
            let count = counts.entry(item.as_ref().primary_artist().to_string()).or_insert(0);
            *count += 1;
            *count <= cap
        })
        .collect()
}

/// Score distribution helpers for logging and tuning.
pub mod statistics {
    use super::ScoredTrack;
    use serde::Serialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    pub struct ScoreStatistics {
        pub mean: f64,
        pub std_deviation: f64,
        pub min: f64,
        pub max: f64,
        pub count: usize,
    }

    #[must_use]
    pub fn analyze_score_distribution(scored: &[ScoredTrack]) -> ScoreStatistics {
        if scored.is_empty() {
            return ScoreStatistics::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let n = scored.len() as f64;
        let mean = scored.iter().map(|t| t.score).sum::<f64>() / n;
        let variance = scored.iter().map(|t| (t.score - mean).powi(2)).sum::<f64>() / n;

        ScoreStatistics {
            mean,
            std_deviation: variance.sqrt(),
            min: scored.iter().map(|t| t.score).fold(f64::INFINITY, f64::min),
            max: scored.iter().map(|t| t.score).fold(f64::NEG_INFINITY, f64::max),
            count: scored.len(),
        }
    }
}
