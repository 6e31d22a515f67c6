//! # Candidate Acquisition
//!
//! Collects enough unique candidate tracks to score, using three seed
//! strategies in turn:
//!
//! 1. [`GenreSeeds`]: the listener's top genres that the catalog accepts,
//!    queried as one- or two-genre sliding windows
//! 2. [`HistorySeeds`]: up to five recently played tracks, queried in pairs
//! 3. [`GenericSeeds`]: broad genres, queried one at a time
//!
//! Each strategy has an entry condition and a goal on the pool size. Results
//! are deduplicated by track id with the first occurrence kept. Catalog errors
//! only ever mean "no tracks from this query". When every tier comes back
//! empty, [`fallback_tracks`] is returned instead.

use crate::catalog::{Catalog, RecommendationQuery, SeedSet, Session, Track};
use crate::features::{Feature, FeatureVector};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Broad genres used when the listener's history yields too little.
pub const GENERIC_GENRES: [&str; 5] = ["pop", "rock", "alternative", "electronic", "indie"];

/// How many genre windows the genre tier tries at most.
const MAX_GENRE_WINDOWS: usize = 3;
/// How far back the history tier looks.
const RECENT_TRACK_WINDOW: usize = 10;
/// Distinct recent tracks the history tier seeds with.
const MAX_HISTORY_SEEDS: usize = 5;

lazy_static::lazy_static! {
    static ref FALLBACK_TRACKS: Vec<Track> = vec![
        Track::new("4cluDES4hQEUhmXj6TXkSo", "Lose Yourself", "Eminem", "8 Mile"),
        Track::new(
            "7GhIk7Il098yCjg4BQjzvb",
            "Never Gonna Give You Up",
            "Rick Astley",
            "Whenever You Need Somebody",
        ),
        Track::new("4cOdK2wGLETKBW3PvgPWqT", "Billie Jean", "Michael Jackson", "Thriller"),
        Track::new("1jDJFeK9x3OZboIAHsY9k2", "Imagine", "John Lennon", "Imagine"),
        Track::new("3SdTKo2uVsxFblQjpScoHy", "Bohemian Rhapsody", "Queen", "A Night at the Opera"),
    ];
}

/// Well-known tracks returned when no strategy produced anything.
#[must_use]
pub fn fallback_tracks() -> Vec<Track> {
    FALLBACK_TRACKS.clone()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Genre tier stops once the pool reaches this size.
    pub genre_goal: usize,
    /// History tier stops once the pool reaches this size.
    pub history_goal: usize,
    /// Generic tier stops once the pool reaches this size.
    pub generic_goal: usize,
    pub query_limit: usize,
    /// Half-width of the min/max band around 0-1 targets.
    pub feature_band: f64,
    /// Half-width of the min/max band around the tempo target, in BPM.
    pub tempo_band: f64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            genre_goal: 15,
            history_goal: 25,
            generic_goal: 20,
            query_limit: 30,
            feature_band: 0.2,
            tempo_band: 20.0,
        }
    }
}

/// Deduplicating accumulator; the first track seen for an id wins.
#[derive(Debug, Default)]
pub struct CandidatePool {
    tracks: Vec<Track>,
    seen: HashSet<String>,
}

impl CandidatePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds unseen tracks in order and returns how many were new.
    pub fn merge(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let before = self.tracks.len();
        for track in tracks {
            if self.seen.insert(track.id.clone()) {
                self.tracks.push(track);
            }
        }
        self.tracks.len() - before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// One tier of seed selection.
pub trait SeedStrategy {
    fn name(&self) -> &'static str;

    /// Whether the tier runs at all given the pool size so far.
    fn applies(&self, pool_len: usize, config: &AcquisitionConfig) -> bool;

    /// Pool size at which the tier stops issuing queries.
    fn goal(&self, config: &AcquisitionConfig) -> usize;

    /// Seed sets to query, in order. Errors are logged by the caller and
    /// treated as an empty plan.
    fn seed_sets(&self, catalog: &dyn Catalog, session: &Session) -> anyhow::Result<Vec<SeedSet>>;
}

/// Listener's top genres that the catalog currently accepts.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenreSeeds;

impl SeedStrategy for GenreSeeds {
    fn name(&self) -> &'static str {
        "genre"
    }

    fn applies(&self, _pool_len: usize, _config: &AcquisitionConfig) -> bool {
        true
    }

    fn goal(&self, config: &AcquisitionConfig) -> usize {
        config.genre_goal
    }

    fn seed_sets(&self, catalog: &dyn Catalog, session: &Session) -> anyhow::Result<Vec<SeedSet>> {
        let available = catalog.available_genres(session)?;
        let top = catalog.top_genres(session)?;

        let mut valid: Vec<String> = Vec::new();
        for genre in top {
            if available.contains(&genre) && !valid.contains(&genre) {
                valid.push(genre);
            }
        }
        debug!("Valid top genres: {valid:?}");

        Ok(genre_windows(&valid))
    }
}

/// Windows of up to two consecutive genres, starting at each of the first
/// few positions.
#[must_use]
pub fn genre_windows(genres: &[String]) -> Vec<SeedSet> {
    (0..genres.len().min(MAX_GENRE_WINDOWS))
        .map(|i| SeedSet::from_genres(&genres[i..(i + 2).min(genres.len())]))
        .collect()
}

/// Distinct tracks from the listener's recent history, two per query.
#[derive(Debug, Default, Clone, Copy)]
pub struct HistorySeeds;

impl SeedStrategy for HistorySeeds {
    fn name(&self) -> &'static str {
        "history"
    }

    fn applies(&self, pool_len: usize, config: &AcquisitionConfig) -> bool {
        pool_len < config.genre_goal
    }

    fn goal(&self, config: &AcquisitionConfig) -> usize {
        config.history_goal
    }

    fn seed_sets(&self, catalog: &dyn Catalog, session: &Session) -> anyhow::Result<Vec<SeedSet>> {
        let recent = catalog.recently_played(session)?;

        let mut ids: Vec<String> = Vec::new();
        for track in recent.into_iter().take(RECENT_TRACK_WINDOW) {
            if !ids.contains(&track.id) {
                ids.push(track.id);
            }
            if ids.len() == MAX_HISTORY_SEEDS {
                break;
            }
        }

        Ok(ids.chunks(2).map(SeedSet::from_tracks).collect())
    }
}

/// Fixed broad genres, one per query.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSeeds;

impl SeedStrategy for GenericSeeds {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn applies(&self, pool_len: usize, config: &AcquisitionConfig) -> bool {
        pool_len < config.generic_goal
    }

    fn goal(&self, config: &AcquisitionConfig) -> usize {
        config.generic_goal
    }

    fn seed_sets(
        &self,
        _catalog: &dyn Catalog,
        _session: &Session,
    ) -> anyhow::Result<Vec<SeedSet>> {
        Ok(GENERIC_GENRES.iter().map(|g| SeedSet::from_genres(&[g])).collect())
    }
}

/// Query for `seeds` constrained to a band around every target feature.
/// Popularity only gets a target, never a band.
#[must_use]
pub fn build_query(
    seeds: SeedSet,
    target: &FeatureVector,
    config: &AcquisitionConfig,
) -> RecommendationQuery {
    let mut query = RecommendationQuery::new(seeds, config.query_limit);
    for (feature, value) in target.iter() {
        query.target.set(feature, value);
        let band = match feature {
            Feature::Popularity => continue,
            Feature::Tempo => config.tempo_band,
            _ => config.feature_band,
        };
        query.min.set(feature, value - band);
        query.max.set(feature, value + band);
    }
    query
}

/// Outcome of acquisition.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub tracks: Vec<Track>,
    pub used_fallback: bool,
}

/// Runs every tier against `catalog` and returns the merged candidates, or
/// the fallback list if nothing came back at all.
#[must_use]
pub fn acquire_candidates(
    catalog: &dyn Catalog,
    session: &Session,
    target: &FeatureVector,
    config: &AcquisitionConfig,
) -> Acquisition {
    let strategies: [&dyn SeedStrategy; 3] = [&GenreSeeds, &HistorySeeds, &GenericSeeds];
    let mut pool = CandidatePool::new();

    for strategy in strategies {
        if !strategy.applies(pool.len(), config) {
            debug!("Skipping {} tier with {} candidates", strategy.name(), pool.len());
            continue;
        }
        run_strategy(strategy, catalog, session, target, config, &mut pool);
    }

    if pool.is_empty() {
        warn!("No candidates from any seed strategy, using fallback tracks");
        return Acquisition {
            tracks: fallback_tracks(),
            used_fallback: true,
        };
    }

    info!("Acquired {} unique candidates", pool.len());
    Acquisition {
        tracks: pool.into_tracks(),
        used_fallback: false,
    }
}

fn run_strategy(
    strategy: &dyn SeedStrategy,
    catalog: &dyn Catalog,
    session: &Session,
    target: &FeatureVector,
    config: &AcquisitionConfig,
    pool: &mut CandidatePool,
) {
    let seed_sets = match strategy.seed_sets(catalog, session) {
        Ok(seed_sets) => seed_sets,
        Err(e) => {
            warn!("{} tier: could not derive seeds: {e:#}", strategy.name());
            return;
        }
    };

    let goal = strategy.goal(config);
    for seeds in seed_sets {
        if pool.len() >= goal {
            break;
        }
        if let Err(e) = seeds.validate() {
            warn!("{} tier: skipping query: {e}", strategy.name());
            continue;
        }

        let query = build_query(seeds, target, config);
        match catalog.recommendations(session, &query) {
            Ok(tracks) => {
                let added = pool.merge(tracks);
                debug!(
                    "{} tier: {:?} added {added} tracks ({} total)",
                    strategy.name(),
                    query.seeds,
                    pool.len()
                );
            }
            Err(e) => warn!("{} tier: recommendation query failed: {e:#}", strategy.name()),
        }
    }
}
