//! Playlist generation, end to end.
//!
//! [`PlaylistGenerator::generate`] is the outermost boundary: whatever goes
//! wrong inside, the caller gets a [`PlaylistResponse`], never an `Err`.

use crate::acquisition::{self, AcquisitionConfig};
use crate::algorithm::{self, statistics, ScoredTrack, SelectionConfig};
use crate::catalog::{Catalog, PlaylistSink, Session, Track, MAX_TRACKS_PER_ADD};
use crate::features::FeatureVector;
use crate::mood::Emotion;
use crate::sequencer::{self, Activity};
use crate::target::{build_target, TargetRequest};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

/// One playlist request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistRequest {
    pub mood: String,
    /// Overrides `mood` when present.
    pub custom_mood: Option<String>,
    pub goal: String,
    pub context: Option<String>,
    pub heart_rate: Option<u32>,
    pub activity: Option<String>,
    pub transition_to: Option<String>,
    pub length: Option<usize>,
    pub max_per_artist: Option<usize>,
}

impl Default for PlaylistRequest {
    fn default() -> Self {
        Self {
            mood: Emotion::Neutral.name().to_string(),
            custom_mood: None,
            goal: "stay_same".to_string(),
            context: None,
            heart_rate: None,
            activity: None,
            transition_to: None,
            length: None,
            max_per_artist: None,
        }
    }
}

impl PlaylistRequest {
    #[must_use]
    pub fn new(mood: &str, goal: &str) -> Self {
        Self {
            mood: mood.to_string(),
            goal: goal.to_string(),
            ..Self::default()
        }
    }
}

/// A playlist track and its score; unscored when the track had no features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub score: Option<f64>,
    #[serde(flatten)]
    pub track: Track,
}

impl AsRef<Track> for PlaylistEntry {
    fn as_ref(&self) -> &Track {
        &self.track
    }
}

impl From<ScoredTrack> for PlaylistEntry {
    fn from(scored: ScoredTrack) -> Self {
        Self {
            score: Some(scored.score),
            track: scored.track,
        }
    }
}

impl From<Track> for PlaylistEntry {
    fn from(track: Track) -> Self {
        Self { score: None, track }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaylistResponse {
    Ok {
        mood: Emotion,
        goal: String,
        context: Option<String>,
        target: FeatureVector,
        used_fallback: bool,
        tracks: Vec<PlaylistEntry>,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl PlaylistResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, PlaylistResponse::Ok { .. })
    }

    #[must_use]
    pub fn tracks(&self) -> &[PlaylistEntry] {
        match self {
            PlaylistResponse::Ok { tracks, .. } => tracks,
            PlaylistResponse::Error { .. } => &[],
        }
    }
}

/// Runs target building, acquisition, scoring, selection and sequencing
/// against one catalog.
pub struct PlaylistGenerator<'a> {
    catalog: &'a dyn Catalog,
    acquisition: AcquisitionConfig,
    selection: SelectionConfig,
}

impl<'a> PlaylistGenerator<'a> {
    #[must_use]
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self {
            catalog,
            acquisition: AcquisitionConfig::default(),
            selection: SelectionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(
        mut self,
        acquisition: AcquisitionConfig,
        selection: SelectionConfig,
    ) -> Self {
        self.acquisition = acquisition;
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn generate(&self, session: &Session, request: &PlaylistRequest) -> PlaylistResponse {
        match self.try_generate(session, request) {
            Ok(response) => response,
            Err(e) => {
                error!("Playlist generation failed: {e:#}");
                PlaylistResponse::Error {
                    message: format!("{e:#}"),
                }
            }
        }
    }

    fn try_generate(
        &self,
        session: &Session,
        request: &PlaylistRequest,
    ) -> Result<PlaylistResponse> {
        if session.is_expired(Utc::now()) {
            bail!("Session for user {} has expired", session.user_id);
        }

        let label = request.custom_mood.as_deref().unwrap_or(&request.mood);
        let emotion: Emotion = label.parse()?;
        let activity = request.activity.as_deref().map(str::parse::<Activity>).transpose()?;
        let end_emotion = request
            .transition_to
            .as_deref()
            .map(str::parse::<Emotion>)
            .transpose()?;

        let mut target_request = TargetRequest::new(emotion, &request.goal);
        target_request.context.clone_from(&request.context);
        target_request.heart_rate = request.heart_rate;
        let target = build_target(&target_request);

        let length = request.length.unwrap_or(self.selection.playlist_length).max(1);
        let max_per_artist = request.max_per_artist.unwrap_or(self.selection.max_per_artist);

        let acquired =
            acquisition::acquire_candidates(self.catalog, session, &target, &self.acquisition);
        let tracks: Vec<PlaylistEntry> = if acquired.used_fallback {
            acquired.tracks.into_iter().map(PlaylistEntry::from).collect()
        } else {
            let selected = self.select(
                session,
                acquired.tracks,
                &target,
                emotion,
                length,
                max_per_artist,
            );
            let ordered = match end_emotion {
                Some(end) => {
                    let mut end_request = TargetRequest::new(end, "stay_same");
                    end_request.context.clone_from(&request.context);
                    sequencer::transition_order(selected, &target, &build_target(&end_request))
                }
                None if activity.is_none() => sequencer::single_mood_order(selected),
                None => selected,
            };
            match activity {
                Some(activity) => sequencer::filter_for_activity(ordered, activity),
                None => ordered,
            }
        };

        info!(
            "Generated {} track playlist for {emotion} / {}",
            tracks.len(),
            request.goal
        );
        Ok(PlaylistResponse::Ok {
            mood: emotion,
            goal: request.goal.clone(),
            context: request.context.clone(),
            target,
            used_fallback: acquired.used_fallback,
            tracks,
            timestamp: Utc::now(),
        })
    }

    fn select(
        &self,
        session: &Session,
        mut candidates: Vec<Track>,
        target: &FeatureVector,
        emotion: Emotion,
        length: usize,
        max_per_artist: usize,
    ) -> Vec<PlaylistEntry> {
        algorithm::enrich_audio_features(
            self.catalog,
            session,
            &mut candidates,
            self.selection.audio_feature_chunk,
        );

        let scoring = &self.selection.scoring;
        let unscored = candidates.clone();
        let mut scored = algorithm::score_tracks(candidates, target, scoring);

        if scored.is_empty() {
            info!("No candidate carries audio features, returning them unscored");
            return unscored.into_iter().take(length).map(PlaylistEntry::from).collect();
        }

        debug!(
            "Score distribution: {:?}",
            statistics::analyze_score_distribution(&scored)
        );
        algorithm::apply_mood_tie_break(&mut scored, emotion, scoring.tie_resolution);

        algorithm::diversify(scored, max_per_artist)
            .into_iter()
            .take(length)
            .map(PlaylistEntry::from)
            .collect()
    }
}

/// Creates a playlist and adds the tracks in batches the sink accepts.
/// Returns the new playlist id.
pub fn publish_playlist<T: AsRef<Track>>(
    sink: &mut dyn PlaylistSink,
    session: &Session,
    name: &str,
    description: &str,
    tracks: &[T],
    public: bool,
) -> Result<String> {
    let playlist_id = sink
        .create_playlist(session, name, description, public)
        .with_context(|| format!("Failed to create playlist `{name}'"))?;

    let uris: Vec<String> = tracks.iter().map(|t| t.as_ref().uri.clone()).collect();
    for batch in uris.chunks(MAX_TRACKS_PER_ADD) {
        sink.add_tracks(session, &playlist_id, batch)
            .with_context(|| format!("Failed to add tracks to playlist {playlist_id}"))?;
    }

    info!("Published playlist {playlist_id} with {} tracks", uris.len());
    Ok(playlist_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocalCatalog;
    use crate::features::Feature;

    fn empty_catalog() -> LocalCatalog {
        LocalCatalog::from_json("{}").unwrap()
    }

    #[test]
    fn test_unknown_mood_becomes_error_response() {
        let catalog = empty_catalog();
        let generator = PlaylistGenerator::new(&catalog);
        let request = PlaylistRequest::new("melancholic", "stay_same");
        let response = generator.generate(&Session::local("u"), &request);

        match response {
            PlaylistResponse::Error { message } => {
                assert!(message.contains("melancholic"));
                assert!(message.contains("happy, sad"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_activity_becomes_error_response() {
        let catalog = empty_catalog();
        let request = PlaylistRequest {
            activity: Some("juggling".into()),
            ..PlaylistRequest::new("happy", "stay_same")
        };
        let response = PlaylistGenerator::new(&catalog).generate(&Session::local("u"), &request);
        assert!(!response.is_ok());
    }

    #[test]
    fn test_expired_session_rejected() {
        let catalog = empty_catalog();
        let session = Session::new("t", "u", Utc::now() - chrono::Duration::seconds(1));
        let request = PlaylistRequest::new("happy", "stay_same");
        let response = PlaylistGenerator::new(&catalog).generate(&session, &request);
        assert!(!response.is_ok());
    }

    #[test]
    fn test_empty_catalog_yields_fallback_verbatim() {
        let catalog = empty_catalog();
        let request = PlaylistRequest::new("happy", "stay_same");
        let response = PlaylistGenerator::new(&catalog).generate(&Session::local("u"), &request);

        let PlaylistResponse::Ok {
            used_fallback,
            tracks,
            target,
            ..
        } = response
        else {
            panic!("expected playlist");
        };
        assert!(used_fallback);
        let tracks: Vec<Track> = tracks.into_iter().map(|e| e.track).collect();
        assert_eq!(tracks, acquisition::fallback_tracks());
        assert_eq!(target.get(Feature::Valence), Some(0.8));
    }

    #[test]
    fn test_custom_mood_overrides_mood() {
        let catalog = empty_catalog();
        let request = PlaylistRequest {
            custom_mood: Some("sad".into()),
            ..PlaylistRequest::new("happy", "increase_energy")
        };
        let response = PlaylistGenerator::new(&catalog).generate(&Session::local("u"), &request);
        let PlaylistResponse::Ok { mood, target, .. } = response else {
            panic!("expected playlist");
        };
        assert_eq!(mood, Emotion::Sad);
        assert!((target.get(Feature::Energy).unwrap() - 0.6).abs() < 1e-9);
    }

    #[derive(Default)]
    struct RecordingSink {
        created: Vec<(String, bool)>,
        batches: Vec<usize>,
    }

    impl PlaylistSink for RecordingSink {
        fn create_playlist(
            &mut self,
            _: &Session,
            name: &str,
            _: &str,
            public: bool,
        ) -> Result<String> {
            self.created.push((name.to_string(), public));
            Ok("pl-1".to_string())
        }

        fn add_tracks(&mut self, _: &Session, playlist_id: &str, uris: &[String]) -> Result<()> {
            assert_eq!(playlist_id, "pl-1");
            self.batches.push(uris.len());
            Ok(())
        }
    }

    #[test]
    fn test_publish_batches_by_hundred() {
        let tracks: Vec<Track> = (0..230)
            .map(|i| Track::new(&i.to_string(), "t", "a", "b"))
            .collect();
        let mut sink = RecordingSink::default();

        let session = Session::local("u");
        let id =
            publish_playlist(&mut sink, &session, "Mood Mix", "happy", &tracks, false).unwrap();

        assert_eq!(id, "pl-1");
        assert_eq!(sink.created, vec![("Mood Mix".to_string(), false)]);
        assert_eq!(sink.batches, vec![100, 100, 30]);
    }
}
