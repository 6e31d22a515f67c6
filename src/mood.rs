//! # Mood Tables
//!
//! Static lookup tables that anchor emotions, listener goals and activities in
//! the audio feature space:
//!
//! - [`mood_profile`]: emotion → base [`FeatureVector`]
//! - [`goal_adjustments`]: goal label → sparse list of [`Adjustment`]s
//! - [`context_adjustments`]: activity label → sparse list of [`Adjustment`]s
//!
//! Every adjustment carries an explicit [`AdjustmentKind`]. A delta is added
//! to the current value; an absolute entry replaces it (or introduces the
//! feature when the base profile lacks it). The sign of a value never decides
//! which of the two applies.

use crate::error::MoodError;
use crate::features::{Feature, FeatureVector};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Closed set of emotion labels the system can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Relaxed,
    Energetic,
    Focused,
    Calm,
    Neutral,
    Surprised,
    Fearful,
    Disgusted,
    Contempt,
    Excitement,
    Stress,
}

impl Emotion {
    pub const ALL: [Emotion; 14] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Relaxed,
        Emotion::Energetic,
        Emotion::Focused,
        Emotion::Calm,
        Emotion::Neutral,
        Emotion::Surprised,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Contempt,
        Emotion::Excitement,
        Emotion::Stress,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Relaxed => "relaxed",
            Emotion::Energetic => "energetic",
            Emotion::Focused => "focused",
            Emotion::Calm => "calm",
            Emotion::Neutral => "neutral",
            Emotion::Surprised => "surprised",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Contempt => "contempt",
            Emotion::Excitement => "excitement",
            Emotion::Stress => "stress",
        }
    }

    /// Parses a label, accepting the face classifier's vocabulary
    /// (`happiness`, `anger`, `fear`, ...) as aliases.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Emotion> {
        let emotion = match label.trim().to_ascii_lowercase().as_str() {
            "happy" | "happiness" => Emotion::Happy,
            "sad" | "sadness" => Emotion::Sad,
            "angry" | "anger" => Emotion::Angry,
            "relaxed" => Emotion::Relaxed,
            "energetic" => Emotion::Energetic,
            "focused" => Emotion::Focused,
            "calm" => Emotion::Calm,
            "neutral" => Emotion::Neutral,
            "surprised" | "surprise" => Emotion::Surprised,
            "fearful" | "fear" => Emotion::Fearful,
            "disgusted" | "disgust" => Emotion::Disgusted,
            "contempt" => Emotion::Contempt,
            "excitement" | "excited" => Emotion::Excitement,
            "stress" | "stressed" => Emotion::Stress,
            _ => return None,
        };
        Some(emotion)
    }

    /// Lenient lookup: anything unrecognised becomes [`Emotion::Neutral`].
    #[must_use]
    pub fn resolve(label: &str) -> Emotion {
        Self::from_label(label).unwrap_or_else(|| {
            log::debug!("Unknown emotion label `{label}', resolving to neutral");
            Emotion::Neutral
        })
    }

    /// Comma-separated list of every label, for error messages.
    #[must_use]
    pub fn supported() -> String {
        Emotion::ALL.map(Emotion::name).join(", ")
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = MoodError;

    /// Strict parse used for user-supplied moods.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::from_label(s).ok_or_else(|| MoodError::UnknownMood {
            given: s.to_string(),
            supported: Emotion::supported(),
        })
    }
}

/// How an adjustment table entry is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentKind {
    /// Added to the current value, then clamped.
    Delta(f64),
    /// Replaces the current value, then clamped.
    Absolute(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub feature: Feature,
    pub kind: AdjustmentKind,
}

const fn delta(feature: Feature, value: f64) -> Adjustment {
    Adjustment {
        feature,
        kind: AdjustmentKind::Delta(value),
    }
}

const fn absolute(feature: Feature, value: f64) -> Adjustment {
    Adjustment {
        feature,
        kind: AdjustmentKind::Absolute(value),
    }
}

use Feature::{Acousticness, Danceability, Energy, Instrumentalness, Tempo, Valence};

lazy_static! {
    static ref MOOD_PROFILES: HashMap<Emotion, FeatureVector> = {
        let mut m = HashMap::new();
        m.insert(Emotion::Happy, FeatureVector::from_pairs(&[(Energy, 0.7), (Valence, 0.8), (Instrumentalness, 0.2)]));
        m.insert(Emotion::Sad, FeatureVector::from_pairs(&[(Energy, 0.4), (Valence, 0.3), (Instrumentalness, 0.4)]));
        m.insert(Emotion::Angry, FeatureVector::from_pairs(&[(Energy, 0.8), (Valence, 0.3), (Instrumentalness, 0.2), (Tempo, 125.0)]));
        m.insert(Emotion::Relaxed, FeatureVector::from_pairs(&[(Energy, 0.3), (Valence, 0.6), (Instrumentalness, 0.5)]));
        m.insert(Emotion::Energetic, FeatureVector::from_pairs(&[(Energy, 0.9), (Valence, 0.7), (Instrumentalness, 0.1), (Danceability, 0.7), (Tempo, 130.0)]));
        m.insert(Emotion::Focused, FeatureVector::from_pairs(&[(Energy, 0.5), (Valence, 0.5), (Instrumentalness, 0.7)]));
        m.insert(Emotion::Calm, FeatureVector::from_pairs(&[(Energy, 0.3), (Valence, 0.5), (Instrumentalness, 0.5), (Acousticness, 0.7)]));
        m.insert(Emotion::Neutral, FeatureVector::from_pairs(&[(Energy, 0.5), (Valence, 0.5), (Instrumentalness, 0.3), (Danceability, 0.5)]));
        m.insert(Emotion::Surprised, FeatureVector::from_pairs(&[(Energy, 0.7), (Valence, 0.6), (Instrumentalness, 0.2), (Acousticness, 0.3)]));
        m.insert(Emotion::Fearful, FeatureVector::from_pairs(&[(Energy, 0.3), (Valence, 0.2), (Instrumentalness, 0.4), (Acousticness, 0.6)]));
        m.insert(Emotion::Disgusted, FeatureVector::from_pairs(&[(Energy, 0.6), (Valence, 0.3), (Instrumentalness, 0.3), (Acousticness, 0.4)]));
        m.insert(Emotion::Contempt, FeatureVector::from_pairs(&[(Energy, 0.5), (Valence, 0.3), (Instrumentalness, 0.3), (Acousticness, 0.5)]));
        m.insert(Emotion::Excitement, FeatureVector::from_pairs(&[(Energy, 0.85), (Valence, 0.7), (Instrumentalness, 0.15), (Danceability, 0.75), (Tempo, 128.0)]));
        m.insert(Emotion::Stress, FeatureVector::from_pairs(&[(Energy, 0.6), (Valence, 0.35), (Instrumentalness, 0.4)]));
        m
    };

    static ref GOAL_ADJUSTMENTS: HashMap<&'static str, Vec<Adjustment>> = {
        let mut m = HashMap::new();
        m.insert("increase_energy", vec![delta(Energy, 0.2), delta(Valence, 0.1)]);
        m.insert("calm_down", vec![delta(Energy, -0.2), delta(Instrumentalness, 0.2)]);
        m.insert("stay_same", vec![]);
        m.insert("elevate", vec![delta(Energy, 0.3), delta(Valence, 0.3)]);
        m.insert("maintain", vec![]);
        m.insert("reduce", vec![delta(Energy, -0.2), delta(Valence, -0.2)]);
        m.insert("calm", vec![delta(Energy, -0.3), delta(Valence, 0.1), absolute(Acousticness, 0.6)]);
        m.insert("energize", vec![delta(Energy, 0.3), delta(Tempo, 20.0)]);
        m
    };

    static ref CONTEXT_ADJUSTMENTS: HashMap<&'static str, Vec<Adjustment>> = {
        let mut m = HashMap::new();
        m.insert("working", vec![delta(Energy, -0.1), delta(Instrumentalness, 0.3)]);
        m.insert("exercising", vec![delta(Energy, 0.3), delta(Instrumentalness, -0.2)]);
        m.insert("relaxing", vec![delta(Energy, -0.3), delta(Valence, 0.1), delta(Instrumentalness, 0.1)]);
        m.insert("studying", vec![delta(Energy, -0.1), delta(Valence, -0.1), absolute(Instrumentalness, 0.8)]);
        m.insert("socializing", vec![delta(Energy, 0.1), delta(Valence, 0.2)]);
        m.insert("sleeping", vec![absolute(Energy, 0.15), absolute(Acousticness, 0.8), absolute(Tempo, 60.0)]);
        m
    };
}

/// Base feature vector for `emotion`. Always present: the table covers the
/// whole [`Emotion`] enumeration.
#[must_use]
pub fn mood_profile(emotion: Emotion) -> FeatureVector {
    MOOD_PROFILES
        .get(&emotion)
        .or_else(|| MOOD_PROFILES.get(&Emotion::Neutral))
        .cloned()
        .unwrap_or_default()
}

/// Profile lookup by raw label; unknown labels use the neutral profile.
#[must_use]
pub fn mood_profile_for_label(label: &str) -> FeatureVector {
    mood_profile(Emotion::resolve(label))
}

/// Adjustments for a goal label, or `None` when the label is unknown.
#[must_use]
pub fn goal_adjustments(goal: &str) -> Option<&'static [Adjustment]> {
    GOAL_ADJUSTMENTS.get(goal.trim()).map(Vec::as_slice)
}

/// Adjustments for an activity label, or `None` when the label is unknown.
#[must_use]
pub fn context_adjustments(context: &str) -> Option<&'static [Adjustment]> {
    CONTEXT_ADJUSTMENTS.get(context.trim()).map(Vec::as_slice)
}

/// Sorted list of known goal labels.
#[must_use]
pub fn known_goals() -> Vec<&'static str> {
    let mut goals: Vec<_> = GOAL_ADJUSTMENTS.keys().copied().collect();
    goals.sort_unstable();
    goals
}

/// Sorted list of known activity labels.
#[must_use]
pub fn known_contexts() -> Vec<&'static str> {
    let mut contexts: Vec<_> = CONTEXT_ADJUSTMENTS.keys().copied().collect();
    contexts.sort_unstable();
    contexts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_emotion_has_a_profile() {
        for emotion in Emotion::ALL {
            let profile = mood_profile(emotion);
            assert!(profile.get(Energy).is_some(), "{emotion} lacks energy");
            assert!(profile.get(Valence).is_some(), "{emotion} lacks valence");
            assert!(profile.is_clamped());
        }
    }

    #[test]
    fn test_happy_profile_values() {
        let happy = mood_profile(Emotion::Happy);
        assert_eq!(happy.get(Energy), Some(0.7));
        assert_eq!(happy.get(Valence), Some(0.8));
        assert_eq!(happy.get(Instrumentalness), Some(0.2));
        assert_eq!(happy.len(), 3);
    }

    #[test]
    fn test_classifier_aliases() {
        assert_eq!(Emotion::from_label("happiness"), Some(Emotion::Happy));
        assert_eq!(Emotion::from_label("Sadness"), Some(Emotion::Sad));
        assert_eq!(Emotion::from_label("anger"), Some(Emotion::Angry));
        assert_eq!(Emotion::from_label("fear"), Some(Emotion::Fearful));
        assert_eq!(Emotion::from_label("surprise"), Some(Emotion::Surprised));
        assert_eq!(Emotion::from_label("disgust"), Some(Emotion::Disgusted));
        assert_eq!(Emotion::from_label("excited"), Some(Emotion::Excitement));
        assert_eq!(Emotion::from_label("bored"), None);
    }

    #[test]
    fn test_unknown_label_resolves_to_neutral_profile() {
        assert_eq!(Emotion::resolve("melancholic"), Emotion::Neutral);
        assert_eq!(mood_profile_for_label("melancholic"), mood_profile(Emotion::Neutral));
    }

    #[test]
    fn test_strict_parse_reports_supported_moods() {
        let err = "grumpy".parse::<Emotion>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("grumpy"));
        assert!(message.contains("happy"));
        assert!(message.contains("stress"));
    }

    #[test]
    fn test_identity_goals_are_empty() {
        assert_eq!(goal_adjustments("stay_same"), Some(&[][..]));
        assert_eq!(goal_adjustments("maintain"), Some(&[][..]));
        assert!(goal_adjustments("teleport").is_none());
    }

    #[test]
    fn test_studying_forces_instrumentalness() {
        let studying = context_adjustments("studying").unwrap();
        assert!(studying.contains(&Adjustment {
            feature: Instrumentalness,
            kind: AdjustmentKind::Absolute(0.8),
        }));
    }

    #[test]
    fn test_known_labels_sorted() {
        let goals = known_goals();
        assert!(goals.windows(2).all(|w| w[0] <= w[1]));
        assert!(goals.contains(&"increase_energy"));
        assert!(known_contexts().contains(&"sleeping"));
    }
}
