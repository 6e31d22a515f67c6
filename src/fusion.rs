//! # Emotion Fusion
//!
//! Combines the face classifier's output with an optional heart-rate reading
//! into one [`EmotionAssessment`].
//!
//! ## Rules
//!
//! - A confident face reading (top score ≥ `confidence_threshold`) is trusted
//!   and the heart rate is ignored for label selection.
//! - A hesitant reading paired with high arousal (BPM above `high_arousal_bpm`)
//!   while the face looks calm (`neutral`, `sad`, `contempt`) becomes
//!   `excitement` above `excitement_bpm`, otherwise `stress`.
//! - A hesitant reading paired with low arousal (BPM below `low_arousal_bpm`)
//!   while the face looks agitated (`angry`, `fearful`, `surprised`) becomes
//!   `neutral`.
//! - When the classifier fails outright, the label comes from fixed BPM bands.
//!
//! The thresholds are plain constants; they are not derived from the user's
//! calibrated resting heart rate.

use crate::features::FeatureVector;
use crate::heart_rate::HeartRateSource;
use crate::mood::{self, Emotion};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw result of the face classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    /// Top label in the classifier's own vocabulary.
    pub label: String,
    /// Score of the top label, 0–1.
    pub confidence: f64,
    /// Scores for every label the classifier knows.
    #[serde(default)]
    pub distribution: BTreeMap<String, f64>,
}

impl ClassifierOutput {
    /// Builds an output from a score distribution, picking the highest score
    /// as the top label. Returns `None` for an empty distribution.
    #[must_use]
    pub fn from_distribution(distribution: BTreeMap<String, f64>) -> Option<Self> {
        let (label, confidence) = distribution
            .iter()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, &score)| (label.clone(), score))?;
        Some(Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            distribution,
        })
    }
}

/// Face-emotion classifier collaborator.
pub trait EmotionClassifier {
    /// Classify a single encoded image.
    ///
    /// # Errors
    ///
    /// Returns an error when no face is found or the service is unreachable.
    fn classify(&self, image: &[u8]) -> Result<ClassifierOutput>;
}

/// Camera collaborator: one encoded frame per call, `None` if capture failed.
pub trait ImageSource {
    fn capture_image(&mut self) -> Option<Vec<u8>>;
}

/// Thresholds used by [`fuse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub confidence_threshold: f64,
    pub high_arousal_bpm: u32,
    pub excitement_bpm: u32,
    pub low_arousal_bpm: u32,
    /// Heart-rate-only bands: above `excitement` → excitement, at or above
    /// `stress` → stress, at or above `neutral` → neutral, below → relaxed.
    pub bands: HeartRateBands,
    /// Confidence reported when the label came from heart rate alone.
    pub heart_rate_only_confidence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeartRateBands {
    pub excitement: u32,
    pub stress: u32,
    pub neutral: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            high_arousal_bpm: 110,
            excitement_bpm: 120,
            low_arousal_bpm: 70,
            bands: HeartRateBands {
                excitement: 110,
                stress: 90,
                neutral: 70,
            },
            heart_rate_only_confidence: 0.5,
        }
    }
}

/// One fused emotion reading. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAssessment {
    pub primary_emotion: Emotion,
    /// Classifier's top label as reported, or `"unknown"`.
    pub face_emotion: String,
    pub confidence: f64,
    #[serde(default)]
    pub secondary_emotions: BTreeMap<String, f64>,
    pub heart_rate: Option<u32>,
    pub timestamp: DateTime<Utc>,
    /// Base profile of `primary_emotion`.
    pub features: FeatureVector,
}

/// Label suggested by heart rate alone.
#[must_use]
pub fn emotion_from_heart_rate(bpm: u32, bands: &HeartRateBands) -> Emotion {
    match bpm {
        b if b > bands.excitement => Emotion::Excitement,
        b if b >= bands.stress => Emotion::Stress,
        b if b >= bands.neutral => Emotion::Neutral,
        _ => Emotion::Relaxed,
    }
}

/// Fuses a classifier result (or failure) with an optional BPM.
///
/// Pure apart from stamping the current time.
#[must_use]
pub fn fuse(
    classification: Option<&ClassifierOutput>,
    heart_rate: Option<u32>,
    config: &FusionConfig,
) -> EmotionAssessment {
    let (primary_emotion, face_emotion, confidence, secondary_emotions) = match classification {
        Some(output) => {
            let face = Emotion::resolve(&output.label);
            let primary = adjust_for_arousal(face, output.confidence, heart_rate, config);
            let secondary = output
                .distribution
                .iter()
                .filter(|(label, _)| **label != output.label)
                .map(|(label, &score)| (label.clone(), score))
                .collect();
            (primary, output.label.clone(), output.confidence, secondary)
        }
        None => {
            let primary = heart_rate
                .map(|bpm| emotion_from_heart_rate(bpm, &config.bands))
                .unwrap_or(Emotion::Neutral);
            let confidence = if heart_rate.is_some() {
                config.heart_rate_only_confidence
            } else {
                0.0
            };
            (primary, "unknown".to_string(), confidence, BTreeMap::new())
        }
    };

    EmotionAssessment {
        primary_emotion,
        face_emotion,
        confidence,
        secondary_emotions,
        heart_rate,
        timestamp: Utc::now(),
        features: mood::mood_profile(primary_emotion),
    }
}

fn adjust_for_arousal(
    face: Emotion,
    confidence: f64,
    heart_rate: Option<u32>,
    config: &FusionConfig,
) -> Emotion {
    let Some(bpm) = heart_rate else {
        return face;
    };
    if confidence >= config.confidence_threshold {
        return face;
    }

    let looks_calm = matches!(face, Emotion::Neutral | Emotion::Sad | Emotion::Contempt);
    let looks_agitated = matches!(face, Emotion::Angry | Emotion::Fearful | Emotion::Surprised);

    if bpm > config.high_arousal_bpm && looks_calm {
        let fused = if bpm > config.excitement_bpm {
            Emotion::Excitement
        } else {
            Emotion::Stress
        };
        debug!("Face reads {face} at {confidence:.2} but heart rate is {bpm}; using {fused}");
        fused
    } else if bpm < config.low_arousal_bpm && looks_agitated {
        debug!("Face reads {face} at {confidence:.2} but heart rate is {bpm}; using neutral");
        Emotion::Neutral
    } else {
        face
    }
}

/// Captures a frame, classifies it, reads the heart rate and fuses the two.
///
/// Capture or classifier failures are logged and handled as "no face".
pub fn detect_emotion(
    camera: &mut dyn ImageSource,
    classifier: &dyn EmotionClassifier,
    heart_rate: &mut dyn HeartRateSource,
    config: &FusionConfig,
) -> EmotionAssessment {
    let classification = match camera.capture_image() {
        Some(image) => match classifier.classify(&image) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("Emotion classification failed: {e:#}");
                None
            }
        },
        None => {
            warn!("No image captured, falling back to heart rate");
            None
        }
    };

    let bpm = heart_rate.read_heart_rate();
    fuse(classification.as_ref(), bpm, config)
}
