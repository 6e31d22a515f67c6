//! Target parameter builder.
//!
//! Turns a resolved emotion, a listener goal and an optional activity into
//! the single [`FeatureVector`] the rest of the pipeline tries to approximate.
//!
//! Order of application:
//!
//! 1. copy of the emotion's [`mood_profile`]
//! 2. goal adjustments
//! 3. heart-rate energy nudge (when a BPM is supplied)
//! 4. activity adjustments, which therefore have the final say
//!
//! Unknown goal or activity labels are ignored rather than rejected.

use crate::features::{Feature, FeatureVector};
use crate::mood::{self, Adjustment, AdjustmentKind, Emotion};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// BPM at which the heart-rate nudge starts to contribute.
pub const HEART_RATE_BOOST_FLOOR: u32 = 60;
/// Largest energy increase the heart-rate nudge may add.
pub const HEART_RATE_BOOST_CAP: f64 = 0.2;

/// Inputs for one target computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRequest {
    pub emotion: Emotion,
    pub goal: String,
    pub context: Option<String>,
    pub heart_rate: Option<u32>,
}

impl TargetRequest {
    #[must_use]
    pub fn new(emotion: Emotion, goal: &str) -> Self {
        Self {
            emotion,
            goal: goal.to_string(),
            context: None,
            heart_rate: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    #[must_use]
    pub fn with_heart_rate(mut self, bpm: u32) -> Self {
        self.heart_rate = Some(bpm);
        self
    }
}

/// Builds the finalized target vector. Deterministic, and every value in the
/// result lies within its feature's range.
#[must_use]
pub fn build_target(request: &TargetRequest) -> FeatureVector {
    let mut target = mood::mood_profile(request.emotion);

    match mood::goal_adjustments(&request.goal) {
        Some(adjustments) => apply_adjustments(&mut target, adjustments),
        None => debug!("Ignoring unknown goal `{}'", request.goal),
    }

    if let Some(bpm) = request.heart_rate {
        apply_heart_rate_boost(&mut target, bpm);
    }

    if let Some(context) = request.context.as_deref() {
        match mood::context_adjustments(context) {
            Some(adjustments) => apply_adjustments(&mut target, adjustments),
            None => debug!("Ignoring unknown context `{context}'"),
        }
    }

    trace!("Target for {}: {target:?}", request.emotion);
    target
}

/// Applies adjustments in table order.
///
/// A delta on a feature the vector does not carry is skipped; an absolute
/// entry always assigns.
pub fn apply_adjustments(target: &mut FeatureVector, adjustments: &[Adjustment]) {
    for adjustment in adjustments {
        match adjustment.kind {
            AdjustmentKind::Delta(delta) => {
                if let Some(current) = target.get(adjustment.feature) {
                    target.set(adjustment.feature, current + delta);
                }
            }
            AdjustmentKind::Absolute(value) => target.set(adjustment.feature, value),
        }
    }
}

/// Energy contribution implied by a heart rate: `(bpm - 60) / 100`, never
/// negative and never above [`HEART_RATE_BOOST_CAP`].
#[must_use]
pub fn heart_rate_boost(bpm: u32) -> f64 {
    let excess = f64::from(bpm.saturating_sub(HEART_RATE_BOOST_FLOOR));
    (excess / 100.0).min(HEART_RATE_BOOST_CAP)
}

fn apply_heart_rate_boost(target: &mut FeatureVector, bpm: u32) {
    let boost = heart_rate_boost(bpm);
    if boost > 0.0 {
        if let Some(energy) = target.get(Feature::Energy) {
            target.set(Feature::Energy, energy + boost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_stay_same_is_identity() {
        for emotion in Emotion::ALL {
            for goal in ["stay_same", "maintain"] {
                let target = build_target(&TargetRequest::new(emotion, goal));
                assert_eq!(target, mood::mood_profile(emotion), "{emotion} / {goal}");
            }
        }
    }

    #[test]
    fn test_sad_increase_energy() {
        let target = build_target(&TargetRequest::new(Emotion::Sad, "increase_energy"));
        assert!(close(target.get(Feature::Energy), 0.6));
        assert!(close(target.get(Feature::Valence), 0.4));
        assert!(close(target.get(Feature::Instrumentalness), 0.4));
    }

    #[test]
    fn test_all_combinations_stay_in_range() {
        let contexts: Vec<Option<&str>> = std::iter::once(None)
            .chain(mood::known_contexts().into_iter().map(Some))
            .collect();

        for emotion in Emotion::ALL {
            for goal in mood::known_goals() {
                for context in &contexts {
                    for bpm in [None, Some(45), Some(180)] {
                        let request = TargetRequest {
                            emotion,
                            goal: goal.to_string(),
                            context: context.map(str::to_string),
                            heart_rate: bpm,
                        };
                        let target = build_target(&request);
                        assert!(target.is_clamped(), "{request:?} -> {target:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let request =
            TargetRequest::new(Emotion::Happy, "become_a_wizard").with_context("skydiving");
        assert_eq!(build_target(&request), mood::mood_profile(Emotion::Happy));
    }

    #[test]
    fn test_context_applies_after_goal() {
        // elevate pushes energy to 1.0, sleeping pins it back down
        let request = TargetRequest::new(Emotion::Energetic, "elevate").with_context("sleeping");
        let target = build_target(&request);
        assert!(close(target.get(Feature::Energy), 0.15));
        assert!(close(target.get(Feature::Tempo), 60.0));
    }

    #[test]
    fn test_absolute_entry_introduces_feature() {
        let target = build_target(&TargetRequest::new(Emotion::Happy, "calm"));
        assert!(close(target.get(Feature::Acousticness), 0.6));
    }

    #[test]
    fn test_delta_on_missing_feature_is_skipped() {
        // happy carries no tempo, so energize's tempo delta has nothing to move
        let target = build_target(&TargetRequest::new(Emotion::Happy, "energize"));
        assert!(target.get(Feature::Tempo).is_none());
        assert!(close(target.get(Feature::Energy), 1.0));

        let energetic = build_target(&TargetRequest::new(Emotion::Energetic, "energize"));
        assert!(close(energetic.get(Feature::Tempo), 150.0));
    }

    #[test]
    fn test_heart_rate_boost_is_capped() {
        assert_eq!(heart_rate_boost(50), 0.0);
        assert_eq!(heart_rate_boost(60), 0.0);
        assert!((heart_rate_boost(70) - 0.1).abs() < 1e-9);
        assert_eq!(heart_rate_boost(200), HEART_RATE_BOOST_CAP);

        let request = TargetRequest::new(Emotion::Sad, "stay_same").with_heart_rate(75);
        assert!(close(build_target(&request).get(Feature::Energy), 0.55));
    }

    #[test]
    fn test_deterministic() {
        let request = TargetRequest::new(Emotion::Angry, "reduce")
            .with_context("working")
            .with_heart_rate(95);
        assert_eq!(build_target(&request), build_target(&request));
    }
}
