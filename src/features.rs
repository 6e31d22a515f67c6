//! # Audio Feature Space
//!
//! The common currency between emotions and music. Every mood, goal and
//! activity is expressed as a point (or a displacement) in this space, and
//! every catalog track is described by the same coordinates.
//!
//! ## Ranges
//!
//! - `tempo`: beats per minute, clamped to 40–200
//! - `popularity`: catalog popularity, clamped to 0–100
//! - everything else: normalized to 0.0–1.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single audio descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Energy,
    Valence,
    Danceability,
    Instrumentalness,
    Acousticness,
    Speechiness,
    Liveness,
    Mode,
    Tempo,
    Popularity,
}

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::Energy,
        Feature::Valence,
        Feature::Danceability,
        Feature::Instrumentalness,
        Feature::Acousticness,
        Feature::Speechiness,
        Feature::Liveness,
        Feature::Mode,
        Feature::Tempo,
        Feature::Popularity,
    ];

    /// Inclusive valid range `(min, max)` for this feature.
    #[must_use]
    pub const fn range(self) -> (f64, f64) {
        match self {
            Feature::Tempo => (40.0, 200.0),
            Feature::Popularity => (0.0, 100.0),
            _ => (0.0, 1.0),
        }
    }

    /// Width of the valid range, used to put features on a common scale.
    #[must_use]
    pub fn span(self) -> f64 {
        let (min, max) = self.range();
        max - min
    }

    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Name used by the catalog for `target_*`/`min_*`/`max_*` parameters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Energy => "energy",
            Feature::Valence => "valence",
            Feature::Danceability => "danceability",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Acousticness => "acousticness",
            Feature::Speechiness => "speechiness",
            Feature::Liveness => "liveness",
            Feature::Mode => "mode",
            Feature::Tempo => "tempo",
            Feature::Popularity => "popularity",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown audio feature: {s}"))
    }
}

/// Sparse mapping from feature to value.
///
/// Backed by an ordered map so iteration, serialization and every score
/// derived from it are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<Feature, f64>);

impl FeatureVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from `(feature, value)` pairs, clamping each value.
    #[must_use]
    pub fn from_pairs(pairs: &[(Feature, f64)]) -> Self {
        let mut vector = Self::new();
        for &(feature, value) in pairs {
            vector.set(feature, value);
        }
        vector
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.0.get(&feature).copied()
    }

    /// Stores `value` clamped to the feature's range.
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0.insert(feature, feature.clamp(value));
    }

    #[must_use]
    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains_key(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(&feature, &value)| (feature, value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every stored value lies inside its feature's range.
    #[must_use]
    pub fn is_clamped(&self) -> bool {
        self.iter().all(|(feature, value)| {
            let (min, max) = feature.range();
            (min..=max).contains(&value)
        })
    }

    /// Sum of per-feature absolute differences over features present in both
    /// vectors, each difference scaled by its feature's span so tempo and
    /// popularity do not dominate the 0–1 features.
    #[must_use]
    pub fn normalized_distance(&self, other: &FeatureVector) -> f64 {
        self.iter()
            .filter_map(|(feature, value)| {
                other
                    .get(feature)
                    .map(|theirs| (value - theirs).abs() / feature.span())
            })
            .sum()
    }
}

impl FromIterator<(Feature, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (Feature, f64)>>(iter: I) -> Self {
        let mut vector = Self::new();
        for (feature, value) in iter {
            vector.set(feature, value);
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps_to_feature_range() {
        let mut vector = FeatureVector::new();
        vector.set(Feature::Energy, 1.4);
        vector.set(Feature::Valence, -0.2);
        vector.set(Feature::Tempo, 250.0);
        vector.set(Feature::Popularity, 140.0);

        assert_eq!(vector.get(Feature::Energy), Some(1.0));
        assert_eq!(vector.get(Feature::Valence), Some(0.0));
        assert_eq!(vector.get(Feature::Tempo), Some(200.0));
        assert_eq!(vector.get(Feature::Popularity), Some(100.0));
        assert!(vector.is_clamped());
    }

    #[test]
    fn test_tempo_lower_bound() {
        let vector = FeatureVector::from_pairs(&[(Feature::Tempo, 12.0)]);
        assert_eq!(vector.get(Feature::Tempo), Some(40.0));
    }

    #[test]
    fn test_serializes_as_snake_case_map() {
        let vector = FeatureVector::from_pairs(&[(Feature::Energy, 0.5), (Feature::Tempo, 120.0)]);
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"energy":0.5,"tempo":120.0}"#);

        let parsed: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vector);
    }

    #[test]
    fn test_feature_from_str() {
        assert_eq!("Energy".parse::<Feature>().unwrap(), Feature::Energy);
        assert_eq!(" tempo ".parse::<Feature>().unwrap(), Feature::Tempo);
        assert!("loudness".parse::<Feature>().is_err());
    }

    #[test]
    fn test_normalized_distance_uses_shared_features_only() {
        let a = FeatureVector::from_pairs(&[
            (Feature::Energy, 0.2),
            (Feature::Tempo, 100.0),
            (Feature::Acousticness, 0.9),
        ]);
        let b = FeatureVector::from_pairs(&[(Feature::Energy, 0.6), (Feature::Tempo, 140.0)]);

        let distance = a.normalized_distance(&b);
        assert!((distance - (0.4 + 40.0 / 160.0)).abs() < 1e-9);
        assert_eq!(a.normalized_distance(&a), 0.0);
    }
}
