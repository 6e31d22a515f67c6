//! # Playlist Sequencer
//!
//! Final ordering of an already selected track list.
//!
//! - [`single_mood_order`]: quiet to loud by `energy + valence`
//! - [`transition_order`]: start-mood-like tracks first, end-mood-like last
//! - [`filter_for_activity`]: drop tracks outside an activity's thresholds,
//!   rank the rest, and never shrink the playlist below a viable size

use crate::catalog::Track;
use crate::error::MoodError;
use crate::features::{Feature, FeatureVector};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Smallest playlist the activity filter will leave behind.
pub const MIN_VIABLE_TRACKS: usize = 3;
/// Share of removed tracks above which the filter restores a third of the input.
pub const HEAVY_FILTER_RATIO: f64 = 0.7;

fn features_of<T: AsRef<Track>>(item: &T) -> Option<&FeatureVector> {
    item.as_ref().audio_features.as_ref()
}

fn value_or<T: AsRef<Track>>(item: &T, feature: Feature, default: f64) -> f64 {
    features_of(item).and_then(|f| f.get(feature)).unwrap_or(default)
}

/// Sorts by `energy + valence` ascending. Missing values count as 0.5.
#[must_use]
pub fn single_mood_order<T: AsRef<Track>>(mut items: Vec<T>) -> Vec<T> {
    let arc =
        |item: &T| value_or(item, Feature::Energy, 0.5) + value_or(item, Feature::Valence, 0.5);
    items.sort_by(|a, b| arc(a).total_cmp(&arc(b)));
    items
}

/// Where a track belongs between `start` (0.0) and `end` (1.0).
///
/// Computed as `d_start / (d_start + d_end)` over span-normalized feature
/// distances; 0.5 when both distances are zero or the track has no features.
#[must_use]
pub fn transition_position(
    features: Option<&FeatureVector>,
    start: &FeatureVector,
    end: &FeatureVector,
) -> f64 {
    let Some(features) = features else {
        return 0.5;
    };
    let to_start = features.normalized_distance(start);
    let to_end = features.normalized_distance(end);
    let total = to_start + to_end;
    if total > 0.0 {
        to_start / total
    } else {
        0.5
    }
}

/// Orders tracks along a linear path from the `start` target to the `end`
/// target.
#[must_use]
pub fn transition_order<T: AsRef<Track>>(
    items: Vec<T>,
    start: &FeatureVector,
    end: &FeatureVector,
) -> Vec<T> {
    let mut positioned: Vec<(f64, T)> = items
        .into_iter()
        .map(|item| (transition_position(features_of(&item), start, end), item))
        .collect();
    positioned.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    positioned.into_iter().map(|(_, item)| item).collect()
}

/// Listening activity used to post-filter a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Workout,
    Study,
    Relax,
    Focus,
    Party,
    Sleep,
    #[default]
    Default,
}

impl Activity {
    pub const ALL: [Activity; 7] = [
        Activity::Workout,
        Activity::Study,
        Activity::Relax,
        Activity::Focus,
        Activity::Party,
        Activity::Sleep,
        Activity::Default,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Activity::Workout => "workout",
            Activity::Study => "study",
            Activity::Relax => "relax",
            Activity::Focus => "focus",
            Activity::Party => "party",
            Activity::Sleep => "sleep",
            Activity::Default => "default",
        }
    }

    #[must_use]
    pub fn supported() -> String {
        Activity::ALL.map(Activity::name).join(", ")
    }

    /// Inclusive `(feature, min, max)` bounds a track must satisfy.
    #[must_use]
    pub const fn thresholds(self) -> &'static [(Feature, f64, f64)] {
        match self {
            Activity::Workout => &[(Feature::Energy, 0.6, 1.0), (Feature::Tempo, 110.0, 200.0)],
            Activity::Study => &[
                (Feature::Instrumentalness, 0.3, 1.0),
                (Feature::Energy, 0.0, 0.6),
            ],
            Activity::Relax => &[(Feature::Energy, 0.0, 0.5)],
            Activity::Focus => &[
                (Feature::Energy, 0.3, 0.7),
                (Feature::Instrumentalness, 0.2, 1.0),
            ],
            Activity::Party => &[(Feature::Danceability, 0.6, 1.0), (Feature::Energy, 0.6, 1.0)],
            Activity::Sleep => &[(Feature::Energy, 0.0, 0.3), (Feature::Tempo, 40.0, 100.0)],
            Activity::Default => &[],
        }
    }

    /// Whether the features fit this activity. Absent features never
    /// violate a bound.
    #[must_use]
    pub fn admits(self, features: Option<&FeatureVector>) -> bool {
        let Some(features) = features else {
            return true;
        };
        self.thresholds().iter().all(|&(feature, lo, hi)| {
            features
                .get(feature)
                .map_or(true, |value| (lo..=hi).contains(&value))
        })
    }

    /// Ranking key, higher is a better fit.
    #[must_use]
    pub fn sort_key(self, features: Option<&FeatureVector>) -> f64 {
        let get = |feature: Feature| features.and_then(|f| f.get(feature)).unwrap_or(0.0);
        match self {
            Activity::Workout => 0.6 * get(Feature::Energy) + 0.4 * get(Feature::Tempo) / 200.0,
            Activity::Study | Activity::Focus => get(Feature::Instrumentalness),
            Activity::Relax => get(Feature::Acousticness) + (1.0 - get(Feature::Energy)),
            Activity::Party => get(Feature::Danceability) + get(Feature::Energy),
            Activity::Sleep => (1.0 - get(Feature::Energy)) + get(Feature::Acousticness),
            Activity::Default => 0.0,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Activity::ALL
            .into_iter()
            .find(|activity| activity.name() == wanted)
            .ok_or_else(|| MoodError::UnknownActivity {
                given: s.to_string(),
                supported: Activity::supported(),
            })
    }
}

/// Minimum output size after filtering `total` tracks of which `kept`
/// survived.
#[must_use]
pub fn filter_floor(total: usize, kept: usize) -> usize {
    let base = total.min(MIN_VIABLE_TRACKS);
    #[allow(clippy::cast_precision_loss)]
    let removed_share = if total == 0 { 0.0 } else { (total - kept) as f64 / total as f64 };
    if removed_share > HEAVY_FILTER_RATIO {
        base.max(total.div_ceil(3))
    } else {
        base
    }
}

/// Applies an activity's thresholds and ranking.
///
/// Survivors are sorted by the activity's key, descending. If too few
/// survive, dropped tracks are appended back in their original order until
/// [`filter_floor`] is met. [`Activity::Default`] returns the input unchanged.
#[must_use]
pub fn filter_for_activity<T: AsRef<Track>>(items: Vec<T>, activity: Activity) -> Vec<T> {
    if activity == Activity::Default || items.is_empty() {
        return items;
    }

    let total = items.len();
    let (mut kept, dropped): (Vec<T>, Vec<T>) = items
        .into_iter()
        .partition(|item| activity.admits(features_of(item)));

    kept.sort_by(|a, b| {
        activity
            .sort_key(features_of(b))
            .partial_cmp(&activity.sort_key(features_of(a)))
            .unwrap_or(Ordering::Equal)
    });

    let floor = filter_floor(total, kept.len());
    if kept.len() < floor {
        let restore = floor - kept.len();
        info!(
            "{activity} filter kept {}/{total} tracks, restoring {restore}",
            kept.len()
        );
        kept.extend(dropped.into_iter().take(restore));
    } else {
        debug!("{activity} filter kept {}/{total} tracks", kept.len());
    }
    kept
}
