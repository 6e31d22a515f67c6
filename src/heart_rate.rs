//! # Heart Rate
//!
//! Pull-based heart-rate acquisition plus the one piece of state that outlives
//! a request: each user's calibrated resting heart rate.
//!
//! - [`HeartRateSource`]: anything that can be asked for the current BPM
//! - [`HeartRateMonitor`]: bounded sample history and statistics over a source
//! - [`BaselineStore`]: JSON file of `user_id -> HeartRateBaseline`, read once,
//!   rewritten wholesale on every calibration
//! - [`calibrate`]: blocking sampling window that produces a new baseline
//! - [`zone_for`]: Karvonen heart-rate zone relative to the resting baseline

use crate::error::MoodError;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Lowest BPM accepted from a sensor.
pub const MIN_VALID_BPM: u32 = 30;
/// Highest BPM accepted from a sensor.
pub const MAX_VALID_BPM: u32 = 220;

#[must_use]
pub fn is_valid_bpm(bpm: u32) -> bool {
    (MIN_VALID_BPM..=MAX_VALID_BPM).contains(&bpm)
}

/// Heart-rate collaborator. `None` means no usable reading right now.
pub trait HeartRateSource {
    fn read_heart_rate(&mut self) -> Option<u32>;
}

/// Always reports the same value. Used for explicit BPM input.
#[derive(Debug, Clone, Copy)]
pub struct FixedHeartRate(pub Option<u32>);

impl HeartRateSource for FixedHeartRate {
    fn read_heart_rate(&mut self) -> Option<u32> {
        self.0.filter(|&bpm| is_valid_bpm(bpm))
    }
}

/// Simulated sensor: a bounded random walk starting at a resting value.
#[derive(Debug)]
pub struct MockHeartRateSource {
    rng: StdRng,
    last: Option<f64>,
    resting: f64,
}

impl MockHeartRateSource {
    #[must_use]
    pub fn new(resting: u32) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            last: None,
            resting: f64::from(resting),
        }
    }

    /// Reproducible walk for tests and demos.
    #[must_use]
    pub fn seeded(resting: u32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
            resting: f64::from(resting),
        }
    }
}

impl HeartRateSource for MockHeartRateSource {
    fn read_heart_rate(&mut self) -> Option<u32> {
        let next = match self.last {
            None => self.resting,
            Some(last) => {
                let mut change = self.rng.gen_range(-2.0..=2.0);
                // occasional activity change
                if self.rng.gen::<f64>() < 0.05 {
                    change += self.rng.gen_range(-10.0..=10.0);
                }
                (last + change).clamp(40.0, 180.0)
            }
        };
        self.last = Some(next);
        Some(next.round() as u32)
    }
}

/// Parses one sensor line: either `BPM:75` or a bare `75`.
#[must_use]
pub fn parse_sensor_line(line: &str) -> Option<u32> {
    let line = line.trim();
    let value = line.strip_prefix("BPM:").unwrap_or(line).trim();
    match value.parse::<u32>() {
        Ok(bpm) if is_valid_bpm(bpm) => Some(bpm),
        Ok(bpm) => {
            debug!("Discarding out-of-range heart rate {bpm}");
            None
        }
        Err(_) => {
            if !value.is_empty() {
                warn!("Invalid heart rate value: '{value}'");
            }
            None
        }
    }
}

/// Reads sensor lines from any buffered stream (serial port, pipe, file).
pub struct LineHeartRateSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineHeartRateSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> HeartRateSource for LineHeartRateSource<R> {
    fn read_heart_rate(&mut self) -> Option<u32> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => parse_sensor_line(&line),
            Err(e) => {
                error!("Error reading from sensor: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateSample {
    pub bpm: u32,
    pub at: DateTime<Utc>,
}

/// Summary over a window of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeartRateStats {
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub variability: f64,
    pub samples: usize,
    pub duration_seconds: i64,
}

/// Samples a source and keeps a bounded history.
pub struct HeartRateMonitor<S: HeartRateSource> {
    source: S,
    history: VecDeque<HeartRateSample>,
    capacity: usize,
}

impl<S: HeartRateSource> HeartRateMonitor<S> {
    /// About five minutes of history at one sample per second.
    pub const DEFAULT_CAPACITY: usize = 300;

    pub fn new(source: S) -> Self {
        Self::with_capacity(source, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Self {
            source,
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Takes one reading; valid readings are appended to the history.
    pub fn sample(&mut self) -> Option<u32> {
        let bpm = self.source.read_heart_rate().filter(|&bpm| is_valid_bpm(bpm))?;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(HeartRateSample {
            bpm,
            at: Utc::now(),
        });
        Some(bpm)
    }

    /// Most recent valid reading, if any.
    #[must_use]
    pub fn current(&self) -> Option<HeartRateSample> {
        self.history.back().copied()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub fn history(&self) -> &VecDeque<HeartRateSample> {
        &self.history
    }

    /// Statistics over samples newer than `window`, or over everything when
    /// `window` is `None`.
    #[must_use]
    pub fn stats(&self, window: Option<chrono::Duration>) -> HeartRateStats {
        let cutoff = window.map(|w| Utc::now() - w);
        let recent: Vec<&HeartRateSample> = self
            .history
            .iter()
            .filter(|sample| cutoff.map_or(true, |cutoff| sample.at > cutoff))
            .collect();
        compute_stats(&recent)
    }
}

fn compute_stats(samples: &[&HeartRateSample]) -> HeartRateStats {
    if samples.is_empty() {
        return HeartRateStats::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| f64::from(s.bpm)).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|s| (f64::from(s.bpm) - mean).powi(2))
        .sum::<f64>()
        / n;

    let oldest = samples.iter().map(|s| s.at).min().unwrap_or_else(Utc::now);
    let newest = samples.iter().map(|s| s.at).max().unwrap_or(oldest);

    HeartRateStats {
        average: (mean * 10.0).round() / 10.0,
        min: samples.iter().map(|s| s.bpm).min().unwrap_or(0),
        max: samples.iter().map(|s| s.bpm).max().unwrap_or(0),
        variability: if samples.len() > 1 {
            (variance.sqrt() * 100.0).round() / 100.0
        } else {
            0.0
        },
        samples: samples.len(),
        duration_seconds: (newest - oldest).num_seconds(),
    }
}

/// A user's calibrated resting heart rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateBaseline {
    #[serde(default)]
    pub user_id: String,
    pub resting_hr: u32,
    pub calibrated_at: DateTime<Utc>,
    pub samples: usize,
}

/// JSON-file-backed table of baselines keyed by user id.
#[derive(Debug)]
pub struct BaselineStore {
    path: PathBuf,
    baselines: Mutex<BTreeMap<String, HeartRateBaseline>>,
    calibrating: Mutex<HashSet<String>>,
}

impl BaselineStore {
    /// Loads the whole file. A missing or unreadable file yields an empty
    /// store; the next save recreates it.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let baselines = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, HeartRateBaseline>>(
                &contents,
            ) {
                Ok(mut map) => {
                    for (user_id, baseline) in &mut map {
                        baseline.user_id.clone_from(user_id);
                    }
                    info!("Loaded baselines for {} users", map.len());
                    map
                }
                Err(e) => {
                    error!("Error parsing baselines at {}: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                error!("Error loading baselines from {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            baselines: Mutex::new(baselines),
            calibrating: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<HeartRateBaseline> {
        self.baselines.lock().ok()?.get(user_id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.baselines.lock().map(|map| map.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces a baseline and rewrites the file.
    ///
    /// The table stays locked until the file is replaced, so concurrent
    /// upserts are written one after another. If the write fails the
    /// previous entry is restored.
    pub fn upsert(&self, baseline: HeartRateBaseline) -> Result<()> {
        let mut map = self
            .baselines
            .lock()
            .map_err(|_| anyhow!("Baseline table lock poisoned"))?;
        let user_id = baseline.user_id.clone();
        let previous = map.insert(user_id.clone(), baseline);
        if let Err(e) = self.save(&map) {
            match previous {
                Some(previous) => map.insert(user_id, previous),
                None => map.remove(&user_id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn save(&self, baselines: &BTreeMap<String, HeartRateBaseline>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(baselines).context("Failed to encode baselines")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        info!("Saved baselines for {} users", baselines.len());
        Ok(())
    }

    fn begin_calibration(&self, user_id: &str) -> Result<CalibrationGuard<'_>> {
        let mut running = self
            .calibrating
            .lock()
            .map_err(|_| anyhow!("Calibration registry lock poisoned"))?;
        if !running.insert(user_id.to_string()) {
            return Err(MoodError::CalibrationInProgress(user_id.to_string()).into());
        }
        Ok(CalibrationGuard {
            store: self,
            user_id: user_id.to_string(),
        })
    }

    /// Zone for `bpm` relative to this user's baseline (or the default
    /// resting rate when the user never calibrated).
    #[must_use]
    pub fn zone(&self, bpm: u32, user_id: &str, config: &HeartRateConfig) -> HeartRateZone {
        let resting = self.get(user_id).map(|b| b.resting_hr);
        zone_for(bpm, resting, config)
    }
}

/// Marks a user as calibrating until dropped.
struct CalibrationGuard<'a> {
    store: &'a BaselineStore,
    user_id: String,
}

impl Drop for CalibrationGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut running) = self.store.calibrating.lock() {
            running.remove(&self.user_id);
        }
    }
}

/// How long a calibration samples for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPlan {
    pub samples: usize,
    pub interval: Duration,
}

impl CalibrationPlan {
    /// One sample per `interval` over `duration`, at least one sample.
    #[must_use]
    pub fn over(duration: Duration, interval: Duration) -> Self {
        let samples = if interval.is_zero() {
            1
        } else {
            (duration.as_nanos() / interval.as_nanos()).max(1)
        };
        Self {
            samples: usize::try_from(samples).unwrap_or(usize::MAX),
            interval,
        }
    }
}

impl Default for CalibrationPlan {
    fn default() -> Self {
        Self::over(Duration::from_secs(60), Duration::from_secs(1))
    }
}

/// Measures a user's resting heart rate and stores it.
///
/// Blocks for roughly `plan.samples * plan.interval`. Concurrent calibrations
/// for the same user are rejected.
///
/// # Errors
///
/// [`MoodError::CalibrationInProgress`] if this user is already calibrating,
/// [`MoodError::NoHeartRateReadings`] if the sensor produced nothing valid,
/// or an I/O error from rewriting the baseline file.
pub fn calibrate<S: HeartRateSource>(
    monitor: &mut HeartRateMonitor<S>,
    store: &BaselineStore,
    user_id: &str,
    plan: &CalibrationPlan,
) -> Result<HeartRateBaseline> {
    let _guard = store.begin_calibration(user_id)?;
    info!(
        "Starting resting HR calibration for user {user_id} ({} samples every {:?})",
        plan.samples, plan.interval
    );

    monitor.clear();
    for i in 0..plan.samples {
        monitor.sample();
        if i + 1 < plan.samples && !plan.interval.is_zero() {
            std::thread::sleep(plan.interval);
        }
    }

    let stats = monitor.stats(None);
    if stats.samples == 0 {
        error!("Calibration failed for user {user_id}: no valid heart rate readings");
        return Err(MoodError::NoHeartRateReadings.into());
    }

    let baseline = HeartRateBaseline {
        user_id: user_id.to_string(),
        resting_hr: stats.average.round() as u32,
        calibrated_at: Utc::now(),
        samples: stats.samples,
    };
    store
        .upsert(baseline.clone())
        .with_context(|| format!("Failed to persist baseline for user {user_id}"))?;
    info!("Calibrated resting HR for user {user_id}: {} BPM", baseline.resting_hr);
    Ok(baseline)
}

/// Parameters for zone classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateConfig {
    pub age: u32,
    pub default_resting_hr: u32,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            age: 30,
            default_resting_hr: 70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateZone {
    Low,
    Moderate,
    High,
    Max,
}

/// Karvonen zone: thresholds at 30 %, 50 % and 70 % of heart-rate reserve
/// above the resting rate.
#[must_use]
pub fn zone_for(bpm: u32, resting: Option<u32>, config: &HeartRateConfig) -> HeartRateZone {
    let rest = f64::from(resting.unwrap_or(config.default_resting_hr));
    let max_hr = f64::from(220_u32.saturating_sub(config.age));
    let reserve = (max_hr - rest).max(0.0);
    let bpm = f64::from(bpm);

    if bpm < rest + 0.3 * reserve {
        HeartRateZone::Low
    } else if bpm < rest + 0.5 * reserve {
        HeartRateZone::Moderate
    } else if bpm < rest + 0.7 * reserve {
        HeartRateZone::High
    } else {
        HeartRateZone::Max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Scripted(VecDeque<Option<u32>>);

    impl HeartRateSource for Scripted {
        fn read_heart_rate(&mut self) -> Option<u32> {
            self.0.pop_front().flatten()
        }
    }

    fn scripted(values: &[Option<u32>]) -> Scripted {
        Scripted(values.iter().copied().collect())
    }

    #[test]
    fn test_parse_sensor_line() {
        assert_eq!(parse_sensor_line("BPM:75"), Some(75));
        assert_eq!(parse_sensor_line("  82\r\n"), Some(82));
        assert_eq!(parse_sensor_line("BPM: 64"), Some(64));
        assert_eq!(parse_sensor_line("BPM:12"), None);
        assert_eq!(parse_sensor_line("BPM:250"), None);
        assert_eq!(parse_sensor_line("garbage"), None);
        assert_eq!(parse_sensor_line(""), None);
    }

    #[test]
    fn test_line_source_reads_stream() {
        let stream = Cursor::new("BPM:70\nnoise\n88\n");
        let mut source = LineHeartRateSource::new(stream);
        assert_eq!(source.read_heart_rate(), Some(70));
        assert_eq!(source.read_heart_rate(), None);
        assert_eq!(source.read_heart_rate(), Some(88));
        assert_eq!(source.read_heart_rate(), None);
    }

    #[test]
    fn test_mock_source_stays_in_bounds() {
        let mut source = MockHeartRateSource::seeded(70, 7);
        assert_eq!(source.read_heart_rate(), Some(70));
        for _ in 0..2_000 {
            let bpm = source.read_heart_rate().unwrap();
            assert!((40..=180).contains(&bpm));
        }
    }

    #[test]
    fn test_monitor_history_is_bounded() {
        let mut monitor = HeartRateMonitor::with_capacity(FixedHeartRate(Some(72)), 5);
        for _ in 0..12 {
            monitor.sample();
        }
        assert_eq!(monitor.history().len(), 5);
        assert_eq!(monitor.current().map(|s| s.bpm), Some(72));
    }

    #[test]
    fn test_stats() {
        let readings = [Some(60), Some(70), None, Some(80), Some(500)];
        let mut monitor = HeartRateMonitor::new(scripted(&readings));
        for _ in 0..5 {
            monitor.sample();
        }
        let stats = monitor.stats(None);
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.average, 70.0);
        assert_eq!(stats.min, 60);
        assert_eq!(stats.max, 80);
        assert!((stats.variability - 8.16).abs() < 1e-9);

        let empty = HeartRateMonitor::new(FixedHeartRate(None));
        assert_eq!(empty.stats(None), HeartRateStats::default());
    }

    #[test]
    fn test_calibration_writes_baseline_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hr_baselines.json");
        let store = BaselineStore::open(&path);
        assert!(store.is_empty());

        let readings = [Some(62), Some(64), Some(66), Some(65)];
        let mut monitor = HeartRateMonitor::new(scripted(&readings));
        let plan = CalibrationPlan {
            samples: 4,
            interval: Duration::ZERO,
        };
        let baseline = calibrate(&mut monitor, &store, "alice", &plan).unwrap();

        assert_eq!(baseline.resting_hr, 64);
        assert_eq!(baseline.samples, 4);
        assert_eq!(store.get("alice").map(|b| b.resting_hr), Some(64));

        let reopened = BaselineStore::open(&path);
        let stored = reopened.get("alice").unwrap();
        assert_eq!(stored.user_id, "alice");
        assert_eq!(stored.resting_hr, 64);
    }

    #[test]
    fn test_calibration_without_readings_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hr_baselines.json");
        let store = BaselineStore::open(&path);

        let mut monitor = HeartRateMonitor::new(FixedHeartRate(None));
        let plan = CalibrationPlan {
            samples: 3,
            interval: Duration::ZERO,
        };
        let err = calibrate(&mut monitor, &store, "bob", &plan).unwrap_err();

        assert!(matches!(err.downcast_ref::<MoodError>(), Some(MoodError::NoHeartRateReadings)));
        assert!(store.get("bob").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_calibration_rejected() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::open(&dir.path().join("hr.json"));

        let guard = store.begin_calibration("carol").unwrap();
        let mut monitor = HeartRateMonitor::new(FixedHeartRate(Some(70)));
        let plan = CalibrationPlan {
            samples: 1,
            interval: Duration::ZERO,
        };
        let err = calibrate(&mut monitor, &store, "carol", &plan).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MoodError>(),
            Some(MoodError::CalibrationInProgress(user)) if user == "carol"
        ));

        // other users are unaffected, and the slot frees up on drop
        assert!(calibrate(&mut monitor, &store, "dave", &plan).is_ok());
        drop(guard);
        assert!(calibrate(&mut monitor, &store, "carol", &plan).is_ok());
    }

    #[test]
    fn test_parallel_upserts_keep_every_user() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hr.json");

        for round in 0..20 {
            let store = BaselineStore::open(&path);
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|n| {
                        let store = &store;
                        scope.spawn(move || {
                            store.upsert(HeartRateBaseline {
                                user_id: format!("user-{round}-{n}"),
                                resting_hr: 60 + n,
                                calibrated_at: Utc::now(),
                                samples: 1,
                            })
                        })
                    })
                    .collect();
                for handle in handles {
                    assert!(handle.join().unwrap().is_ok());
                }
            });

            let reopened = BaselineStore::open(&path);
            assert_eq!(reopened.len(), 8 * (round + 1));
            for n in 0..8 {
                let stored = reopened.get(&format!("user-{round}-{n}")).unwrap();
                assert_eq!(stored.resting_hr, 60 + n);
            }
        }
    }

    #[test]
    fn test_failed_save_restores_previous_entry() {
        let dir = TempDir::new().unwrap();
        // a directory in the file's place makes the rename fail
        let path = dir.path().join("hr.json");
        fs::create_dir(&path).unwrap();
        let store = BaselineStore::open(&path);

        let baseline = HeartRateBaseline {
            user_id: "erin".into(),
            resting_hr: 58,
            calibrated_at: Utc::now(),
            samples: 1,
        };
        assert!(store.upsert(baseline).is_err());
        assert!(store.get("erin").is_none());
    }

    #[test]
    fn test_store_zone_uses_user_baseline() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::open(&dir.path().join("hr.json"));
        let config = HeartRateConfig::default();

        let mut monitor = HeartRateMonitor::new(FixedHeartRate(Some(50)));
        let plan = CalibrationPlan {
            samples: 2,
            interval: Duration::ZERO,
        };
        calibrate(&mut monitor, &store, "frank", &plan).unwrap();

        // rest 50, reserve 140: moderate starts at 92
        assert_eq!(store.zone(100, "frank", &config), HeartRateZone::Moderate);
        assert_eq!(store.zone(100, "nobody", &config), HeartRateZone::Low);
    }

    #[test]
    fn test_corrupt_baseline_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hr.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(BaselineStore::open(&path).is_empty());
    }

    #[test]
    fn test_calibration_plan_over_duration() {
        let plan = CalibrationPlan::over(Duration::from_secs(10), Duration::from_millis(500));
        assert_eq!(plan.samples, 20);
        assert_eq!(CalibrationPlan::over(Duration::ZERO, Duration::from_secs(1)).samples, 1);
        assert_eq!(CalibrationPlan::default().samples, 60);

        let fine = CalibrationPlan::over(Duration::from_secs(1), Duration::from_micros(500));
        assert_eq!(fine.samples, 2000);
        let coarse = CalibrationPlan::over(Duration::from_millis(1), Duration::from_nanos(1));
        assert_eq!(coarse.samples, 1_000_000);
    }

    #[test]
    fn test_karvonen_zones() {
        let config = HeartRateConfig::default();
        // rest 70, max 190, reserve 120: edges at 106, 130, 154
        assert_eq!(zone_for(100, None, &config), HeartRateZone::Low);
        assert_eq!(zone_for(106, None, &config), HeartRateZone::Moderate);
        assert_eq!(zone_for(140, None, &config), HeartRateZone::High);
        assert_eq!(zone_for(154, None, &config), HeartRateZone::Max);

        // a lower resting rate shifts every edge down
        assert_eq!(zone_for(100, Some(50), &config), HeartRateZone::Moderate);
    }
}
