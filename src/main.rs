//! # moodmix
//!
//! Command-line front end: emotion fusion, target vectors, playlist
//! generation from a local catalog, heart-rate calibration and feedback.
//!
//! ```bash
//! moodmix target --mood sad --goal increase_energy
//! moodmix recommend --catalog library.json --mood happy --transition-to calm
//! moodmix calibrate --user alice --seconds 30
//! moodmix zone --bpm 142 --user alice
//! ```

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use moodmix::catalog::{LocalCatalog, Session};
use moodmix::cli::{self, MoodArgs};
use moodmix::completion;
use moodmix::config::{AppConfig, RuntimeConfig};
use moodmix::feedback::{Feedback, FeedbackStore};
use moodmix::fusion::{self, ClassifierOutput};
use moodmix::heart_rate::{
    self, BaselineStore, CalibrationPlan, FixedHeartRate, HeartRateMonitor, HeartRateSource,
    MockHeartRateSource,
};
use moodmix::mood::Emotion;
use moodmix::pipeline::{PlaylistGenerator, PlaylistRequest, PlaylistResponse};
use moodmix::target::{build_target, TargetRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to encode output")?);
    Ok(())
}

fn target_request(args: &MoodArgs) -> Result<TargetRequest> {
    let emotion: Emotion = args.mood.parse()?;
    let mut request = TargetRequest::new(emotion, &args.goal);
    request.context.clone_from(&args.context);
    request.heart_rate = args.bpm;
    Ok(request)
}

fn parse_song_rating(entry: &str) -> Result<(String, u8)> {
    let Some((track_id, rating)) = entry.split_once('=') else {
        bail!("Expected TRACK_ID=RATING, got `{entry}'");
    };
    let rating = rating
        .trim()
        .parse::<u8>()
        .with_context(|| format!("Invalid rating in `{entry}'"))?;
    Ok((track_id.trim().to_string(), rating))
}

/// Main entry point.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug moodmix recommend ...`
/// - `RUST_LOG=moodmix::acquisition=debug moodmix recommend ...`
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            let shell = completion::shell_to_completion_shell(&shell);
            completion::generate_completions(shell, &mut cmd);
            return Ok(());
        }
        cli::Command::CompletionEnhanced { shell } => {
            match shell {
                cli::Shell::Bash => print!("{}", completion::enhanced_bash_completion()),
                cli::Shell::Fish => print!("{}", completion::enhanced_fish_completion()),
                _ => bail!("Enhanced completions only supported for bash and fish"),
            }
            return Ok(());
        }
        cli::Command::CompleteLabels { kind } => {
            completion::print_label_completions(kind);
            return Ok(());
        }
        _ => {}
    }

    let runtime = RuntimeConfig::resolve(args.config, args.baselines, args.feedback_db)?;
    debug!("Runtime paths: {runtime:?}");
    let config = AppConfig::load(&runtime.config_path);

    match args.command {
        cli::Command::Detect {
            label,
            confidence,
            bpm,
            mock_sensor,
        } => {
            let classification = label.map(|label| ClassifierOutput {
                distribution: BTreeMap::from([(label.clone(), confidence)]),
                label,
                confidence: confidence.clamp(0.0, 1.0),
            });
            let bpm = if mock_sensor {
                MockHeartRateSource::new(config.heart_rate.default_resting_hr).read_heart_rate()
            } else {
                FixedHeartRate(bpm).read_heart_rate()
            };
            let assessment = fusion::fuse(classification.as_ref(), bpm, &config.fusion);
            info!(
                "Detected {} (face: {}, confidence {:.2})",
                assessment.primary_emotion, assessment.face_emotion, assessment.confidence
            );
            print_json(&assessment)?;
        }
        cli::Command::Target { mood } => {
            let target = build_target(&target_request(&mood)?);
            print_json(&target)?;
        }
        cli::Command::Recommend {
            catalog,
            mood,
            custom_mood,
            activity,
            transition_to,
            length,
            max_per_artist,
            user,
        } => {
            let catalog = LocalCatalog::open(&catalog)?;
            let generator = PlaylistGenerator::new(&catalog)
                .with_config(config.acquisition.clone(), config.selection.clone());
            let request = PlaylistRequest {
                mood: mood.mood,
                custom_mood,
                goal: mood.goal,
                context: mood.context,
                heart_rate: mood.bpm,
                activity,
                transition_to,
                length,
                max_per_artist,
            };

            let response = generator.generate(&Session::local(&user), &request);
            print_json(&response)?;
            if let PlaylistResponse::Error { message } = response {
                bail!(message);
            }
        }
        cli::Command::Calibrate {
            user,
            seconds,
            interval_ms,
            seed,
        } => {
            let resting = config.heart_rate.default_resting_hr;
            let source = match seed {
                Some(seed) => MockHeartRateSource::seeded(resting, seed),
                None => MockHeartRateSource::new(resting),
            };
            let plan = CalibrationPlan::over(
                Duration::from_secs(seconds),
                Duration::from_millis(interval_ms),
            );
            let store = BaselineStore::open(&runtime.baselines_path);

            eprintln!(
                "Calibrating resting heart rate for {user}: {} samples, stay still...",
                plan.samples
            );
            let mut monitor = HeartRateMonitor::new(source);
            let baseline = heart_rate::calibrate(&mut monitor, &store, &user, &plan)?;
            print_json(&baseline)?;
        }
        cli::Command::Zone { bpm, user } => {
            let store = BaselineStore::open(&runtime.baselines_path);
            let user = user.unwrap_or_default();
            let zone = store.zone(bpm, &user, &config.heart_rate);
            let resting = store
                .get(&user)
                .map_or(config.heart_rate.default_resting_hr, |b| b.resting_hr);
            print_json(&serde_json::json!({
                "bpm": bpm,
                "resting_hr": resting,
                "zone": zone,
            }))?;
        }
        cli::Command::Feedback {
            playlist,
            rating,
            text,
            songs,
        } => {
            let mut feedback = Feedback::new(&playlist, rating);
            feedback.text = text;
            for entry in &songs {
                let (track_id, rating) = parse_song_rating(entry)?;
                feedback.song_ratings.insert(track_id, rating);
            }

            let store = FeedbackStore::open(&runtime.feedback_db_path)?;
            let id = store.record(&feedback)?;
            let average = store.average_rating(&playlist)?;
            print_json(&serde_json::json!({
                "id": id,
                "playlist_id": playlist,
                "average_rating": average,
            }))?;
        }
        cli::Command::Completion { .. }
        | cli::Command::CompletionEnhanced { .. }
        | cli::Command::CompleteLabels { .. } => {}
    }

    Ok(())
}
