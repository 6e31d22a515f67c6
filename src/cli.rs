//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `moodmix` binary.
//!
//! ## Commands
//!
//! - `detect`: fuse a classifier reading with heart rate
//! - `target`: print the target feature vector for a mood, goal and context
//! - `recommend`: generate a playlist from a local catalog file
//! - `calibrate`: measure and store a resting heart rate
//! - `zone`: classify a heart rate against a user's baseline
//! - `feedback`: record a playlist rating
//! - `completion`: shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! moodmix target --mood sad --goal increase_energy
//! moodmix recommend --catalog library.json --mood happy --activity workout
//! moodmix detect --label neutral --confidence 0.5 --bpm 130
//! ```

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Label families offered for dynamic completion.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum LabelKind {
    Mood,
    Goal,
    Context,
    Activity,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "moodmix")]
#[command(about = "moodmix: mood-driven playlists from emotion and heart rate")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to config.json in the data directory)
    #[arg(long, global = true, env = "MOODMIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Heart-rate baseline file (defaults to hr_baselines.json in the data directory)
    #[arg(long, global = true, env = "MOODMIX_BASELINES")]
    pub baselines: Option<PathBuf>,

    /// Feedback database (defaults to feedback.db in the data directory)
    #[arg(long, global = true, env = "MOODMIX_FEEDBACK_DB")]
    pub feedback_db: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Inputs shared by `target` and `recommend`.
#[derive(ClapArgs, Debug, Clone)]
pub struct MoodArgs {
    /// Detected or chosen mood (happy, sad, energetic, calm, ...)
    #[arg(long)]
    pub mood: String,

    /// Listener goal (increase_energy, calm_down, stay_same, ...)
    #[arg(long, default_value = "stay_same")]
    pub goal: String,

    /// Listening context (working, exercising, studying, ...)
    #[arg(long)]
    pub context: Option<String>,

    /// Current heart rate in BPM
    #[arg(long)]
    pub bpm: Option<u32>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Fuse a face-classifier reading with heart rate
    ///
    /// Prints the resulting emotion assessment as JSON.
    Detect {
        /// Classifier's top label (happiness, neutral, anger, ...)
        #[arg(long)]
        label: Option<String>,

        /// Classifier confidence for the label, 0-1
        #[arg(long, default_value = "1.0")]
        confidence: f64,

        /// Heart rate in BPM
        #[arg(long, conflicts_with = "mock_sensor")]
        bpm: Option<u32>,

        /// Read the heart rate from the simulated sensor instead
        #[arg(long)]
        mock_sensor: bool,
    },

    /// Print the target feature vector as JSON
    Target {
        #[command(flatten)]
        mood: MoodArgs,
    },

    /// Generate a playlist from a local catalog file
    ///
    /// The catalog is a JSON file of genres, listening history and tracks
    /// with audio features. The response is printed as JSON.
    Recommend {
        /// Path to the catalog JSON file
        #[arg(long)]
        catalog: PathBuf,

        #[command(flatten)]
        mood: MoodArgs,

        /// Use this mood instead of --mood
        #[arg(long)]
        custom_mood: Option<String>,

        /// Post-filter for an activity (workout, study, relax, focus, party, sleep)
        #[arg(long)]
        activity: Option<String>,

        /// Order the playlist as a transition towards this mood
        #[arg(long)]
        transition_to: Option<String>,

        /// Number of tracks
        #[arg(long)]
        length: Option<usize>,

        /// Maximum tracks per artist
        #[arg(long)]
        max_per_artist: Option<usize>,

        /// User the catalog session belongs to
        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Measure a resting heart rate with the simulated sensor
    ///
    /// Blocks for the whole sampling window, then stores the baseline.
    Calibrate {
        /// User id to store the baseline under
        #[arg(long)]
        user: String,

        /// Length of the sampling window
        #[arg(long, default_value = "60")]
        seconds: u64,

        /// Time between samples
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Seed for the simulated sensor
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Classify a heart rate into a training zone
    Zone {
        /// Heart rate in BPM
        #[arg(long)]
        bpm: u32,

        /// Use this user's calibrated resting heart rate
        #[arg(long)]
        user: Option<String>,
    },

    /// Record feedback for a playlist
    Feedback {
        /// Playlist the feedback is about
        #[arg(long)]
        playlist: String,

        /// Overall rating, 1-5
        #[arg(long)]
        rating: u8,

        /// Free-form comment
        #[arg(long)]
        text: Option<String>,

        /// Per-track rating as TRACK_ID=RATING, repeatable
        #[arg(long = "song", value_name = "TRACK_ID=RATING")]
        songs: Vec<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate enhanced completions that also complete mood labels
    CompletionEnhanced {
        /// Shell to generate completions for (bash or fish)
        #[arg(value_enum)]
        shell: Shell,
    },

    /// List labels for shell completion (hidden command)
    #[command(hide = true)]
    CompleteLabels {
        #[arg(value_enum)]
        kind: LabelKind,
    },
}
