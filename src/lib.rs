//! Mood-driven playlist generation.
//!
//! Maps a detected emotion (face classifier, optionally fused with heart
//! rate) onto a target region of audio-feature space, then acquires, scores,
//! diversifies and orders catalog tracks to approximate it.
//!
//! Core modules, leaf first:
//! - [`features`] - Audio feature space and sparse feature vectors
//! - [`mood`] - Emotion labels and the mood, goal and context tables
//! - [`fusion`] - Face-emotion and heart-rate fusion
//! - [`target`] - Target vector builder
//! - [`acquisition`] - Three-tier candidate acquisition
//! - [`algorithm`] - Track scoring, tie-breaks and diversification
//! - [`sequencer`] - Single-mood, transition and activity ordering
//! - [`pipeline`] - End-to-end generation and playlist publishing
//!
//! ### Supporting Modules
//!
//! - [`catalog`] - Music-service collaborator traits and an offline catalog
//! - [`heart_rate`] - Sensors, calibration, baselines and zones
//! - [`feedback`] - Playlist feedback store
//! - [`config`] - Data directory and runtime configuration
//! - [`cli`] / [`completion`] - Command-line interface
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use moodmix::catalog::{LocalCatalog, Session};
//! use moodmix::pipeline::{PlaylistGenerator, PlaylistRequest};
//! use std::path::Path;
//!
//! let catalog = LocalCatalog::open(Path::new("library.json"))?;
//! let generator = PlaylistGenerator::new(&catalog);
//!
//! let mut request = PlaylistRequest::new("sad", "increase_energy");
//! request.activity = Some("workout".to_string());
//!
//! let response = generator.generate(&Session::local("me"), &request);
//! for entry in response.tracks() {
//!     println!("{} - {}", entry.track.primary_artist(), entry.track.name);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Target vectors
//!
//! ```
//! use moodmix::features::Feature;
//! use moodmix::mood::Emotion;
//! use moodmix::target::{build_target, TargetRequest};
//!
//! let target = build_target(&TargetRequest::new(Emotion::Sad, "increase_energy"));
//! assert!((target.get(Feature::Energy).unwrap() - 0.6).abs() < 1e-9);
//! ```
//!
//! ## Error Handling
//!
//! Fallible functions return `anyhow::Result`. Rejected input surfaces as a
//! [`error::MoodError`] inside the `anyhow::Error`, so callers can
//! `downcast_ref` it. Playlist generation itself never fails: collaborator
//! errors degrade to fewer candidates, then to a fixed fallback list, and
//! anything else becomes [`pipeline::PlaylistResponse::Error`].

pub mod acquisition;
pub mod algorithm;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod features;
pub mod feedback;
pub mod fusion;
pub mod heart_rate;
pub mod mood;
pub mod pipeline;
pub mod sequencer;
pub mod target;
