//! Listener feedback on generated playlists, stored in SQLite.

use crate::error::MoodError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, trace};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub playlist_id: String,
    /// Overall rating, 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub text: Option<String>,
    /// Per-track ratings keyed by track id, each 1 to 5.
    #[serde(default)]
    pub song_ratings: BTreeMap<String, u8>,
}

impl Feedback {
    #[must_use]
    pub fn new(playlist_id: &str, rating: u8) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
            rating,
            text: None,
            song_ratings: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), MoodError> {
        let valid = |rating: u8| (1..=5).contains(&rating);
        if !valid(self.rating) {
            return Err(MoodError::InvalidRating(self.rating));
        }
        if let Some(&bad) = self.song_ratings.values().find(|&&r| !valid(r)) {
            return Err(MoodError::InvalidRating(bad));
        }
        Ok(())
    }
}

/// Stored feedback with its row id and insertion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub id: i64,
    #[serde(flatten)]
    pub feedback: Feedback,
    pub created_at: DateTime<Utc>,
}

pub struct FeedbackStore {
    conn: Connection,
}

impl FeedbackStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open feedback database at {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS feedback (
                id           INTEGER PRIMARY KEY,
                playlist_id  TEXT    NOT NULL,
                rating       INTEGER NOT NULL,
                text         TEXT,
                song_ratings TEXT    NOT NULL,
                created_at   TEXT    NOT NULL
            )",
            [],
        )
        .context("Failed to create feedback table")?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_feedback_playlist ON feedback(playlist_id)",
            [],
        )
        .context("Failed to create feedback index")?;
        Ok(Self { conn })
    }

    /// Validates and stores one feedback entry, returning its row id.
    pub fn record(&self, feedback: &Feedback) -> Result<i64> {
        feedback.validate()?;

        let song_ratings = serde_json::to_string(&feedback.song_ratings)?;
        self.conn
            .execute(
                "INSERT INTO feedback (playlist_id, rating, text, song_ratings, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    feedback.playlist_id,
                    feedback.rating,
                    feedback.text,
                    song_ratings,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(MoodError::from)
            .with_context(|| {
                format!("Failed to store feedback for playlist {}", feedback.playlist_id)
            })?;

        let id = self.conn.last_insert_rowid();
        debug!("Recorded feedback {id} for playlist {}", feedback.playlist_id);
        Ok(id)
    }

    /// Every entry for a playlist, oldest first.
    pub fn for_playlist(&self, playlist_id: &str) -> Result<Vec<FeedbackRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, playlist_id, rating, text, song_ratings, created_at
             FROM feedback WHERE playlist_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map([playlist_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, playlist_id, rating, text, song_ratings, created_at) = row?;
            trace!("Loaded feedback row {id}");
            records.push(FeedbackRecord {
                id,
                feedback: Feedback {
                    playlist_id,
                    rating,
                    text,
                    song_ratings: serde_json::from_str(&song_ratings)
                        .with_context(|| format!("Corrupt song ratings in feedback row {id}"))?,
                },
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .with_context(|| format!("Corrupt timestamp in feedback row {id}"))?
                    .with_timezone(&Utc),
            });
        }
        Ok(records)
    }

    /// Mean overall rating for a playlist, `None` if it has no feedback.
    pub fn average_rating(&self, playlist_id: &str) -> Result<Option<f64>> {
        let average = self
            .conn
            .query_row(
                "SELECT AVG(rating) FROM feedback WHERE playlist_id = ?1",
                [playlist_id],
                |row| row.get::<_, Option<f64>>(0),
            )
            .optional()?
            .flatten();
        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_and_read_back() {
        let store = FeedbackStore::open_in_memory().unwrap();
        let mut feedback = Feedback::new("pl-1", 4);
        feedback.text = Some("great for mornings".into());
        feedback.song_ratings.insert("t1".into(), 5);
        feedback.song_ratings.insert("t2".into(), 2);

        let id = store.record(&feedback).unwrap();
        store.record(&Feedback::new("pl-1", 2)).unwrap();
        store.record(&Feedback::new("pl-2", 5)).unwrap();

        let records = store.for_playlist("pl-1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].feedback, feedback);
        assert_eq!(store.average_rating("pl-1").unwrap(), Some(3.0));
        assert_eq!(store.average_rating("nothing").unwrap(), None);
    }

    #[test]
    fn test_invalid_ratings_rejected() {
        let store = FeedbackStore::open_in_memory().unwrap();

        let err = store.record(&Feedback::new("pl", 0)).unwrap_err();
        assert!(matches!(err.downcast_ref::<MoodError>(), Some(MoodError::InvalidRating(0))));

        let mut feedback = Feedback::new("pl", 3);
        feedback.song_ratings.insert("t".into(), 9);
        let err = store.record(&feedback).unwrap_err();
        assert!(matches!(err.downcast_ref::<MoodError>(), Some(MoodError::InvalidRating(9))));

        assert!(store.for_playlist("pl").unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/feedback.db");

        FeedbackStore::open(&path).unwrap().record(&Feedback::new("pl", 5)).unwrap();
        let reopened = FeedbackStore::open(&path).unwrap();
        assert_eq!(reopened.for_playlist("pl").unwrap().len(), 1);
    }
}
