pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("duplicate track id: {id}")]
    DuplicateId { id: String },
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and make sure the songs
    /// table exists. An existing file is opened as-is.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        // WAL mode for better concurrent read performance
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS songs (
                id               TEXT NOT NULL PRIMARY KEY,
                name             TEXT,
                artists          TEXT,
                danceability     REAL,
                energy           REAL,
                key              INTEGER,
                loudness         REAL,
                mode             INTEGER,
                speechiness      REAL,
                acousticness     REAL,
                instrumentalness REAL,
                liveness         REAL,
                valence          REAL,
                tempo            REAL,
                duration_ms      INTEGER,
                time_signature   INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_songs_artists ON songs(artists);
            ",
        )?;
        Ok(())
    }
}
