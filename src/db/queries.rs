use super::models::{StoreStats, Track};
use super::{Database, DbError, Result};
use rusqlite::params;

const TRACK_COLUMNS: &str = "id, name, artists, danceability, energy, key, loudness, mode, \
     speechiness, acousticness, instrumentalness, liveness, valence, tempo, \
     duration_ms, time_signature";

fn track_from_row(row: &rusqlite::Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        name: row.get(1)?,
        artists: row.get(2)?,
        danceability: row.get(3)?,
        energy: row.get(4)?,
        key: row.get(5)?,
        loudness: row.get(6)?,
        mode: row.get(7)?,
        speechiness: row.get(8)?,
        acousticness: row.get(9)?,
        instrumentalness: row.get(10)?,
        liveness: row.get(11)?,
        valence: row.get(12)?,
        tempo: row.get(13)?,
        duration_ms: row.get(14)?,
        time_signature: row.get(15)?,
    })
}

/// Insert a single track row on the given connection (or transaction).
/// A primary-key collision maps to [`DbError::DuplicateId`].
pub(crate) fn insert_track_row(conn: &rusqlite::Connection, t: &Track) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO songs (
            id, name, artists, danceability, energy, key, loudness, mode,
            speechiness, acousticness, instrumentalness, liveness, valence,
            tempo, duration_ms, time_signature
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )?;
    stmt.execute(params![
        t.id, t.name, t.artists, t.danceability, t.energy, t.key, t.loudness, t.mode,
        t.speechiness, t.acousticness, t.instrumentalness, t.liveness, t.valence,
        t.tempo, t.duration_ms, t.time_signature,
    ])
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
        {
            DbError::DuplicateId { id: t.id.clone() }
        }
        e => e.into(),
    })?;
    Ok(())
}

impl Database {
    /// Insert a batch of tracks in a single transaction.
    ///
    /// All-or-nothing: a duplicate id fails the whole batch with
    /// [`DbError::DuplicateId`] and rolls back every row inserted so far,
    /// leaving the store exactly as it was before the call.
    pub fn insert_tracks(&self, tracks: &[Track]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for t in tracks {
            insert_track_row(&tx, t)?;
        }
        tx.commit()?;
        Ok(tracks.len())
    }

    /// Get every track. Row order is whatever SQLite returns without an
    /// ORDER BY — not guaranteed stable across calls.
    pub fn get_all(&self) -> Result<Vec<Track>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TRACK_COLUMNS} FROM songs"))?;

        let tracks = stmt
            .query_map([], |row| track_from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    /// Get every track whose artists field contains `needle`.
    ///
    /// Matching uses SQLite's default LIKE collation: case-insensitive for
    /// ASCII ("drake" matches "Drake"), case-sensitive beyond it. LIKE
    /// metacharacters in the needle are escaped so they match literally.
    pub fn find_by_artist(&self, needle: &str) -> Result<Vec<Track>> {
        let pattern = format!("%{}%", escape_like(needle));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM songs WHERE artists LIKE ?1 ESCAPE '\\'"
        ))?;

        let tracks = stmt
            .query_map(params![pattern], |row| track_from_row(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    /// Get library statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_tracks: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;

        let distinct_artists: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT artists) FROM songs",
            [],
            |row| row.get(0),
        )?;

        let avg_tempo: Option<f64> =
            self.conn
                .query_row("SELECT AVG(tempo) FROM songs", [], |row| row.get(0))?;

        let avg_duration_ms: Option<f64> = self.conn.query_row(
            "SELECT AVG(duration_ms) FROM songs",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            total_tracks,
            distinct_artists,
            avg_tempo,
            avg_duration_ms,
        })
    }
}

/// Escape LIKE metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_track(id: &str, artists: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {id}"),
            artists: artists.to_string(),
            danceability: 0.672,
            energy: 0.815,
            key: 7,
            loudness: -7.105,
            mode: 1,
            speechiness: 0.0461,
            acousticness: 0.00242,
            instrumentalness: 0.000013,
            liveness: 0.107,
            valence: 0.384,
            tempo: 171.005,
            duration_ms: 213_827,
            time_signature: 4,
        }
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let db = Database::open_in_memory().unwrap();
        let t = test_track("6y0igZArWVi6Iz0rj35c1Y", "Drake");
        db.insert_tracks(std::slice::from_ref(&t)).unwrap();

        let stored = db.get_all().unwrap();
        assert_eq!(stored.len(), 1);
        // REAL columns hold IEEE doubles, so floats come back bit-exact
        assert_eq!(stored[0], t);
    }

    #[test]
    fn get_all_returns_every_row() {
        let db = Database::open_in_memory().unwrap();
        let tracks = vec![
            test_track("a", "Adele"),
            test_track("b", "Drake"),
            test_track("c", "Burial"),
        ];
        assert_eq!(db.insert_tracks(&tracks).unwrap(), 3);

        let mut ids: Vec<String> = db.get_all().unwrap().into_iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn insert_duplicate_id_rolls_back_batch() {
        let db = Database::open_in_memory().unwrap();
        let tracks = vec![
            test_track("t1", "Adele"),
            test_track("t2", "Drake"),
            test_track("t1", "Burial"),
        ];

        match db.insert_tracks(&tracks) {
            Err(DbError::DuplicateId { id }) => assert_eq!(id, "t1"),
            other => panic!("expected DuplicateId, got {other:?}"),
        }

        // Nothing from the failed batch is committed
        assert!(db.get_all().unwrap().is_empty());
    }

    #[test]
    fn duplicate_across_batches_leaves_first_batch_intact() {
        let db = Database::open_in_memory().unwrap();
        db.insert_tracks(&[test_track("t1", "Adele")]).unwrap();

        let err = db.insert_tracks(&[test_track("t1", "Drake")]);
        assert!(matches!(err, Err(DbError::DuplicateId { .. })));

        let stored = db.get_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].artists, "Adele");
    }

    #[test]
    fn find_matches_substring() {
        let db = Database::open_in_memory().unwrap();
        let tracks = vec![
            test_track("t1", "Drake"),
            test_track("t2", "Drake ft. Future"),
            test_track("t3", "Adele"),
        ];
        db.insert_tracks(&tracks).unwrap();

        let mut ids: Vec<String> = db
            .find_by_artist("Drake")
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["t1", "t2"]);
    }

    #[test]
    fn find_is_ascii_case_insensitive() {
        // Pins the chosen collation: SQLite's default LIKE ignores ASCII case
        let db = Database::open_in_memory().unwrap();
        db.insert_tracks(&[test_track("t1", "Drake")]).unwrap();

        assert_eq!(db.find_by_artist("drake").unwrap().len(), 1);
        assert_eq!(db.find_by_artist("DRAKE").unwrap().len(), 1);
        assert!(db.find_by_artist("Future").unwrap().is_empty());
    }

    #[test]
    fn find_escapes_like_metacharacters() {
        let db = Database::open_in_memory().unwrap();
        db.insert_tracks(&[
            test_track("t1", "100% Silk"),
            test_track("t2", "100x Silk"),
            test_track("t3", "A_B"),
            test_track("t4", "AxB"),
        ])
        .unwrap();

        let hits = db.find_by_artist("100%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "t1");

        let hits = db.find_by_artist("A_B").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "t3");
    }

    #[test]
    fn stats_on_empty_library() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total_tracks, 0);
        assert_eq!(stats.distinct_artists, 0);
        assert!(stats.avg_tempo.is_none());
    }

    #[test]
    fn stats_counts_tracks_and_artists() {
        let db = Database::open_in_memory().unwrap();
        db.insert_tracks(&[
            test_track("t1", "Drake"),
            test_track("t2", "Drake"),
            test_track("t3", "Adele"),
        ])
        .unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_tracks, 3);
        assert_eq!(stats.distinct_artists, 2);
        assert!((stats.avg_tempo.unwrap() - 171.005).abs() < 1e-9);
    }
}
