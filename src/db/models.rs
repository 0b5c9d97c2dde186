/// One music track with its audio-feature scores.
///
/// Built once per CSV data row at load time; rows read back from the
/// database are freshly constructed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Free-text artist list ("Drake ft. Future"), stored as a single
    /// opaque string. Substring search operates on this raw text.
    pub artists: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: i64,
    pub time_signature: i64,
}

impl Track {
    /// Track length in minutes (for display).
    pub fn duration_min(&self) -> f64 {
        self.duration_ms as f64 / 60_000.0
    }
}

/// Library statistics.
#[derive(Debug)]
pub struct StoreStats {
    pub total_tracks: i64,
    pub distinct_artists: i64,
    /// None when the library is empty.
    pub avg_tempo: Option<f64>,
    pub avg_duration_ms: Option<f64>,
}
