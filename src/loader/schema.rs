use crate::db::models::Track;
use csv::StringRecord;
use thiserror::Error;

/// Semantic type of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Float,
    Int,
}

/// One column of the expected track layout.
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The fixed track layout, in file order. This one table drives header
/// validation, positional field parsing, and error messages.
pub const COLUMNS: [Column; 16] = [
    Column { name: "id", kind: FieldKind::Text },
    Column { name: "name", kind: FieldKind::Text },
    Column { name: "artists", kind: FieldKind::Text },
    Column { name: "danceability", kind: FieldKind::Float },
    Column { name: "energy", kind: FieldKind::Float },
    Column { name: "key", kind: FieldKind::Int },
    Column { name: "loudness", kind: FieldKind::Float },
    Column { name: "mode", kind: FieldKind::Int },
    Column { name: "speechiness", kind: FieldKind::Float },
    Column { name: "acousticness", kind: FieldKind::Float },
    Column { name: "instrumentalness", kind: FieldKind::Float },
    Column { name: "liveness", kind: FieldKind::Float },
    Column { name: "valence", kind: FieldKind::Float },
    Column { name: "tempo", kind: FieldKind::Float },
    Column { name: "duration_ms", kind: FieldKind::Int },
    Column { name: "time_signature", kind: FieldKind::Int },
];

#[derive(Error, Debug)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("column {column}: \"{value}\" is not a valid number")]
    Numeric { column: &'static str, value: String },
}

/// Integer columns may arrive in float notation with a trailing ".0"
/// ("4.0" for a 4/4 time signature). Exactly one such suffix is stripped
/// before parsing; any other fractional text is an error, never truncated.
pub fn parse_int(text: &str) -> Result<i64, std::num::ParseIntError> {
    text.strip_suffix(".0").unwrap_or(text).parse()
}

fn float_at(record: &StringRecord, idx: usize) -> Result<f64, RowError> {
    let raw = &record[idx];
    raw.parse().map_err(|_| RowError::Numeric {
        column: COLUMNS[idx].name,
        value: raw.to_string(),
    })
}

fn int_at(record: &StringRecord, idx: usize) -> Result<i64, RowError> {
    let raw = &record[idx];
    parse_int(raw).map_err(|_| RowError::Numeric {
        column: COLUMNS[idx].name,
        value: raw.to_string(),
    })
}

/// Convert one CSV data row into a [`Track`] by column position.
pub fn row_to_track(record: &StringRecord) -> Result<Track, RowError> {
    if record.len() != COLUMNS.len() {
        return Err(RowError::FieldCount {
            expected: COLUMNS.len(),
            found: record.len(),
        });
    }

    Ok(Track {
        id: record[0].to_string(),
        name: record[1].to_string(),
        artists: record[2].to_string(),
        danceability: float_at(record, 3)?,
        energy: float_at(record, 4)?,
        key: int_at(record, 5)?,
        loudness: float_at(record, 6)?,
        mode: int_at(record, 7)?,
        speechiness: float_at(record, 8)?,
        acousticness: float_at(record, 9)?,
        instrumentalness: float_at(record, 10)?,
        liveness: float_at(record, 11)?,
        valence: float_at(record, 12)?,
        tempo: float_at(record, 13)?,
        duration_ms: int_at(record, 14)?,
        time_signature: int_at(record, 15)?,
    })
}
