pub mod schema;

use crate::db::models::Track;
use crate::db::{self, Database};
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use schema::{COLUMNS, RowError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("file is empty (no header row)")]
    Empty,
    #[error("header does not match the expected track schema: {0}")]
    SchemaMismatch(String),
    #[error("{} row(s) failed to parse", .0.len())]
    Rows(Vec<BadRow>),
    #[error("database error: {0}")]
    Db(#[from] db::DbError),
}

/// A data row that failed conversion, with its 1-based CSV line number.
#[derive(Debug)]
pub struct BadRow {
    pub line: u64,
    pub error: RowError,
}

/// A parsed CSV file: the header fields plus every data row with the line
/// number it started on.
pub struct CsvFile {
    pub header: Vec<String>,
    pub rows: Vec<(u64, StringRecord)>,
}

/// Read the whole file at `path`, splitting it into a header row and data
/// rows. The first physical row is always the header; a file with no rows
/// at all fails with [`LoadError::Empty`].
pub fn parse_file(path: &Path, delimiter: u8) -> Result<CsvFile, LoadError> {
    let file = std::fs::File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        // Arity is checked per-row in row_to_track so every short or long
        // row can be reported, not just the first
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(LoadError::Empty),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        rows.push((line, record));
    }

    Ok(CsvFile { header, rows })
}

/// Validate the header against the expected column names, by position and
/// ignoring ASCII case.
pub fn check_header(header: &[String]) -> Result<(), LoadError> {
    if header.len() != COLUMNS.len() {
        return Err(LoadError::SchemaMismatch(format!(
            "expected {} columns, found {}",
            COLUMNS.len(),
            header.len()
        )));
    }

    for (idx, (got, want)) in header.iter().zip(COLUMNS.iter()).enumerate() {
        if !got.trim().eq_ignore_ascii_case(want.name) {
            return Err(LoadError::SchemaMismatch(format!(
                "column {} is \"{}\", expected \"{}\"",
                idx + 1,
                got.trim(),
                want.name
            )));
        }
    }

    Ok(())
}

/// Parse the CSV file at `path` into tracks.
///
/// Every failed row is collected with its line number and reported together
/// as [`LoadError::Rows`]; tracks are returned only if the whole file
/// converted cleanly.
pub fn load_tracks(path: &Path, delimiter: u8) -> Result<Vec<Track>, LoadError> {
    let parsed = parse_file(path, delimiter)?;
    check_header(&parsed.header)?;

    let mut tracks = Vec::with_capacity(parsed.rows.len());
    let mut bad = Vec::new();
    for (line, record) in &parsed.rows {
        match schema::row_to_track(record) {
            Ok(track) => tracks.push(track),
            Err(error) => bad.push(BadRow { line: *line, error }),
        }
    }

    if !bad.is_empty() {
        log::warn!("{}: {} of {} rows failed to parse", path.display(), bad.len(), parsed.rows.len());
        return Err(LoadError::Rows(bad));
    }

    Ok(tracks)
}

pub struct LoadSummary {
    pub inserted: usize,
}

/// Parse the CSV file at `path` and insert every track into the database.
///
/// All inserts run in a single transaction: a duplicate id or any database
/// failure rolls back the whole batch.
pub fn load_into(db: &Database, path: &Path, delimiter: u8) -> Result<LoadSummary, LoadError> {
    let tracks = load_tracks(path, delimiter)?;

    let pb = ProgressBar::new(tracks.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb.set_message("Inserting...");

    let tx = db.conn.unchecked_transaction().map_err(db::DbError::from)?;
    for track in &tracks {
        db::queries::insert_track_row(&tx, track)?;
        pb.inc(1);
    }
    tx.commit().map_err(db::DbError::from)?;

    pb.finish_with_message(format!("Done: {} tracks", tracks.len()));

    Ok(LoadSummary {
        inserted: tracks.len(),
    })
}
