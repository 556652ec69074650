//! SQLite persistence of per-batch parametrization masks.
//!
//! The database holds one hex-encoded 64-bit mask per batch in the table
//! `masks(batch, paramset)`. A run may start from such a filter instead of
//! the full-width masks, and may write the accepted masks back for a later
//! refinement run.

use std::path::Path;

use rusqlite::Connection;

use grn_core::{ErrorInfo, Paramset, SynthError};

fn db_error(path: &Path, err: &rusqlite::Error) -> SynthError {
    SynthError::Io(
        ErrorInfo::new("sqlite", err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Reads the starting masks of all batches; the row count must match the
/// batch count derived from the model.
pub fn load_masks(path: &Path, expected_batches: u64) -> Result<Vec<Paramset>, SynthError> {
    let connection = Connection::open_with_flags(
        path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )
    .map_err(|err| db_error(path, &err))?;
    let mut statement = connection
        .prepare("SELECT batch, paramset FROM masks ORDER BY batch")
        .map_err(|err| db_error(path, &err))?;
    let rows = statement
        .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|err| db_error(path, &err))?;

    let mut masks = Vec::new();
    for row in rows {
        let (batch, encoded) = row.map_err(|err| db_error(path, &err))?;
        if batch != masks.len() as i64 {
            return Err(SynthError::BatchMismatch(
                ErrorInfo::new("filter-gap", "batch indices of the filter are not contiguous")
                    .with_context("expected", masks.len().to_string())
                    .with_context("found", batch.to_string()),
            ));
        }
        masks.push(decode_mask(&encoded)?);
    }
    if masks.len() as u64 != expected_batches {
        return Err(SynthError::BatchMismatch(
            ErrorInfo::new("filter-count", "filter row count differs from the batch count")
                .with_context("rows", masks.len().to_string())
                .with_context("batches", expected_batches.to_string()),
        ));
    }
    Ok(masks)
}

fn decode_mask(encoded: &str) -> Result<Paramset, SynthError> {
    let bytes = hex::decode(encoded).map_err(|_| {
        SynthError::BatchMismatch(
            ErrorInfo::new("filter-hex", "mask is not valid hex").with_context("mask", encoded),
        )
    })?;
    let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
        SynthError::BatchMismatch(
            ErrorInfo::new("filter-width", "mask is not 8 bytes wide").with_context("mask", encoded),
        )
    })?;
    Ok(Paramset::from_raw(u64::from_be_bytes(raw)))
}

/// Encodes a mask the way the filter database stores it.
pub fn encode_mask(mask: Paramset) -> String {
    hex::encode(mask.as_raw().to_be_bytes())
}

/// Writes accepted masks of the processed batches.
pub struct MaskWriter {
    connection: Connection,
    path: std::path::PathBuf,
}

impl MaskWriter {
    /// Opens (or creates) the database and prepares the table.
    pub fn create(path: &Path) -> Result<Self, SynthError> {
        let connection = Connection::open(path).map_err(|err| db_error(path, &err))?;
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS masks (batch INTEGER PRIMARY KEY, paramset TEXT NOT NULL)",
                [],
            )
            .map_err(|err| db_error(path, &err))?;
        Ok(Self {
            connection,
            path: path.to_path_buf(),
        })
    }

    /// Stores the mask of one batch, replacing any earlier row.
    pub fn store(&mut self, batch: u64, mask: Paramset) -> Result<(), SynthError> {
        self.connection
            .execute(
                "INSERT OR REPLACE INTO masks (batch, paramset) VALUES (?1, ?2)",
                rusqlite::params![batch as i64, encode_mask(mask)],
            )
            .map_err(|err| db_error(&self.path, &err))?;
        Ok(())
    }
}
