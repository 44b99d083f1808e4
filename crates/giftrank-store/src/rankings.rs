//! Ranking snapshot (`rankings.json`) and raw ranking-source records.

use std::path::Path;

use giftrank_core::{RankSignals, RawRankRecord};

use crate::error::StoreError;
use crate::snapshot::{load_or_default, read_json, write_json_atomic};

/// Reads the ranking snapshot at `path`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read or
/// [`StoreError::Parse`] if it is not a JSON array of keyword entries.
pub fn read_rank_signals(path: &Path) -> Result<RankSignals, StoreError> {
    let signals: RankSignals = read_json(path)?;
    tracing::debug!(path = %path.display(), keywords = signals.len(), "loaded ranking snapshot");
    Ok(signals)
}

/// Reads the ranking snapshot, treating a missing or malformed file as an
/// empty store.
#[must_use]
pub fn load_rank_signals_or_default(path: &Path) -> RankSignals {
    load_or_default(path, "rankings", read_rank_signals)
}

/// Overwrites the ranking snapshot at `path` in full. Ranking snapshots are
/// never merged with their predecessor.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Serialize`] on failure.
pub fn write_rank_signals(path: &Path, signals: &RankSignals) -> Result<(), StoreError> {
    write_json_atomic(path, signals)?;
    tracing::info!(path = %path.display(), keywords = signals.len(), "wrote ranking snapshot");
    Ok(())
}

/// Reads raw ranking-source records from a JSON array file.
///
/// Elements that are not objects of the expected shape are dropped here;
/// field-level validation happens in [`giftrank_core::build_rank_signals`].
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read or
/// [`StoreError::Parse`] if the top level is not a JSON array.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRankRecord>, StoreError> {
    let values: Vec<serde_json::Value> = read_json(path)?;
    let total = values.len();
    let records: Vec<RawRankRecord> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if records.len() < total {
        tracing::debug!(
            path = %path.display(),
            total,
            kept = records.len(),
            "dropped non-record elements from raw ranking file"
        );
    }
    Ok(records)
}
