//! Flat CSV snapshots of normalized records
//!
//! Dates are written as ISO `YYYY-MM-DD` and decimals as plain strings, so
//! every field round-trips without loss. Files are replaced whole.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp_path)
            .with_context(|| format!("Failed to create snapshot {:?}", tmp_path))?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to finalize snapshot {:?}", path))?;

    debug!("Wrote {} rows to {:?}", records.len(), path);
    Ok(())
}

pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open snapshot {:?}", path))?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to read snapshot {:?}", path))?;

    debug!("Read {} rows from {:?}", records.len(), path);
    Ok(records)
}
