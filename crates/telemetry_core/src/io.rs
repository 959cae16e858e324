//! Step table persistence.
//!
//! Two formats: pretty JSON for inspection and hand-written fixtures, and
//! a MessagePack + LZ4 cache with a SHA-256 checksum for the large merged
//! tables. A missing input file is the one fatal error in the pipeline,
//! so these loaders propagate with context instead of recovering.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::table::StepTable;

/// Metadata describing one cache export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// SHA-256 of the compressed bytes, hex encoded.
    pub checksum: String,
    /// RFC3339 creation time.
    pub created_at: String,
    /// MessagePack size before compression (bytes).
    pub raw_size: u64,
    /// Size on disk after LZ4 (bytes).
    pub compressed_size: u64,
    /// compressed / raw.
    pub compression_ratio: f64,
}

/// Load a step table from JSON.
pub fn load_table_json(path: impl AsRef<Path>) -> Result<StepTable> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table file: {}", path.display()))?;
    let table: StepTable =
        serde_json::from_str(&data).context("Failed to parse step table JSON")?;
    log::info!(
        "Loaded step table: {} rows, {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Save a step table as pretty JSON.
pub fn save_table_json(table: &StepTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(table)?;
    fs::write(path, data)
        .with_context(|| format!("Failed to write table file: {}", path.display()))?;
    Ok(())
}

/// Export a step table as MessagePack + LZ4 and return export metadata.
pub fn export_table_cache(table: &StepTable, path: impl AsRef<Path>) -> Result<ExportMetadata> {
    let path = path.as_ref();

    let msgpack = rmp_serde::to_vec(table).context("Failed to serialize table to MessagePack")?;
    let raw_size = msgpack.len() as u64;

    let compressed = lz4_flex::compress_prepend_size(&msgpack);
    let compressed_size = compressed.len() as u64;

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = format!("{:x}", hasher.finalize());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(path, &compressed)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))?;
    log::info!(
        "Exported table cache: {} -> {} bytes ({:.1}% of raw)",
        raw_size,
        compressed_size,
        compressed_size as f64 / raw_size as f64 * 100.0
    );

    Ok(ExportMetadata {
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        raw_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / raw_size as f64,
    })
}

/// Load a step table from a MessagePack + LZ4 cache.
pub fn load_table_cache(path: impl AsRef<Path>) -> Result<StepTable> {
    let path = path.as_ref();
    let compressed = fs::read(path)
        .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
    let msgpack =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;
    let table: StepTable =
        rmp_serde::from_slice(&msgpack).context("Failed to deserialize table from MessagePack")?;
    Ok(table)
}

/// Check a cache file against an expected checksum.
pub fn verify_table_cache(path: impl AsRef<Path>, expected_checksum: &str) -> Result<bool> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let actual = format!("{:x}", hasher.finalize());
    Ok(actual == expected_checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn sample_table() -> StepTable {
        let mut t = StepTable::new();
        t.push_row(0.0).unwrap();
        t.push_row(0.008).unwrap();
        t.register_columns(["teams.team1.player1.id", "x"]);
        t.set(0, "teams.team1.player1.id", CellValue::Text("p1".to_string())).unwrap();
        t.set(1, "x", CellValue::Float(1.5)).unwrap();
        t
    }

    #[test]
    fn test_json_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");

        let table = sample_table();
        save_table_json(&table, &path).unwrap();
        let loaded = load_table_json(&path).unwrap();

        assert_eq!(loaded.times(), table.times());
        assert_eq!(loaded.get(1, "x"), Some(&CellValue::Float(1.5)));
    }

    #[test]
    fn test_cache_export_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.msgpack.lz4");

        let table = sample_table();
        let meta = export_table_cache(&table, &path).unwrap();

        assert!(meta.raw_size > 0);
        assert!(verify_table_cache(&path, &meta.checksum).unwrap());
        assert!(!verify_table_cache(&path, "deadbeef").unwrap());

        let loaded = load_table_cache(&path).unwrap();
        assert_eq!(loaded.times(), table.times());
        assert_eq!(
            loaded.get(0, "teams.team1.player1.id"),
            Some(&CellValue::Text("p1".to_string()))
        );
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = load_table_json("/nonexistent/table.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read table file"));
    }
}
