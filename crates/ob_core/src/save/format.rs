//! Tournament export framing.
//!
//! MessagePack with named fields, LZ4 compressed (size prepended), with a
//! SHA-256 checksum suffix and a version gate on read.

use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ExportError;
use super::EXPORT_VERSION;
use crate::store::TournamentState;

const CHECKSUM_LEN: usize = 32;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TournamentExport {
    /// Export format version for migration
    pub version: u32,

    /// Export timestamp (unix milliseconds)
    pub exported_at: i64,

    pub state: TournamentState,
}

impl TournamentExport {
    pub fn new(state: TournamentState) -> Self {
        Self { version: EXPORT_VERSION, exported_at: chrono::Utc::now().timestamp_millis(), state }
    }
}

/// Serialize and compress an export
pub fn serialize_and_compress(export: &TournamentExport) -> Result<Vec<u8>, ExportError> {
    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(export)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize an export
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<TournamentExport, ExportError> {
    // Check minimum size (header + checksum)
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(ExportError::Corrupted);
    }

    // Split payload and checksum
    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    // Verify checksum
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated = hasher.finalize();
    if &calculated[..] != checksum_bytes {
        return Err(ExportError::ChecksumMismatch);
    }

    // Decompress
    let msgpack = decompress_size_prepended(payload).map_err(|_| ExportError::Decompression)?;

    // Deserialize
    let export: TournamentExport = from_slice(&msgpack)?;

    // Validate version
    if export.version > EXPORT_VERSION {
        return Err(ExportError::VersionMismatch {
            found: export.version,
            expected: EXPORT_VERSION,
        });
    }

    Ok(export)
}

pub fn write_export<P: AsRef<Path>>(path: P, export: &TournamentExport) -> Result<(), ExportError> {
    let bytes = serialize_and_compress(export)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn read_export<P: AsRef<Path>>(path: P) -> Result<TournamentExport, ExportError> {
    let bytes = std::fs::read(path)?;
    decompress_and_deserialize(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RankCriterion, RuleChain, Tournament};

    fn export() -> TournamentExport {
        let chain = RuleChain::new(vec![RankCriterion::Points, RankCriterion::Manual]);
        TournamentExport::new(TournamentState {
            tournament: Tournament::new("Export Cup", "football", chain.clone(), chain),
            teams: Vec::new(),
            blocks: Vec::new(),
            matches: Vec::new(),
            overrides: Vec::new(),
            orderings: Vec::new(),
        })
    }

    #[test]
    fn roundtrip() {
        let original = export();
        let bytes = serialize_and_compress(&original).unwrap();
        let restored = decompress_and_deserialize(&bytes).unwrap();
        assert_eq!(restored.state, original.state);
        assert_eq!(restored.version, EXPORT_VERSION);
    }

    #[test]
    fn checksum_detects_corruption() {
        let bytes = {
            let mut b = serialize_and_compress(&export()).unwrap();
            let mid = b.len() / 2;
            b[mid] ^= 0xff;
            b
        };
        assert!(matches!(
            decompress_and_deserialize(&bytes),
            Err(ExportError::ChecksumMismatch)
        ));
    }

    #[test]
    fn truncated_input_is_corrupted() {
        assert!(matches!(decompress_and_deserialize(&[0u8; 10]), Err(ExportError::Corrupted)));
    }

    #[test]
    fn newer_version_rejected() {
        let mut newer = export();
        newer.version = EXPORT_VERSION + 1;
        let bytes = serialize_and_compress(&newer).unwrap();
        assert!(matches!(
            decompress_and_deserialize(&bytes),
            Err(ExportError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cup.obx");

        let original = export();
        write_export(&path, &original).unwrap();
        let restored = read_export(&path).unwrap();
        assert_eq!(restored.state, original.state);
    }
}
