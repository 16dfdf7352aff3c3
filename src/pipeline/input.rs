//! Input resolution: turn uploaded bytes into the archive's named entries.
//!
//! The entry order returned here becomes the final page order, so entries are
//! yielded exactly as the ZIP central directory lists them. Directory entries
//! carry no data and are skipped.

use crate::error::ZplError;
use crate::output::ArchiveEntry;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Local file header / end-of-central-directory signatures both start with `PK`.
const ZIP_MAGIC: &[u8; 2] = b"PK";

/// Read every file entry of a ZIP archive held in memory.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ZplError> {
    if bytes.len() < ZIP_MAGIC.len() || &bytes[..ZIP_MAGIC.len()] != ZIP_MAGIC {
        let head: Vec<u8> = bytes.iter().take(4).copied().collect();
        return Err(ZplError::InvalidArchive {
            detail: format!("not a ZIP archive (first bytes: {head:?})"),
        });
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| ZplError::InvalidArchive {
        detail: e.to_string(),
    })?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| ZplError::InvalidArchive {
            detail: format!("entry #{i}: {e}"),
        })?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        // The declared size comes from the uploader; grow with the real data.
        let declared = file.size();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| ZplError::InvalidArchive {
                detail: format!("entry '{name}': {e}"),
            })?;
        if data.len() as u64 != declared {
            return Err(ZplError::InvalidArchive {
                detail: format!(
                    "entry '{name}': declares {declared} bytes but holds {}",
                    data.len()
                ),
            });
        }

        debug!("Archive entry '{}' ({} bytes)", name, data.len());
        entries.push(ArchiveEntry { name, data });
    }

    Ok(entries)
}

/// Read and unpack an archive from the local file system.
///
/// Decompression runs in `spawn_blocking`; large archives would otherwise
/// stall a runtime worker.
pub async fn load_archive(path: &Path) -> Result<Vec<ArchiveEntry>, ZplError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ZplError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::task::spawn_blocking(move || read_archive(&bytes))
        .await
        .map_err(|e| ZplError::Internal(format!("Archive task panicked: {}", e)))?
}
