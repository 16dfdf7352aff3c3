//! Result packaging: wrap the combined PDF in a single-entry ZIP.

use crate::error::ZplError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compress `document` into an in-memory ZIP holding one entry, `entry_name`.
///
/// `level` is the Deflate level (0–9).
pub fn package_document(document: &[u8], entry_name: &str, level: i64) -> Result<Vec<u8>, ZplError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(document.len() / 2)));
    writer
        .start_file(entry_name, options)
        .map_err(|e| ZplError::PackagingFailed(e.to_string()))?;
    writer
        .write_all(document)
        .map_err(|e| ZplError::PackagingFailed(e.to_string()))?;

    let cursor = writer
        .finish()
        .map_err(|e| ZplError::PackagingFailed(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn single_deflated_entry() {
        let doc = b"%PDF-1.5 ".repeat(200);
        let zipped = package_document(&doc, "combined.pdf", 9).unwrap();
        assert!(zipped.len() < doc.len());

        let mut archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut file = archive.by_index(0).unwrap();
        assert_eq!(file.name(), "combined.pdf");
        assert_eq!(file.compression(), CompressionMethod::Deflated);

        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn empty_document_still_packages() {
        let zipped = package_document(b"", "combined.pdf", 9).unwrap();
        let archive = ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 1);
    }
}
