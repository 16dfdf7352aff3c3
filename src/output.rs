//! Data carried between pipeline stages and returned to callers.

use serde::{Deserialize, Serialize};

/// One named file inside an uploaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full entry path as stored in the archive (may contain `/`).
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A single printable label's ZPL source, cut out of a larger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelUnit {
    /// Name of the archive entry the label came from.
    pub source_name: String,
    /// Zero-based position among the surviving fragments of that entry.
    pub sequence_index: usize,
    /// `<source without .zpl/.txt>_part<sequence_index + 1>.pdf`
    pub output_name: String,
    /// ZPL text, terminated with `^XZ`.
    pub content: String,
}

/// The rendered PDF for one label, or the diagnostic text standing in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output_name: String,
    pub payload: Vec<u8>,
}

impl ConversionResult {
    /// Placeholder used when the rendering service failed for a label.
    pub fn failed(output_name: &str, reason: &str) -> Self {
        Self {
            output_name: output_name.to_string(),
            payload: format!("Failed to convert {output_name}: {reason}").into_bytes(),
        }
    }
}

/// Aggregate statistics for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    /// Labels extracted from the archive.
    pub labels: usize,
    /// Labels whose render call failed.
    pub failed_labels: usize,
    /// Pages in the combined PDF.
    pub pages: usize,
    /// Batches dispatched to the rendering service.
    pub batches: usize,
    /// Wall-clock time for the whole job.
    pub duration_ms: u64,
}

/// The packaged artifact plus statistics.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// ZIP archive bytes holding the combined PDF.
    pub archive: Vec<u8>,
    pub stats: JobStats,
}
