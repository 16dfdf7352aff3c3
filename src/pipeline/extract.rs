//! Label extraction: cut ZPL files into one unit per printable label.
//!
//! Label exports concatenate many labels into one file, each introduced by a
//! `~DGR:` graphic download. The file is split *before* every marker so the
//! marker stays at the head of its own fragment; text ahead of the first
//! marker forms a fragment of its own.

use crate::output::{ArchiveEntry, LabelUnit};
use tracing::debug;

/// Marker that opens every label in the exported files.
pub const START_MARKER: &str = "~DGR:";

/// Terminator appended to every fragment.
pub const END_MARKER: &str = "^XZ";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Entry suffixes treated as label sources.
pub const SOURCE_SUFFIXES: [&str; 2] = [".zpl", ".txt"];

/// Extract label units from archive entries, in entry order then split order.
///
/// Entries whose names do not end in `.zpl` or `.txt` are ignored; an archive
/// with no such entry yields an empty vector.
pub fn extract_labels(entries: &[ArchiveEntry]) -> Vec<LabelUnit> {
    let mut units = Vec::new();

    for entry in entries {
        let Some(stem) = source_stem(&entry.name) else {
            continue;
        };

        let content = String::from_utf8_lossy(&entry.data);
        let labels = split_labels(&content);
        debug!("'{}': {} labels", entry.name, labels.len());

        units.extend(labels.into_iter().enumerate().map(|(index, content)| LabelUnit {
            source_name: entry.name.clone(),
            sequence_index: index,
            output_name: output_name(stem, index),
            content,
        }));
    }

    units
}

/// Split one file's text into terminated label fragments.
pub fn split_labels(content: &str) -> Vec<String> {
    split_before_marker(content)
        .into_iter()
        .filter(|fragment| {
            let trimmed = fragment.trim_matches(is_blank);
            !trimmed.is_empty() && trimmed != "\""
        })
        .map(|fragment| format!("{}{}", fragment.replacen('\n', "", 1), END_MARKER))
        .collect()
}

/// Whitespace, plus the byte-order mark editors prepend to text files.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

/// Zero-width split ahead of every [`START_MARKER`].
fn split_before_marker(content: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for (pos, _) in content.match_indices(START_MARKER) {
        if pos > start {
            fragments.push(&content[start..pos]);
            start = pos;
        }
    }
    fragments.push(&content[start..]);
    fragments
}

/// Entry name with its label suffix removed, or `None` for other files.
fn source_stem(name: &str) -> Option<&str> {
    SOURCE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
}

fn output_name(stem: &str, index: usize) -> String {
    format!("{}_part{}.pdf", stem, index + 1)
}
