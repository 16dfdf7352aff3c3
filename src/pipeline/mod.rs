//! Pipeline stages for ZPL-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the network-facing one can be stubbed out.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ batch/render ──▶ assemble ──▶ package
//! (ZIP)      (~DGR:)     (Labelary)       (lopdf)      (ZIP)
//! ```
//!
//! 1. [`input`]    — unpack the uploaded archive, keeping entry order
//! 2. [`extract`]  — split `.zpl`/`.txt` entries into label units
//! 3. [`batch`]    — rate-limited dispatch; per-label failures become
//!    placeholders. [`render`] is the only stage with network I/O
//! 4. [`assemble`] — merge per-label PDFs into one document
//! 5. [`package`]  — compress the combined PDF for download

pub mod assemble;
pub mod batch;
pub mod extract;
pub mod input;
pub mod package;
pub mod render;
