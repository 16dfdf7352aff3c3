//! # zpl2pdf
//!
//! Convert bundles of ZPL label files into one combined PDF using the
//! Labelary rendering API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ZIP upload
//!  │
//!  ├─ 1. Input     unpack entries in archive order
//!  ├─ 2. Extract   split .zpl/.txt files into labels on `~DGR:`
//!  ├─ 3. Track     record {labels, time} under the caller's job id
//!  ├─ 4. Render    Labelary calls in rate-limited concurrent batches
//!  ├─ 5. Assemble  merge every label's pages, in order, into one PDF
//!  └─ 6. Package   combined.pdf inside a max-compression ZIP
//! ```
//!
//! A label the service rejects does not stop its batch: a text placeholder
//! takes its slot. With the default [`AssemblyPolicy::Strict`] that
//! placeholder then fails the merge, so the job reports an error instead of
//! returning a PDF with a hole in it. [`AssemblyPolicy::SkipInvalid`] drops
//! such labels instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zpl2pdf::{convert_archive, ConversionConfig, ConversionContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().delay_ms(500).build()?;
//!     let ctx = ConversionContext::new(&config)?;
//!     let bytes = std::fs::read("labels.zip")?;
//!     let output = convert_archive(&bytes, "job-1", &config, &ctx).await?;
//!     std::fs::write("converted.zip", &output.archive)?;
//!     eprintln!("{} pages", output.stats.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | axum router for `/upload` and `/status/:id` |
//! | `cli`    | on      | The `zpl2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;
pub mod tracker;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AssemblyPolicy, ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert_archive, convert_archive_sync, convert_archive_to_file, convert_entries,
    convert_labels, ConversionContext,
};
pub use error::{LabelError, ZplError};
pub use output::{ArchiveEntry, ConversionResult, JobOutput, JobStats, LabelUnit};
pub use pipeline::batch::{Pacer, RateLimit, TokioPacer};
pub use pipeline::render::{LabelRenderer, LabelaryRenderer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use tracker::{MemoryProgressStore, ProgressEntry, ProgressStore};
