//! Job entry points: run the whole pipeline for one uploaded bundle.
//!
//! A job reads the archive, extracts the labels, records a progress estimate
//! under the caller's job id, renders the labels batch by batch, merges the
//! PDFs and compresses the result. Input errors stop the job before any label
//! is rendered; render errors are absorbed by the batch converter; assembly
//! and packaging errors abort the job.

use crate::config::ConversionConfig;
use crate::error::ZplError;
use crate::output::{ArchiveEntry, JobOutput, JobStats, LabelUnit};
use crate::pipeline::batch::{self, Pacer, TokioPacer};
use crate::pipeline::render::{LabelRenderer, LabelaryRenderer};
use crate::pipeline::{assemble, extract, input, package};
use crate::tracker::{MemoryProgressStore, ProgressStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Collaborators shared by every job: the renderer, the progress store and
/// the pacer that spaces batches.
#[derive(Clone)]
pub struct ConversionContext {
    pub renderer: Arc<dyn LabelRenderer>,
    pub progress: Arc<dyn ProgressStore>,
    pub pacer: Arc<dyn Pacer>,
}

impl ConversionContext {
    /// Labelary renderer, in-memory progress store and tokio sleeps.
    pub fn new(config: &ConversionConfig) -> Result<Self, ZplError> {
        let renderer = LabelaryRenderer::from_config(config)
            .map_err(|e| ZplError::InvalidConfig(format!("renderer: {e}")))?;
        Ok(Self {
            renderer: Arc::new(renderer),
            progress: Arc::new(MemoryProgressStore::new()),
            pacer: Arc::new(TokioPacer),
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn LabelRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_progress_store(mut self, progress: Arc<dyn ProgressStore>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }
}

/// Convert an uploaded ZIP archive into a ZIP holding `combined.pdf`.
///
/// # Errors
/// - [`ZplError::InvalidArchive`] when `bytes` is not a readable ZIP
/// - [`ZplError::AssemblyFailed`] when a label failed to render and the
///   assembly policy is strict
/// - [`ZplError::PackagingFailed`] when serialisation or compression fails
pub async fn convert_archive(
    bytes: &[u8],
    job_id: &str,
    config: &ConversionConfig,
    ctx: &ConversionContext,
) -> Result<JobOutput, ZplError> {
    let entries = input::read_archive(bytes)?;
    convert_entries(&entries, job_id, config, ctx).await
}

/// Same as [`convert_archive`] for entries that were already unpacked.
pub async fn convert_entries(
    entries: &[ArchiveEntry],
    job_id: &str,
    config: &ConversionConfig,
    ctx: &ConversionContext,
) -> Result<JobOutput, ZplError> {
    let units = extract::extract_labels(entries);
    info!(
        "Job '{}': {} labels from {} entries",
        job_id,
        units.len(),
        entries.len()
    );

    ctx.progress.record(job_id, units.len(), config.delay_ms);

    convert_labels(&units, config, ctx).await
}

/// Render, merge and package already-extracted labels.
pub async fn convert_labels(
    units: &[LabelUnit],
    config: &ConversionConfig,
    ctx: &ConversionContext,
) -> Result<JobOutput, ZplError> {
    let start = Instant::now();
    let rate = config.rate_limit();

    let converted = batch::convert_batched(
        units,
        ctx.renderer.as_ref(),
        &rate,
        ctx.pacer.as_ref(),
        config.progress_callback.as_deref(),
    )
    .await;
    debug!(
        "Rendered {} labels in {} batches ({} failed)",
        converted.results.len(),
        converted.batches,
        converted.failed
    );

    let policy = config.assembly;
    let entry_name = config.entry_name.clone();
    let level = config.compression_level;
    let results = converted.results;

    // lopdf and deflate are CPU-bound; keep them off the runtime workers.
    let (combined, archive) = tokio::task::spawn_blocking(move || {
        let combined = assemble::combine_pdfs(&results, policy)?;
        let archive = package::package_document(&combined.bytes, &entry_name, level)?;
        Ok::<_, ZplError>((combined, archive))
    })
    .await
    .map_err(|e| ZplError::Internal(format!("Assembly task panicked: {}", e)))??;

    let stats = JobStats {
        labels: units.len(),
        failed_labels: converted.failed,
        pages: combined.pages,
        batches: converted.batches,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Job complete: {} pages from {} labels, {} bytes zipped, {}ms",
        stats.pages,
        stats.labels,
        archive.len(),
        stats.duration_ms
    );

    Ok(JobOutput { archive, stats })
}

/// Convert a local archive and write the result to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_archive_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
    ctx: &ConversionContext,
) -> Result<JobStats, ZplError> {
    let input_path = input_path.as_ref();
    let entries = input::load_archive(input_path).await?;
    let job_id = input_path.display().to_string();
    let output = convert_entries(&entries, &job_id, config, ctx).await?;
    // Local runs have no status poller.
    ctx.progress.take(&job_id);

    let path = output_path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ZplError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("zip.tmp");
    tokio::fs::write(&tmp_path, &output.archive)
        .await
        .map_err(|e| ZplError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ZplError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert_archive`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_archive_sync(
    bytes: &[u8],
    job_id: &str,
    config: &ConversionConfig,
    ctx: &ConversionContext,
) -> Result<JobOutput, ZplError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ZplError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_archive(bytes, job_id, config, ctx))
}
