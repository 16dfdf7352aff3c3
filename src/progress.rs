//! Progress-callback trait for per-label conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the batch converter works through a job. The CLI uses it to
//! drive a terminal progress bar; the HTTP surface does not install one and
//! relies on the coarse estimate in [`crate::tracker`] instead.
//!
//! # Example
//!
//! ```rust
//! use zpl2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_label_complete(&self, position: usize, total: usize, output_name: &str, bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{output_name} ({position}/{total}): {bytes} bytes");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch converter as it processes each label.
///
/// All methods default to no-ops. Labels inside one batch render
/// concurrently, so the per-label methods may be called from several tasks
/// at once; implementations must synchronise their own state.
///
/// `position` arguments are 1-based positions in the job's label sequence.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first batch is dispatched.
    fn on_conversion_start(&self, total_labels: usize, total_batches: usize) {
        let _ = (total_labels, total_batches);
    }

    /// Called when a batch is about to be dispatched (1-based).
    fn on_batch_start(&self, batch: usize, total_batches: usize, size: usize) {
        let _ = (batch, total_batches, size);
    }

    /// Called just before the render request for a label is sent.
    fn on_label_start(&self, position: usize, total: usize, output_name: &str) {
        let _ = (position, total, output_name);
    }

    /// Called when the rendering service returned a document.
    fn on_label_complete(&self, position: usize, total: usize, output_name: &str, bytes: usize) {
        let _ = (position, total, output_name, bytes);
    }

    /// Called when the render call failed and a placeholder took its slot.
    fn on_label_error(&self, position: usize, total: usize, output_name: &str, error: &str) {
        let _ = (position, total, output_name, error);
    }

    /// Called once after every batch has finished.
    fn on_conversion_complete(&self, total_labels: usize, success_count: usize) {
        let _ = (total_labels, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
