//! Rate-limited batch dispatch of labels to the rendering service.
//!
//! Labels are cut into consecutive batches of `batch_size`. Batches run one
//! after another; the labels inside a batch are rendered concurrently and the
//! batch finishes only when every call has returned. After each batch,
//! including the last, the converter pauses for `delay` through a [`Pacer`],
//! which keeps the call rate under the service's limits.
//!
//! A failed render never fails the job here. The label's slot is filled with
//! a text placeholder naming the label and the reason, and processing goes on.

use crate::output::{ConversionResult, LabelUnit};
use crate::pipeline::render::LabelRenderer;
use crate::progress::ConversionProgressCallback;
use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

/// Batch size and the pause that follows every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    batch_size: usize,
    delay: Duration,
}

impl RateLimit {
    /// A zero batch size is raised to 1.
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of batches needed for `labels` units.
    pub fn batch_count(&self, labels: usize) -> usize {
        labels.div_ceil(self.batch_size)
    }

    /// Sizes of the consecutive batches for `labels` units.
    pub fn batch_sizes(&self, labels: usize) -> Vec<usize> {
        (0..self.batch_count(labels))
            .map(|b| (labels - b * self.batch_size).min(self.batch_size))
            .collect()
    }
}

/// Waits between batches.
///
/// Injected so tests can observe the schedule without real time passing.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// [`Pacer`] that sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Everything the converter produced for one job.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// One result per input label, in input order.
    pub results: Vec<ConversionResult>,
    /// How many of those results are failure placeholders.
    pub failed: usize,
    pub batches: usize,
}

/// Render every label under the given rate limit.
pub async fn convert_batched(
    units: &[LabelUnit],
    renderer: &dyn LabelRenderer,
    rate: &RateLimit,
    pacer: &dyn Pacer,
    progress: Option<&dyn ConversionProgressCallback>,
) -> BatchOutput {
    let total = units.len();
    let total_batches = rate.batch_count(total);
    let mut results = Vec::with_capacity(total);
    let mut failed = 0;

    if let Some(cb) = progress {
        cb.on_conversion_start(total, total_batches);
    }

    for (batch_idx, chunk) in units.chunks(rate.batch_size()).enumerate() {
        let offset = batch_idx * rate.batch_size();
        debug!(
            "Batch {}/{}: {} labels",
            batch_idx + 1,
            total_batches,
            chunk.len()
        );
        if let Some(cb) = progress {
            cb.on_batch_start(batch_idx + 1, total_batches, chunk.len());
        }

        let outcomes = join_all(
            chunk
                .iter()
                .enumerate()
                .map(|(i, unit)| convert_one(renderer, unit, offset + i + 1, total, progress)),
        )
        .await;

        for (result, ok) in outcomes {
            if !ok {
                failed += 1;
            }
            results.push(result);
        }

        pacer.pause(rate.delay()).await;
    }

    if let Some(cb) = progress {
        cb.on_conversion_complete(total, total - failed);
    }

    BatchOutput {
        results,
        failed,
        batches: total_batches,
    }
}

/// Render one label; the flag is `false` when a placeholder was produced.
async fn convert_one(
    renderer: &dyn LabelRenderer,
    unit: &LabelUnit,
    position: usize,
    total: usize,
    progress: Option<&dyn ConversionProgressCallback>,
) -> (ConversionResult, bool) {
    if let Some(cb) = progress {
        cb.on_label_start(position, total, &unit.output_name);
    }

    match renderer.render(&unit.content).await {
        Ok(payload) => {
            if let Some(cb) = progress {
                cb.on_label_complete(position, total, &unit.output_name, payload.len());
            }
            let result = ConversionResult {
                output_name: unit.output_name.clone(),
                payload,
            };
            (result, true)
        }
        Err(e) => {
            let reason = e.to_string();
            warn!(
                "Failed to convert {} - {}: {}",
                unit.output_name,
                unit.content.len(),
                reason
            );
            if let Some(cb) = progress {
                cb.on_label_error(position, total, &unit.output_name, &reason);
            }
            (ConversionResult::failed(&unit.output_name, &reason), false)
        }
    }
}
