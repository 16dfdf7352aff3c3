//! Configuration types for ZPL-to-PDF conversion jobs.
//!
//! All job behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The HTTP layer derives a per-request copy with
//! the caller's `speed` applied, so one shared base config serves every job.

use crate::error::ZplError;
use crate::pipeline::batch::RateLimit;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Labelary endpoint for an 8 dpmm printer and a 4×6 inch label.
pub const DEFAULT_RENDERER_URL: &str = "http://api.labelary.com/v1/printers/8dpmm/labels/4x6/0/";

/// Per-label delay applied when the caller supplies none.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Name of the single entry inside the produced archive.
pub const DEFAULT_ENTRY_NAME: &str = "combined.pdf";

/// Configuration for one conversion job.
///
/// # Example
/// ```rust
/// use zpl2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .batch_size(2)
///     .delay_ms(250)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size, 2);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Number of labels rendered concurrently per batch. Default: 1.
    ///
    /// Labelary's free tier throttles per client; one label at a time with a
    /// one-second gap stays under its limits.
    pub batch_size: usize,

    /// Pause after every batch, in milliseconds. Default: 1000.
    ///
    /// Also drives the progress estimate (`labels × delay_ms / 1000`).
    pub delay_ms: u64,

    /// Rendering service endpoint. Default: [`DEFAULT_RENDERER_URL`].
    pub renderer_url: String,

    /// Per-request timeout for the rendering service. Default: none, the
    /// HTTP client's own behaviour applies.
    pub request_timeout_secs: Option<u64>,

    /// What the assembler does with payloads that are not PDFs.
    pub assembly: AssemblyPolicy,

    /// Deflate level for the output archive (0–9). Default: 9.
    pub compression_level: i64,

    /// File name of the combined PDF inside the archive.
    pub entry_name: String,

    /// Optional per-label progress hooks.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            delay_ms: DEFAULT_DELAY_MS,
            renderer_url: DEFAULT_RENDERER_URL.to_string(),
            request_timeout_secs: None,
            assembly: AssemblyPolicy::default(),
            compression_level: 9,
            entry_name: DEFAULT_ENTRY_NAME.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("batch_size", &self.batch_size)
            .field("delay_ms", &self.delay_ms)
            .field("renderer_url", &self.renderer_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("assembly", &self.assembly)
            .field("compression_level", &self.compression_level)
            .field("entry_name", &self.entry_name)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Batch size and inter-batch delay as a scheduler value.
    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::new(self.batch_size, Duration::from_millis(self.delay_ms))
    }

    /// Copy of this config with a different per-label delay.
    pub fn with_delay_ms(&self, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..self.clone()
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.config.delay_ms = ms;
        self
    }

    pub fn renderer_url(mut self, url: impl Into<String>) -> Self {
        self.config.renderer_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn assembly(mut self, policy: AssemblyPolicy) -> Self {
        self.config.assembly = policy;
        self
    }

    pub fn compression_level(mut self, level: i64) -> Self {
        self.config.compression_level = level.clamp(0, 9);
        self
    }

    pub fn entry_name(mut self, name: impl Into<String>) -> Self {
        self.config.entry_name = name.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ZplError> {
        let c = &self.config;
        if c.batch_size == 0 {
            return Err(ZplError::InvalidConfig("Batch size must be ≥ 1".into()));
        }
        if !(c.renderer_url.starts_with("http://") || c.renderer_url.starts_with("https://")) {
            return Err(ZplError::InvalidConfig(format!(
                "Renderer URL must be http(s), got '{}'",
                c.renderer_url
            )));
        }
        if c.entry_name.trim().is_empty() {
            return Err(ZplError::InvalidConfig("Entry name must not be empty".into()));
        }
        Ok(self.config)
    }
}

/// How the assembler treats a payload that does not parse as a PDF.
///
/// A failed render leaves a plain-text diagnostic in the label's slot, so
/// this choice decides whether one bad label sinks the whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssemblyPolicy {
    /// Abort the whole assembly on the first unparsable payload. (default)
    #[default]
    Strict,
    /// Log and skip unparsable payloads; the combined PDF holds only the
    /// labels that rendered.
    SkipInvalid,
}
