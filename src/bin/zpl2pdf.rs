//! CLI binary for zpl2pdf.
//!
//! `serve` runs the HTTP service; `convert` runs one job against a local
//! archive and writes the resulting ZIP next to it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zpl2pdf::config::DEFAULT_DELAY_MS;
use zpl2pdf::server::{self, ServerConfig};
use zpl2pdf::{
    convert_archive_to_file, AssemblyPolicy, ConversionConfig, ConversionContext,
    ConversionProgressCallback, ProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar with one log line per label.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} labels  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Rendering");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_labels: usize, total_batches: usize) {
        self.bar.set_length(total_labels as u64);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Rendering {total_labels} labels in {total_batches} batches…"
            ))
        ));
    }

    fn on_batch_start(&self, batch: usize, total_batches: usize, _size: usize) {
        self.bar.set_message(format!("batch {batch}/{total_batches}"));
    }

    fn on_label_complete(&self, position: usize, total: usize, output_name: &str, bytes: usize) {
        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {}  {}",
            green("✓"),
            position,
            total,
            output_name,
            dim(&format!("{bytes} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_label_error(&self, position: usize, total: usize, output_name: &str, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {}  {}",
            red("✗"),
            position,
            total,
            output_name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_labels: usize, success_count: usize) {
        let failed = total_labels.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} labels rendered",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} labels rendered  ({} failed)",
                if failed == total_labels {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_labels,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on port 9999 under /conversor-zpl
  zpl2pdf serve

  # Serve at the root on another port
  PORT=8080 zpl2pdf serve --base-path /

  # Convert a local bundle, one label every 500ms
  zpl2pdf convert labels.zip -o converted.zip --speed 500

  # Keep going when a label fails to render
  zpl2pdf convert labels.zip -o converted.zip --skip-invalid

HTTP API:
  POST /conversor-zpl/upload      multipart: file=<zip>, id=<job id>, speed=<ms>
  GET  /conversor-zpl/status/:id  {"labels": n, "time": seconds}  (read once)
"#;

/// Convert ZIP bundles of ZPL labels into one combined PDF via Labelary.
#[derive(Parser, Debug)]
#[command(
    name = "zpl2pdf",
    version,
    about = "Convert ZIP bundles of ZPL labels into one combined PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Rendering service endpoint.
    #[arg(long, global = true, env = "ZPL2PDF_RENDERER_URL",
          default_value = zpl2pdf::config::DEFAULT_RENDERER_URL)]
    renderer_url: String,

    /// Labels rendered concurrently per batch.
    #[arg(long, global = true, env = "ZPL2PDF_BATCH_SIZE", default_value_t = 1)]
    batch_size: usize,

    /// Per-request timeout in seconds for the rendering service.
    #[arg(long, global = true, env = "ZPL2PDF_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Skip labels that failed to render instead of failing the job.
    #[arg(long, global = true, env = "ZPL2PDF_SKIP_INVALID")]
    skip_invalid: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "ZPL2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "ZPL2PDF_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP upload service.
    Serve {
        /// TCP port to listen on.
        #[arg(long, env = "PORT", default_value_t = 9999)]
        port: u16,

        /// Route prefix; "/" mounts at the root.
        #[arg(long, env = "ZPL2PDF_BASE_PATH", default_value = "/conversor-zpl")]
        base_path: String,

        /// Largest accepted upload, in MiB.
        #[arg(long, env = "ZPL2PDF_MAX_UPLOAD_MB", default_value_t = 50)]
        max_upload_mb: usize,
    },

    /// Convert a local ZIP archive.
    Convert {
        /// ZIP archive holding .zpl / .txt files.
        input: PathBuf,

        /// Output archive path.
        #[arg(short, long, default_value = "converted.zip")]
        output: PathBuf,

        /// Pause after each batch, in milliseconds.
        #[arg(long, env = "ZPL2PDF_SPEED", default_value_t = 1000)]
        speed: u64,

        /// Disable progress bar.
        #[arg(long, env = "ZPL2PDF_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during local conversions.
    let show_progress = match &cli.command {
        Command::Convert { no_progress, .. } => !cli.quiet && !no_progress,
        Command::Serve { .. } => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Serve {
            port,
            base_path,
            max_upload_mb,
        } => {
            let config = build_config(&cli, DEFAULT_DELAY_MS, None)?;
            let ctx = ConversionContext::new(&config).context("Failed to set up renderer")?;
            let server_config = ServerConfig {
                port: *port,
                base_path: base_path.clone(),
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            };

            let app = server::router(config, ctx, &server_config);
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.port))
                .await
                .with_context(|| format!("Failed to bind port {}", server_config.port))?;
            server::serve(listener, app).await.context("Server error")?;
        }
        Command::Convert {
            input,
            output,
            speed,
            ..
        } => {
            let progress: Option<ProgressCallback> = if show_progress {
                Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
            } else {
                None
            };

            let config = build_config(&cli, *speed, progress)?;
            let ctx = ConversionContext::new(&config).context("Failed to set up renderer")?;
            let stats = convert_archive_to_file(input, output, &config, &ctx)
                .await
                .context("Conversion failed")?;

            if !cli.quiet {
                eprintln!(
                    "{}  {} pages from {} labels  {}ms  →  {}",
                    if stats.failed_labels == 0 {
                        green("✔")
                    } else {
                        cyan("⚠")
                    },
                    stats.pages,
                    stats.labels,
                    stats.duration_ms,
                    bold(&output.display().to_string()),
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    delay_ms: u64,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .renderer_url(cli.renderer_url.clone())
        .batch_size(cli.batch_size)
        .delay_ms(delay_ms)
        .assembly(if cli.skip_invalid {
            AssemblyPolicy::SkipInvalid
        } else {
            AssemblyPolicy::Strict
        });

    if let Some(secs) = cli.request_timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
