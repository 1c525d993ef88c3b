//! Batch reduction: directory discovery with progress and streaming output.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use dprt_core::{BatchConfig, Dprt, FileDiscovery, RecordWriter, ReductionRequest, RequestKind};

use super::types::{BatchKind, OutputFormat};
use super::{record_writer, watch_ctrl_c, BoxedWriter, Session};

/// Arguments for the `batch` command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory of FITS frames (or a single frame)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Reduction applied to each frame
    #[arg(short, long, value_enum, default_value = "calibrate")]
    pub kind: BatchKind,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the config's output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Counts reported after a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchSummary {
    succeeded: usize,
    failed: usize,
    remaining: usize,
}

/// Execute the batch command.
pub async fn execute(session: Session, args: BatchArgs) -> anyhow::Result<()> {
    let batch_config = BatchConfig {
        recursive: args.recursive || session.config.batch.recursive,
        ..session.config.batch.clone()
    };
    let files = FileDiscovery::new(batch_config).discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No FITS frames found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} frame(s) to reduce", files.len());

    let dprt = session.open()?;
    let format = session.output_format(args.format);
    let pretty = args.pretty || session.config.output.pretty;
    let writer = record_writer(args.output.as_deref(), format, pretty)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let watcher = watch_ctrl_c(dprt.abort_handle(), Some(interrupted.clone()));
    let kind = RequestKind::from(args.kind);
    let start = Instant::now();

    let summary = tokio::task::spawn_blocking(move || {
        reduce_all(dprt, writer, &files, kind, &interrupted, true)
    })
    .await??;
    watcher.abort();

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    print_summary(summary, start.elapsed());
    if summary.remaining > 0 {
        anyhow::bail!("Batch interrupted with {} frame(s) left", summary.remaining);
    }
    Ok(())
}

/// Reduce each file in order, continuing past failures.
///
/// Stops early once `interrupted` is set; the frame that was running when
/// the interrupt arrived is recorded with its abort error.
fn reduce_all(
    mut dprt: Dprt,
    mut writer: RecordWriter<BoxedWriter>,
    files: &[PathBuf],
    kind: RequestKind,
    interrupted: &AtomicBool,
    show_progress: bool,
) -> anyhow::Result<BatchSummary> {
    let progress = if show_progress {
        create_progress_bar(files.len() as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };
    let start = Instant::now();
    let mut done = 0;

    for path in files {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        progress.set_message(display_name(path));
        let record = dprt.reduce(&ReductionRequest::new(path.clone(), kind));
        if !record.success {
            tracing::error!(
                "Failed: {:?} - error {}: {}",
                path,
                record.error_number,
                record.error_string.as_deref().unwrap_or_default()
            );
        }
        writer.push(record)?;
        done += 1;

        progress.inc(1);
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} frames/sec", done as f64 / elapsed));
        }
    }
    progress.finish_and_clear();

    let summary = BatchSummary {
        succeeded: writer.succeeded(),
        failed: writer.failed(),
        remaining: files.len() - done,
    };
    writer.finish()?;
    Ok(summary)
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Create a progress bar for batch reduction.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a summary table after the batch.
fn print_summary(summary: BatchSummary, elapsed: Duration) {
    let total = summary.succeeded + summary.failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.remaining > 0 {
        eprintln!("    Not started:  {:>8}", summary.remaining);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} frames/sec", rate);
    eprintln!("  ====================================");
}
