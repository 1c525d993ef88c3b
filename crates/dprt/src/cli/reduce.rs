//! Single-frame and master-frame reductions.

use std::path::PathBuf;

use clap::Args;
use dprt_core::{ReductionRecord, ReductionRequest, RequestKind};

use super::types::OutputFormat;
use super::{record_writer, watch_ctrl_c, Session};

/// Arguments for `calibrate` and `expose`.
#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// FITS frame to reduce
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the config's output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `master-bias` and `master-flat`.
#[derive(Args, Debug)]
pub struct MasterArgs {
    /// Directory holding the frames to combine
    #[arg(required = true)]
    pub directory: PathBuf,
}

/// Execute `calibrate` or `expose`.
pub async fn execute(session: Session, kind: RequestKind, args: ReduceArgs) -> anyhow::Result<()> {
    let request = ReductionRequest::new(args.input.clone(), kind);
    let record = run(&session, request).await?;

    let format = session.output_format(args.format);
    let pretty = args.pretty || session.config.output.pretty;
    let mut writer = record_writer(args.output.as_deref(), format, pretty)?;
    let failure = (!record.success).then(|| failure_message(&record));
    writer.push(record)?;
    writer.finish()?;

    match failure {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

/// Execute `master-bias` or `master-flat`.
pub async fn execute_master(
    session: Session,
    kind: RequestKind,
    args: MasterArgs,
) -> anyhow::Result<()> {
    if !args.directory.is_dir() {
        anyhow::bail!("Not a directory: {}", args.directory.display());
    }
    let record = run(&session, ReductionRequest::new(args.directory, kind)).await?;
    if !record.success {
        anyhow::bail!(failure_message(&record));
    }
    tracing::info!("{:?} finished for {:?}", kind, record.input);
    Ok(())
}

/// Run one request on a blocking thread, aborting it on ctrl-c.
async fn run(session: &Session, request: ReductionRequest) -> anyhow::Result<ReductionRecord> {
    let mut dprt = session.open()?;
    let watcher = watch_ctrl_c(dprt.abort_handle(), None);
    let record = tokio::task::spawn_blocking(move || dprt.reduce(&request)).await?;
    watcher.abort();
    Ok(record)
}

pub(super) fn failure_message(record: &ReductionRecord) -> String {
    format!(
        "error {}: {}",
        record.error_number,
        record.error_string.as_deref().unwrap_or_default()
    )
}
