//! Command implementations.

pub mod batch;
pub mod config;
pub mod reduce;
pub mod types;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use dprt_core::{AbortSignal, Config, Dprt, OutputFormat, RecordWriter};

/// Settings shared by every command: the loaded config plus global flags.
pub struct Session {
    pub config: Config,
    properties_override: Option<PathBuf>,
}

impl Session {
    pub fn new(config: Config, properties_override: Option<PathBuf>) -> Self {
        Self {
            config,
            properties_override,
        }
    }

    /// The property file in effect: `--properties` if given, else the config's.
    pub fn property_file(&self) -> PathBuf {
        match &self.properties_override {
            Some(path) => expand(path),
            None => self.config.property_file(),
        }
    }

    /// Open a reduction context over the property file in effect.
    pub fn open(&self) -> anyhow::Result<Dprt> {
        let path = self.property_file();
        tracing::debug!("Using property file {:?}", path);
        Dprt::with_property_file(&path)
            .with_context(|| format!("Cannot start a reduction with properties from {path:?}"))
    }

    /// Output format from the flag, falling back to the config.
    pub fn output_format(&self, flag: Option<types::OutputFormat>) -> OutputFormat {
        match flag {
            Some(format) => format.into(),
            None => OutputFormat::parse(&self.config.output.format).unwrap_or(OutputFormat::Json),
        }
    }
}

pub type BoxedWriter = Box<dyn Write + Send>;

/// A record writer to `output`, or to stdout when no path is given.
pub fn record_writer(
    output: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<RecordWriter<BoxedWriter>> {
    let sink: BoxedWriter = match output {
        Some(path) => {
            let path = expand(path);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file {path:?}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };
    Ok(RecordWriter::new(sink, format, pretty))
}

/// Raise `abort` (and `interrupted`, if given) on ctrl-c.
pub fn watch_ctrl_c(
    abort: AbortSignal,
    interrupted: Option<Arc<AtomicBool>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, aborting reduction");
            if let Some(flag) = &interrupted {
                flag.store(true, Ordering::SeqCst);
            }
            abort.set(true);
        }
    })
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
