//! Logging setup
//!
//! Console output goes to stderr through a `tracing-subscriber` fmt layer
//! (compact, pretty or json). When a log directory is configured, a second
//! plain-text layer writes to a per-query file that the batch runner
//! switches between queries.

use crate::config::LoggingConfig;
use crate::error::{AgentError, Result};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// A log file that can be swapped while the subscriber is running.
///
/// Writes are dropped while no file is open.
#[derive(Debug, Clone, Default)]
pub struct RunLogFile {
    current: Arc<Mutex<Option<File>>>,
}

impl RunLogFile {
    /// Start writing to `path`, truncating it.
    pub fn open(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        *self.current.lock() = Some(file);
        Ok(())
    }

    /// Flush and stop writing.
    pub fn close(&self) -> Result<()> {
        if let Some(mut file) = self.current.lock().take() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Writer handed out by [`RunLogFile`].
pub struct RunLogWriter {
    current: Arc<Mutex<Option<File>>>,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.current.lock().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.current.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RunLogFile {
    type Writer = RunLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RunLogWriter {
            current: self.current.clone(),
        }
    }
}

/// Handle to the installed logging setup.
#[derive(Debug, Clone, Default)]
pub struct LoggingHandle {
    log_dir: Option<PathBuf>,
    run_log: RunLogFile,
}

impl LoggingHandle {
    /// Path of the log file for query `index` of `scenario`.
    pub fn run_log_path(&self, scenario: &str, index: usize) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}-{}.log", scenario, index)))
    }

    /// Route file output to the log of query `index`. No-op without a log dir.
    pub fn start_run(&self, scenario: &str, index: usize) -> Result<()> {
        match self.run_log_path(scenario, index) {
            Some(path) => self.run_log.open(&path),
            None => Ok(()),
        }
    }

    pub fn finish_run(&self) -> Result<()> {
        self.run_log.close()
    }
}

fn console_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let base = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.colored)
        .with_target(false);

    match (config.format.as_str(), config.timestamps) {
        ("json", true) => Box::new(base.json()),
        ("json", false) => Box::new(base.json().without_time()),
        ("pretty", true) => Box::new(base.pretty()),
        ("pretty", false) => Box::new(base.pretty().without_time()),
        (_, true) => Box::new(base.compact()),
        (_, false) => Box::new(base.compact().without_time()),
    }
}

/// Install the global subscriber.
///
/// The level comes from `RUST_LOG` when set, otherwise from the config.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingHandle> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let handle = LoggingHandle {
        log_dir: config.log_dir.clone(),
        run_log: RunLogFile::default(),
    };

    let file_layer = handle.log_dir.is_some().then(|| {
        fmt::layer()
            .with_writer(handle.run_log.clone())
            .with_ansi(false)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(config))
        .with(file_layer)
        .try_init()
        .map_err(|e| AgentError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(handle)
}
