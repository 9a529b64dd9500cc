//! Explicitly constructed logging context.
//!
//! A [`LogContext`] owns its own `tracing` dispatcher instead of installing a
//! process-wide subscriber. Front ends build one at startup and hand it to the
//! batch driver, which runs its work inside [`LogContext::scope`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("Failed to open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}

/// Receives each formatted log line, without the trailing newline.
pub type LineSink = Arc<dyn Fn(String) + Send + Sync>;

pub struct LogContext {
    dispatch: Dispatch,
    _guard: Option<WorkerGuard>,
}

impl LogContext {
    pub fn builder() -> LogContextBuilder {
        LogContextBuilder::default()
    }

    /// Context that drops every event.
    pub fn disabled() -> Self {
        Self { dispatch: Dispatch::none(), _guard: None }
    }

    /// Run `f` with this context as the current thread's dispatcher.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

pub struct LogContextBuilder {
    filter: String,
    stdout: bool,
    file: Option<PathBuf>,
    sink: Option<LineSink>,
}

impl Default for LogContextBuilder {
    fn default() -> Self {
        Self { filter: "info".to_string(), stdout: true, file: None, sink: None }
    }
}

impl LogContextBuilder {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub fn filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = directive.into();
        self
    }

    pub fn stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    /// Mirror every line to `path`, appending.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn sink(mut self, sink: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> Result<LogContext, LogError> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter));

        let stdout_layer = self
            .stdout
            .then(|| fmt::layer().with_target(false).with_writer(io::stdout));

        let (file_layer, guard) = match &self.file {
            Some(path) => {
                let (writer, guard) = tracing_appender::non_blocking(open_appender(path)?);
                let layer = fmt::layer().with_target(false).with_ansi(false).with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let sink_layer = self.sink.map(|sink| {
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(move || SinkWriter { sink: Arc::clone(&sink) })
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .with(sink_layer);

        Ok(LogContext { dispatch: Dispatch::new(subscriber), _guard: guard })
    }
}

fn open_appender(path: &Path) -> Result<RollingFileAppender, LogError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LogError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|source| LogError::File { path: path.to_path_buf(), source })
}

/// Splits each formatted event into lines for the sink.
struct SinkWriter {
    sink: LineSink,
}

impl io::Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for line in String::from_utf8_lossy(buf).lines() {
            if !line.is_empty() {
                (self.sink)(line.to_string());
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
