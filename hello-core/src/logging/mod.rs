//! Log output for the core.
//!
//! Log sites never check which backend is active: the session holds one
//! `Box<dyn LogSink>` chosen during environment negotiation.
//!
//! - [`HostLog`]: the frontend's `retro_log_printf_t`, once the host hands it over.
//! - [`FileLog`]: the default. Appends `[LEVEL] message` lines to a local file opened on
//!   first use, and mirrors every line to the diagnostic stream (the `log` facade).

use std::ffi::CString;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::Level;

use crate::abi::{LOG_FORMAT, LogPrintfFn, log_level};

/// Log through a [`LogSink`] with `format!`-style arguments.
///
/// `sink_log!(self.logger, Warn, "bad char {c:?}")`
macro_rules! sink_log {
    ($sink:expr, $level:ident, $($arg:tt)+) => {
        $sink.log(::log::Level::$level, format_args!($($arg)+))
    };
}
pub(crate) use sink_log;

/// Destination for the core's log lines.
pub trait LogSink: Send {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>);

    /// Give back any resource held by the sink. Later calls to `log` may reacquire it.
    fn release(&mut self) {}
}

/// Route the diagnostic stream to stderr, filtered by `RUST_LOG` (default `debug`).
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init_diagnostics() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp(None)
        .try_init();
}

// --- Host ---

/// The frontend's structured logger.
pub struct HostLog {
    log: LogPrintfFn,
}

impl HostLog {
    pub fn new(log: LogPrintfFn) -> Self {
        Self { log }
    }
}

/// Host severity for `level`. Debug and trace lines go out at `INFO`; the `[LEVEL]`
/// tag in the text still tells them apart.
fn host_level(level: Level) -> c_int {
    match level {
        Level::Error => log_level::ERROR,
        Level::Warn => log_level::WARN,
        Level::Info | Level::Debug | Level::Trace => log_level::INFO,
    }
}

/// The `(level, text)` pair handed to the host's printf through `"%s\n"`.
fn host_message(level: Level, args: fmt::Arguments<'_>) -> (c_int, CString) {
    let msg = format!("[{level}] {args}").replace('\0', " ");
    // Interior NULs were replaced above.
    let msg = CString::new(msg).unwrap_or_default();
    (host_level(level), msg)
}

impl LogSink for HostLog {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let (level, msg) = host_message(level, args);
        // SAFETY: both pointers are valid NUL-terminated strings for the duration of the
        // call, and the format consumes exactly one `%s` argument.
        unsafe { (self.log)(level, LOG_FORMAT.as_ptr(), msg.as_ptr()) }
    }
}

// --- Local file ---

/// Fallback logger used until (or unless) the host provides one.
pub struct FileLog {
    path: PathBuf,
    file: Option<File>,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn open(path: &Path) -> anyhow::Result<File> {
        File::create(path).with_context(|| format!("Failed to open {}", path.display()))
    }

    fn ensure_open(&mut self) -> Option<&mut File> {
        if self.file.is_none() {
            match Self::open(&self.path) {
                Ok(f) => self.file = Some(f),
                Err(e) => log::error!("{e:#}"),
            }
        }
        self.file.as_mut()
    }
}

impl LogSink for FileLog {
    fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let written = self
            .ensure_open()
            .map(|file| writeln!(file, "[{level}] {args}").and_then(|_| file.flush()));
        if let Some(Err(e)) = written {
            log::error!("Failed to write {}: {e}", self.path.display());
        }
        log::log!(level, "{args}");
    }

    fn release(&mut self) {
        self.file = None;
    }
}
