// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A logger utilizing an MPSC channel under the hood.
//!
//! The [`Logger`] installed as the `log` implementation sends [`LogEvent`]s
//! to a dedicated writer thread; warnings and errors go to stderr, everything
//! else to stdout.

use std::{
    fmt::Display,
    io::{self, BufWriter, Stderr, Stdout, Write},
    sync::{Mutex, OnceLock, atomic::Ordering},
};

use ahash::AHashMap;
use log::{Level, LevelFilter, Log, set_boxed_logger, set_max_level};
use threatbus_core::{UnixNanos, datetime::unix_nanos_to_iso8601_millis, time::unix_nanos_now};
use ustr::Ustr;

use super::{LOGGING_BYPASSED, LOGGING_INITIALIZED, config::LoggerConfig};
use crate::enums::LogColor;

const LOGGING: &str = "logging";

/// Global log sender which allows guard creation after initialization.
static LOGGER_TX: OnceLock<std::sync::mpsc::Sender<LogEvent>> = OnceLock::new();

/// Global handle to the logging thread - only one thread exists per process.
static LOGGER_HANDLE: Mutex<Option<std::thread::JoinHandle<()>>> = Mutex::new(None);

/// Represents a type of log event.
#[derive(Debug)]
pub enum LogEvent {
    /// A log line event.
    Log(LogLine),
    /// A command to flush all logger buffers.
    Flush,
    /// A command to close the logger.
    Close,
}

/// Represents a log event which includes a message.
#[derive(Clone, Debug)]
pub struct LogLine {
    /// The timestamp for the event.
    pub timestamp: UnixNanos,
    /// The log level for the event.
    pub level: Level,
    /// The color for the log message content.
    pub color: LogColor,
    /// The component the log event originated from.
    pub component: Ustr,
    /// The log message content.
    pub message: String,
}

impl LogLine {
    fn format_plain(&self) -> String {
        format!(
            "{} [{}] {}: {}\n",
            unix_nanos_to_iso8601_millis(self.timestamp),
            self.level,
            self.component,
            self.message,
        )
    }

    fn format_colored(&self) -> String {
        format!(
            "\x1b[1m{}\x1b[0m {}[{}] {}: {}\x1b[0m\n",
            unix_nanos_to_iso8601_millis(self.timestamp),
            self.color.as_ansi(),
            self.level,
            self.component,
            self.message,
        )
    }
}

impl Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.component, self.message)
    }
}

trait LogWriter {
    fn write(&mut self, line: &str);
    fn flush(&mut self);
    fn enabled(&self, line: &LogLine) -> bool;
}

struct StdoutWriter {
    buf: BufWriter<Stdout>,
    level: LevelFilter,
}

impl LogWriter for StdoutWriter {
    fn write(&mut self, line: &str) {
        if let Err(e) = self.buf.write_all(line.as_bytes()) {
            eprintln!("Error writing to stdout: {e}");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.buf.flush() {
            eprintln!("Error flushing stdout: {e}");
        }
    }

    fn enabled(&self, line: &LogLine) -> bool {
        line.level > Level::Warn && line.level <= self.level
    }
}

struct StderrWriter {
    buf: BufWriter<Stderr>,
}

impl LogWriter for StderrWriter {
    fn write(&mut self, line: &str) {
        if let Err(e) = self.buf.write_all(line.as_bytes()) {
            eprintln!("Error writing to stderr: {e}");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.buf.flush() {
            eprintln!("Error flushing stderr: {e}");
        }
    }

    fn enabled(&self, line: &LogLine) -> bool {
        line.level <= Level::Warn
    }
}

/// The logger installed as the `log` implementation.
#[derive(Debug)]
pub struct Logger {
    /// Configuration for logging levels and behavior.
    pub config: LoggerConfig,
    /// Transmitter for sending log events to the 'logging' thread.
    tx: std::sync::mpsc::Sender<LogEvent>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        !LOGGING_BYPASSED.load(Ordering::Relaxed)
            && (metadata.level() == Level::Error || metadata.level() <= self.config.stdout_level)
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let line = LogLine {
                timestamp: unix_nanos_now(),
                level: record.level(),
                color: record.level().into(),
                component: Ustr::from(record.metadata().target()),
                message: format!("{}", record.args()),
            };
            if self.tx.send(LogEvent::Log(line)).is_err() {
                eprintln!("Error sending log event (receiver closed)");
            }
        }
    }

    fn flush(&self) {
        if LOGGING_BYPASSED.load(Ordering::Relaxed) {
            return;
        }

        if let Err(e) = self.tx.send(LogEvent::Flush) {
            eprintln!("Error sending flush log event: {e}");
        }
    }
}

impl Logger {
    /// Initializes the logger based on the `THREATBUS_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the environment variable or parsing the configuration fails.
    pub fn init_with_env() -> anyhow::Result<LogGuard> {
        let config = LoggerConfig::from_env()?;
        Self::init_with_config(config)
    }

    /// Initializes the logger with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the logger fails to register or initialize the background thread.
    pub fn init_with_config(config: LoggerConfig) -> anyhow::Result<LogGuard> {
        // Fast path: already initialized
        if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
            return LogGuard::new()
                .ok_or_else(|| anyhow::anyhow!("Logging already initialized but sender missing"));
        }

        let (tx, rx) = std::sync::mpsc::channel::<LogEvent>();

        let logger = Self {
            tx: tx.clone(),
            config: config.clone(),
        };

        set_boxed_logger(Box::new(logger))?;

        if LOGGER_TX.set(tx).is_err() {
            debug_assert!(false, "LOGGER_TX already set - re-initialization not supported");
        }

        if config.print_config {
            println!("Logger initialized with {config:?}");
        }

        let handle = std::thread::Builder::new()
            .name(LOGGING.to_string())
            .spawn(move || Self::handle_messages(config, rx))?;

        if let Ok(mut handle_guard) = LOGGER_HANDLE.lock() {
            debug_assert!(
                handle_guard.is_none(),
                "LOGGER_HANDLE already set - re-initialization not supported"
            );
            *handle_guard = Some(handle);
        }

        set_max_level(LevelFilter::Trace);
        LOGGING_INITIALIZED.store(true, Ordering::SeqCst);

        LogGuard::new().ok_or_else(|| anyhow::anyhow!("Failed to create LogGuard from sender"))
    }

    fn handle_messages(config: LoggerConfig, rx: std::sync::mpsc::Receiver<LogEvent>) {
        let LoggerConfig {
            stdout_level,
            component_level,
            is_colored,
            print_config: _,
        } = config;

        let mut stdout_writer = StdoutWriter {
            buf: BufWriter::new(io::stdout()),
            level: stdout_level,
        };
        let mut stderr_writer = StderrWriter {
            buf: BufWriter::new(io::stderr()),
        };

        while let Ok(event) = rx.recv() {
            match event {
                LogEvent::Log(line) => {
                    if should_filter_log(&line.component, line.level, &component_level) {
                        continue;
                    }

                    let formatted = if is_colored {
                        line.format_colored()
                    } else {
                        line.format_plain()
                    };

                    if stderr_writer.enabled(&line) {
                        stderr_writer.write(&formatted);
                        stderr_writer.flush();
                    } else if stdout_writer.enabled(&line) {
                        stdout_writer.write(&formatted);
                        stdout_writer.flush();
                    }
                }
                LogEvent::Flush => {
                    stdout_writer.flush();
                    stderr_writer.flush();
                }
                LogEvent::Close => {
                    // Drain events that raced with shutdown, then final flush
                    while let Ok(event) = rx.try_recv() {
                        if let LogEvent::Log(line) = event
                            && !should_filter_log(&line.component, line.level, &component_level)
                        {
                            let formatted = if is_colored {
                                line.format_colored()
                            } else {
                                line.format_plain()
                            };
                            if stderr_writer.enabled(&line) {
                                stderr_writer.write(&formatted);
                            } else if stdout_writer.enabled(&line) {
                                stdout_writer.write(&formatted);
                            }
                        }
                    }
                    stdout_writer.flush();
                    stderr_writer.flush();
                    break;
                }
            }
        }
    }
}

/// Determines if a log line should be filtered out based on component filters.
///
/// Returns `true` if the line should be skipped (filtered out).
#[must_use]
pub fn should_filter_log(
    component: &Ustr,
    line_level: Level,
    component_level: &AHashMap<Ustr, LevelFilter>,
) -> bool {
    match component_level.get(component) {
        Some(filter) => line_level > *filter,
        None => false,
    }
}

/// A guard which flushes and joins the logging thread when dropped.
#[derive(Debug)]
pub struct LogGuard {
    tx: std::sync::mpsc::Sender<LogEvent>,
}

impl LogGuard {
    /// Creates a new [`LogGuard`] from the global sender, if initialized.
    #[must_use]
    pub fn new() -> Option<Self> {
        LOGGER_TX.get().map(|tx| Self { tx: tx.clone() })
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogEvent::Close);
        if let Ok(mut handle_guard) = LOGGER_HANDLE.lock()
            && let Some(handle) = handle_guard.take()
            && let Err(e) = handle.join()
        {
            eprintln!("Error joining logging thread: {e:?}");
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_log_line_format_plain() {
        let line = LogLine {
            timestamp: UnixNanos::from(1_577_836_800_000_000_000),
            level: Level::Info,
            color: LogColor::Normal,
            component: Ustr::from("dispatch"),
            message: "Started task 'fanout'".to_string(),
        };
        assert_eq!(
            line.format_plain(),
            "2020-01-01T00:00:00.000Z [INFO] dispatch: Started task 'fanout'\n"
        );
    }

    #[rstest]
    fn test_should_filter_log_without_override() {
        let levels = AHashMap::new();
        assert!(!should_filter_log(
            &Ustr::from("dispatch"),
            Level::Trace,
            &levels
        ));
    }

    #[rstest]
    #[case(Level::Debug, true)]
    #[case(Level::Warn, false)]
    #[case(Level::Error, false)]
    fn test_should_filter_log_with_override(#[case] level: Level, #[case] filtered: bool) {
        let mut levels = AHashMap::new();
        levels.insert(Ustr::from("dispatch"), LevelFilter::Warn);
        assert_eq!(
            should_filter_log(&Ustr::from("dispatch"), level, &levels),
            filtered
        );
    }
}
