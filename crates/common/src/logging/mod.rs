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

//! The logging framework for Threat Bus processes.
//!
//! All components log through the `log` facade. The subsystem installs a
//! [`Logger`] which forwards [`logger::LogLine`]s over an MPSC channel to a
//! background writer thread, so adapter workers never block on console I/O.
//! The returned [`LogGuard`] flushes pending writes and joins the thread on
//! drop.

pub mod config;
pub mod logger;

use std::{
    env,
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

pub use self::{
    config::LoggerConfig,
    logger::{LogGuard, Logger},
};

pub(crate) static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);
pub(crate) static LOGGING_BYPASSED: AtomicBool = AtomicBool::new(false);
static LAZY_GUARD: OnceLock<Option<LogGuard>> = OnceLock::new();

/// Returns whether the core logger is enabled.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Relaxed)
}

/// Sets the logging subsystem to bypass mode.
pub fn logging_set_bypass() {
    LOGGING_BYPASSED.store(true, Ordering::Relaxed);
}

/// Initialize logging.
///
/// Logging can be configured to filter components and write up to a specific
/// level only by passing a configuration using the `THREATBUS_LOG`
/// environment variable.
///
/// # Safety
///
/// Should only be called once during an application's run, ideally at the
/// beginning of the run.
///
/// # Errors
///
/// Returns an error if the logging subsystem fails to initialize.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<LogGuard> {
    Logger::init_with_config(config)
}

/// Ensures logging is initialized on first use.
///
/// If `THREATBUS_LOG` is set, initializes the logger with the specified
/// config, otherwise with INFO level to stdout. This enables lazy
/// initialization for binaries and tests that don't configure logging
/// explicitly.
///
/// Returns `true` if logging is available (either already initialized or
/// successfully lazy-initialized), `false` otherwise.
pub fn ensure_logging_initialized() -> bool {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return true;
    }

    LAZY_GUARD.get_or_init(|| {
        let config = env::var("THREATBUS_LOG")
            .ok()
            .and_then(|spec| LoggerConfig::from_spec(&spec).ok())
            .unwrap_or_default();

        Logger::init_with_config(config).ok()
    });

    LOGGING_INITIALIZED.load(Ordering::SeqCst)
}

/// Logs that a task has started.
pub fn log_task_started(task_name: &str) {
    log::debug!("Started task '{task_name}'");
}

/// Logs that a task has stopped.
pub fn log_task_stopped(task_name: &str) {
    log::debug!("Stopped task '{task_name}'");
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_ensure_logging_initialized_is_idempotent() {
        let first_call = ensure_logging_initialized();
        let second_call = ensure_logging_initialized();

        assert_eq!(first_call, second_call);
        assert_eq!(first_call, logging_is_initialized());
    }
}
