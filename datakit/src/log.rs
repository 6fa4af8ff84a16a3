/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use slog::{Drain, o};
use slog_scope::GlobalLoggerGuard;

use dk_stdlog::{LogSnapshot, LogStats, LoggerOptions};

use crate::opts::ProcArgs;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

static PROCESS_LOG_STATS: OnceLock<Arc<LogStats>> = OnceLock::new();

pub fn setup(args: &ProcArgs) -> Result<GlobalLoggerGuard, log::SetLoggerError> {
    let mut opts = LoggerOptions::new(PROCESS_LOG_THREAD_NAME);
    opts.use_stdout = args.log_to_stdout;
    let drain = dk_stdlog::new_async_logger(&opts);
    let _ = PROCESS_LOG_STATS.set(drain.stats());
    let logger = slog::Logger::root(drain.fuse(), o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    slog_stdlog::init_with_level(verbose_to_level(args.verbose_level))?;
    Ok(scope_guard)
}

fn verbose_to_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

/// Parse a log level name as used in config files and `ENV_LOG_LEVEL`.
pub fn parse_level(s: &str) -> Option<log::LevelFilter> {
    match s.to_lowercase().as_str() {
        "warning" => Some(log::LevelFilter::Warn),
        "off" | "none" => Some(log::LevelFilter::Off),
        s => log::LevelFilter::from_str(s).ok(),
    }
}

pub fn set_level(level: log::LevelFilter) {
    log::set_max_level(level);
}

/// Counters of the process logger, if it has been set up.
pub fn process_log_stats() -> Option<LogSnapshot> {
    PROCESS_LOG_STATS.get().map(|s| s.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose() {
        assert_eq!(verbose_to_level(0), log::Level::Warn);
        assert_eq!(verbose_to_level(2), log::Level::Debug);
        assert_eq!(verbose_to_level(9), log::Level::Trace);
    }

    #[test]
    fn parse() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("INFO"), Some(log::LevelFilter::Info));
        assert_eq!(parse_level("warning"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(log::LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
