/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Process logger: slog records are formatted on the caller side and written
//! to stdout or stderr by a dedicated IO thread.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use slog::Level;

mod drain;
pub use drain::ChannelDrain;

mod format;
use format::StdLogFormatter;

mod stats;
use stats::LogEvent;
pub use stats::{LogSnapshot, LogStats};

mod writer;
use writer::{IoThread, LineStyle};

pub struct StdLogValue {
    level: Level,
    module: String,
    message: String,
    kv_pairs: Vec<(String, String)>,
    position: Option<String>,
}

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Where and how the IO thread writes.
#[derive(Clone, Debug)]
pub struct LoggerOptions {
    pub thread_name: String,
    pub channel_capacity: usize,
    pub code_position: bool,
    pub use_stdout: bool,
}

impl LoggerOptions {
    pub fn new(thread_name: &str) -> Self {
        LoggerOptions {
            thread_name: thread_name.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            code_position: true,
            use_stdout: false,
        }
    }
}

/// Create the channel drain and start its IO thread.
pub fn new_async_logger(opts: &LoggerOptions) -> ChannelDrain {
    let (sender, receiver) = flume::bounded::<StdLogValue>(opts.channel_capacity);
    let stats = Arc::new(LogStats::default());
    let io_thread = IoThread::new(receiver, Arc::clone(&stats));
    let use_stdout = opts.use_stdout;

    let _detached_thread = std::thread::Builder::new()
        .name(opts.thread_name.clone())
        .spawn(move || {
            if use_stdout {
                let stdout = io::stdout();
                let style = LineStyle::detect(stdout.is_terminal());
                io_thread.run(stdout, style);
            } else {
                let stderr = io::stderr();
                let style = LineStyle::detect(stderr.is_terminal());
                io_thread.run(stderr, style);
            }
        });

    ChannelDrain::new(sender, StdLogFormatter::new(opts.code_position), stats)
}
