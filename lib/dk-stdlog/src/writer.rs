/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};
use std::sync::Arc;

use anstyle::{AnsiColor, Color, Style};
use chrono::{DateTime, Local};
use flume::Receiver;
use slog::Level;

use super::{LogEvent, LogStats, StdLogValue};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LineStyle {
    Plain,
    Colored,
}

impl LineStyle {
    pub(crate) fn detect(is_terminal: bool) -> Self {
        if is_terminal {
            LineStyle::Colored
        } else {
            LineStyle::Plain
        }
    }

    fn level(self, level: Level) -> Style {
        if self == LineStyle::Plain {
            return Style::new();
        }
        let color = match level {
            Level::Critical => AnsiColor::Magenta,
            Level::Error => AnsiColor::Red,
            Level::Warning => AnsiColor::Yellow,
            Level::Info => AnsiColor::Green,
            Level::Debug => AnsiColor::Cyan,
            Level::Trace => AnsiColor::Blue,
        };
        Style::new().fg_color(Some(Color::Ansi(color)))
    }

    fn dimmed(self) -> Style {
        match self {
            LineStyle::Plain => Style::new(),
            LineStyle::Colored => Style::new().dimmed(),
        }
    }
}

/// Render one line: `<time> <LEVEL> <module> <message> k=v ... <file:line>`.
pub(crate) fn render(
    buf: &mut Vec<u8>,
    v: &StdLogValue,
    style: LineStyle,
    time: DateTime<Local>,
) -> io::Result<()> {
    let level_style = style.level(v.level);
    let dimmed = style.dimmed();

    write!(buf, "{}", time.format(TIME_FORMAT))?;
    write!(
        buf,
        " {}{:<5}{}",
        level_style.render(),
        v.level.as_short_str(),
        level_style.render_reset()
    )?;
    write!(buf, " {}", v.module)?;
    if v.message.is_empty() {
        buf.extend_from_slice(b" ()");
    } else {
        write!(buf, " {}", v.message)?;
    }
    for (k, value) in &v.kv_pairs {
        write!(buf, " {k}={value}")?;
    }
    if let Some(position) = &v.position {
        write!(buf, " {}<{position}>{}", dimmed.render(), dimmed.render_reset())?;
    }
    buf.push(b'\n');
    Ok(())
}

pub(crate) struct IoThread {
    receiver: Receiver<StdLogValue>,
    stats: Arc<LogStats>,
}

impl IoThread {
    pub(crate) fn new(receiver: Receiver<StdLogValue>, stats: Arc<LogStats>) -> Self {
        IoThread { receiver, stats }
    }

    /// Drain the channel until all senders are gone, flushing after each burst.
    pub(crate) fn run<IO: Write>(self, mut io: IO, style: LineStyle) {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            self.write_one(&mut io, &mut buf, &v, style);
            while let Ok(v) = self.receiver.try_recv() {
                self.write_one(&mut io, &mut buf, &v, style);
            }
            let _ = io.flush();
        }
    }

    fn write_one<IO: Write>(
        &self,
        io: &mut IO,
        buf: &mut Vec<u8>,
        v: &StdLogValue,
        style: LineStyle,
    ) {
        buf.clear();
        if render(buf, v, style, Local::now()).is_err() {
            self.stats.record(LogEvent::Failed);
            return;
        }
        match io.write_all(buf) {
            Ok(_) => self.stats.record(LogEvent::Written(buf.len())),
            Err(_) => self.stats.record(LogEvent::Failed),
        }
    }
}
