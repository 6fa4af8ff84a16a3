/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use flume::Sender;
use slog::{Drain, OwnedKVList, Record};

use super::{LogEvent, LogStats, StdLogValue};
use crate::format::StdLogFormatter;

/// slog drain that formats on the caller thread and hands lines to the IO
/// thread. Records are dropped, never blocked on, when the channel is full.
pub struct ChannelDrain {
    sender: Sender<StdLogValue>,
    formatter: StdLogFormatter,
    stats: Arc<LogStats>,
}

impl ChannelDrain {
    pub(crate) fn new(
        sender: Sender<StdLogValue>,
        formatter: StdLogFormatter,
        stats: Arc<LogStats>,
    ) -> Self {
        ChannelDrain {
            sender,
            formatter,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

impl Drain for ChannelDrain {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        self.stats.record(LogEvent::Received);
        let v = self
            .formatter
            .format_slog(record, logger_values)
            .inspect_err(|_| self.stats.record(LogEvent::Failed))?;
        if self.sender.try_send(v).is_err() {
            self.stats.record(LogEvent::Dropped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::o;

    #[test]
    fn drop_on_full() {
        let (sender, receiver) = flume::bounded(1);
        let stats = Arc::new(LogStats::default());
        let drain = ChannelDrain::new(sender, StdLogFormatter::new(false), Arc::clone(&stats));
        let logger = slog::Logger::root(drain.fuse(), o!());

        slog::info!(logger, "first");
        slog::info!(logger, "second");
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.dropped, 1);
        assert_eq!(receiver.len(), 1);
    }
}
