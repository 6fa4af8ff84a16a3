/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug)]
pub(crate) enum LogEvent {
    Received,
    Written(usize),
    /// The channel was full or closed.
    Dropped,
    /// Formatting or writing failed.
    Failed,
}

/// Point-in-time view of [`LogStats`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LogSnapshot {
    pub received: u64,
    pub written: u64,
    pub written_bytes: u64,
    pub dropped: u64,
    pub failed: u64,
}

#[derive(Default)]
pub struct LogStats {
    received: AtomicU64,
    written: AtomicU64,
    written_bytes: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

impl LogStats {
    pub(crate) fn record(&self, event: LogEvent) {
        let counter = match event {
            LogEvent::Received => &self.received,
            LogEvent::Written(size) => {
                self.written_bytes.fetch_add(size as u64, Ordering::Relaxed);
                &self.written
            }
            LogEvent::Dropped => &self.dropped,
            LogEvent::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LogSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        LogSnapshot {
            received: load(&self.received),
            written: load(&self.written),
            written_bytes: load(&self.written_bytes),
            dropped: load(&self.dropped),
            failed: load(&self.failed),
        }
    }
}
