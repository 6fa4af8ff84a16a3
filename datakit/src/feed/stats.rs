/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use foldhash::fast::FixedState;

use dk_point::{Category, Point};

use super::{ArcFeeder, FeedError, FeedOption, Feeder, LastError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputFeedSnapshot {
    pub input: String,
    pub category: Option<Category>,
    pub feed_count: u64,
    pub points: u64,
    pub errors: u64,
    pub last_feed: Option<DateTime<Utc>>,
    pub last_cost: Option<Duration>,
    pub last_error: Option<String>,
}

/// Per input feed counters.
pub struct FeedStats {
    inner: Mutex<HashMap<String, InputFeedSnapshot, FixedState>>,
}

impl Default for FeedStats {
    fn default() -> Self {
        FeedStats {
            inner: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }
}

impl FeedStats {
    fn update<F>(&self, input: &str, f: F)
    where
        F: FnOnce(&mut InputFeedSnapshot),
    {
        let mut ht = self.inner.lock().unwrap();
        let entry = ht
            .entry(input.to_string())
            .or_insert_with(|| InputFeedSnapshot {
                input: input.to_string(),
                ..Default::default()
            });
        f(entry);
    }

    fn add_feed(&self, category: Category, points: usize, option: &FeedOption) {
        self.update(option.input(), |s| {
            s.category = Some(category);
            s.feed_count += 1;
            s.points += points as u64;
            s.last_feed = Some(Utc::now());
            if let Some(cost) = option.collect_cost() {
                s.last_cost = Some(cost);
            }
        });
    }

    fn add_error(&self, input: &str, message: String) {
        self.update(input, |s| {
            s.errors += 1;
            s.last_error = Some(message);
        });
    }

    pub fn get(&self, input: &str) -> Option<InputFeedSnapshot> {
        let ht = self.inner.lock().unwrap();
        ht.get(input).cloned()
    }

    /// Snapshot of all inputs, sorted by input name.
    pub fn snapshot(&self) -> Vec<InputFeedSnapshot> {
        let ht = self.inner.lock().unwrap();
        let mut all: Vec<InputFeedSnapshot> = ht.values().cloned().collect();
        all.sort_by(|a, b| a.input.cmp(&b.input));
        all
    }

    pub fn total_points(&self) -> u64 {
        let ht = self.inner.lock().unwrap();
        ht.values().map(|s| s.points).sum()
    }

    pub fn total_errors(&self) -> u64 {
        let ht = self.inner.lock().unwrap();
        ht.values().map(|s| s.errors).sum()
    }
}

/// Count what passes through another feeder.
pub struct StatsFeeder {
    inner: ArcFeeder,
    stats: Arc<FeedStats>,
}

impl StatsFeeder {
    pub fn new(inner: ArcFeeder) -> Self {
        StatsFeeder {
            inner,
            stats: Arc::new(FeedStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<FeedStats> {
        Arc::clone(&self.stats)
    }
}

impl Feeder for StatsFeeder {
    fn feed(
        &self,
        category: Category,
        points: Vec<Point>,
        option: &FeedOption,
    ) -> Result<(), FeedError> {
        let count = points.len();
        match self.inner.feed(category, points, option) {
            Ok(_) => {
                self.stats.add_feed(category, count, option);
                Ok(())
            }
            Err(e) => {
                self.stats.add_error(option.input(), e.to_string());
                Err(e)
            }
        }
    }

    fn feed_last_error(&self, err: LastError) {
        self.stats.add_error(&err.input, err.message.clone());
        self.inner.feed_last_error(err);
    }
}
