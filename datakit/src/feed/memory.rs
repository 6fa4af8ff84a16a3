/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;

use dk_point::{Category, Point};

use super::{FeedError, FeedOption, Feeder, LastError};

#[derive(Clone, Debug)]
pub struct FedBatch {
    pub category: Category,
    pub option: FeedOption,
    pub points: Vec<Point>,
}

/// Keep everything fed in memory, mostly for tests.
#[derive(Default)]
pub struct MemoryFeeder {
    batches: Mutex<Vec<FedBatch>>,
    errors: Mutex<Vec<LastError>>,
    notify: Notify,
}

impl MemoryFeeder {
    pub fn point_count(&self) -> usize {
        let batches = self.batches.lock().unwrap();
        batches.iter().map(|b| b.points.len()).sum()
    }

    pub fn batches(&self) -> Vec<FedBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn points(&self) -> Vec<Point> {
        let batches = self.batches.lock().unwrap();
        batches.iter().flat_map(|b| b.points.clone()).collect()
    }

    pub fn last_errors(&self) -> Vec<LastError> {
        self.errors.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.batches.lock().unwrap().clear();
        self.errors.lock().unwrap().clear();
    }

    async fn wait_until<F>(&self, f: F)
    where
        F: Fn(&Self) -> bool,
    {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if f(self) {
                return;
            }
            notified.await;
        }
    }

    /// Wait until at least `n` points are fed, return false on timeout.
    pub async fn wait_points(&self, n: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_until(|f| f.point_count() >= n))
            .await
            .is_ok()
    }

    /// Wait until at least `n` last errors are fed, return false on timeout.
    pub async fn wait_errors(&self, n: usize, timeout: Duration) -> bool {
        tokio::time::timeout(
            timeout,
            self.wait_until(|f| f.errors.lock().unwrap().len() >= n),
        )
        .await
        .is_ok()
    }
}

impl Feeder for MemoryFeeder {
    fn feed(
        &self,
        category: Category,
        points: Vec<Point>,
        option: &FeedOption,
    ) -> Result<(), FeedError> {
        let mut batches = self.batches.lock().unwrap();
        batches.push(FedBatch {
            category,
            option: option.clone(),
            points,
        });
        drop(batches);
        self.notify.notify_waiters();
        Ok(())
    }

    fn feed_last_error(&self, err: LastError) {
        self.errors.lock().unwrap().push(err);
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dk_point::FieldValue;

    fn point(v: i64) -> Point {
        Point::builder("m").field("v", v).build().unwrap()
    }

    #[tokio::test]
    async fn wait_points() {
        let feeder = Arc::new(MemoryFeeder::default());
        let f2 = Arc::clone(&feeder);
        tokio::spawn(async move {
            for i in 0..3 {
                f2.feed(Category::Metric, vec![point(i)], &FeedOption::new("t"))
                    .unwrap();
                tokio::task::yield_now().await;
            }
        });

        assert!(feeder.wait_points(3, Duration::from_secs(1)).await);
        assert_eq!(feeder.batches().len(), 3);
        assert_eq!(feeder.points()[2].get_field("v"), Some(&FieldValue::Int(2)));
        assert!(!feeder.wait_points(4, Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn wait_errors() {
        let feeder = MemoryFeeder::default();
        feeder.feed_last_error(LastError::new("t", "boom".to_string()));
        assert!(feeder.wait_errors(1, Duration::from_millis(10)).await);
        assert_eq!(feeder.last_errors()[0].message, "boom");

        feeder.clear();
        assert_eq!(feeder.point_count(), 0);
        assert!(feeder.last_errors().is_empty());
    }
}
