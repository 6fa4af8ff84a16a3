/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::debug;

use dk_point::{Category, Point};

use super::{FeedError, FeedOption, Feeder, LastError};

#[derive(Default)]
pub struct DiscardFeeder {}

impl Feeder for DiscardFeeder {
    fn feed(
        &self,
        _category: Category,
        _points: Vec<Point>,
        _option: &FeedOption,
    ) -> Result<(), FeedError> {
        Ok(())
    }

    fn feed_last_error(&self, err: LastError) {
        debug!("{err}");
    }
}
