/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use log::warn;

use dk_point::{Category, Point};

use super::{FeedError, FeedOption, Feeder, LastError};

/// Print points as line protocol to stdout.
#[derive(Default)]
pub struct ConsoleFeeder {}

impl Feeder for ConsoleFeeder {
    fn feed(
        &self,
        category: Category,
        points: Vec<Point>,
        option: &FeedOption,
    ) -> Result<(), FeedError> {
        let mut buf = Vec::with_capacity(points.len() * 128);
        for pt in &points {
            writeln!(
                buf,
                "{} {} {}",
                category.alias(),
                option.source(),
                pt.display_line_proto()
            )?;
        }

        let mut stdout = io::stdout().lock();
        stdout.write_all(&buf)?;
        stdout.flush()?;
        Ok(())
    }

    fn feed_last_error(&self, err: LastError) {
        warn!("{err}");
    }
}
