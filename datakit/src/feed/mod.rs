/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use thiserror::Error;

use dk_point::{Category, Point};

mod console;
pub use console::ConsoleFeeder;

mod discard;
pub use discard::DiscardFeeder;

mod memory;
pub use memory::{FedBatch, MemoryFeeder};

mod stats;
pub use stats::{FeedStats, InputFeedSnapshot, StatsFeeder};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Options attached to one batch of points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedOption {
    input: String,
    source: Option<String>,
    collect_cost: Option<Duration>,
    election: bool,
}

impl FeedOption {
    pub fn new(input: &str) -> Self {
        FeedOption {
            input: input.to_string(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_collect_cost(mut self, cost: Duration) -> Self {
        self.collect_cost = Some(cost);
        self
    }

    pub fn with_election(mut self, election: bool) -> Self {
        self.election = election;
        self
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The source name, falling back to the input name.
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.input)
    }

    #[inline]
    pub fn collect_cost(&self) -> Option<Duration> {
        self.collect_cost
    }

    #[inline]
    pub fn election(&self) -> bool {
        self.election
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastError {
    pub input: String,
    pub source: Option<String>,
    pub categories: Vec<Category>,
    pub message: String,
    pub time: DateTime<Utc>,
}

impl LastError {
    pub fn new(input: &str, message: String) -> Self {
        LastError {
            input: input.to_string(),
            source: None,
            categories: Vec::new(),
            message,
            time: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.input)?;
        if let Some(source) = &self.source {
            write!(f, "source {source}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// The boundary between collectors and the upload pipeline.
pub trait Feeder: Send + Sync {
    fn feed(
        &self,
        category: Category,
        points: Vec<Point>,
        option: &FeedOption,
    ) -> Result<(), FeedError>;

    fn feed_last_error(&self, err: LastError);
}

pub type ArcFeeder = Arc<dyn Feeder>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeederKind {
    #[default]
    Console,
    Discard,
    Memory,
}

impl FromStr for FeederKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(FeederKind::Console),
            "discard" | "null" => Ok(FeederKind::Discard),
            "memory" => Ok(FeederKind::Memory),
            _ => Err(anyhow!("unsupported feeder kind {s}")),
        }
    }
}

pub fn build(kind: FeederKind) -> ArcFeeder {
    match kind {
        FeederKind::Console => Arc::new(ConsoleFeeder::default()),
        FeederKind::Discard => Arc::new(DiscardFeeder::default()),
        FeederKind::Memory => Arc::new(MemoryFeeder::default()),
    }
}
