/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use thiserror::Error;

use dk_point::{Category, Point, TagMap};

use crate::config::GlobalTags;
use crate::control::ExitSignal;
use crate::feed::{ArcFeeder, FeedError, FeedOption, FeedStats, LastError};

pub mod builtin;
pub mod confd;
pub mod env;
pub mod measurement;
pub mod ptcheck;
pub mod runner;
pub mod tags;

mod config_info;
pub use config_info::{ConfigInfo, LoadStatus};

mod doc;
pub use doc::print_doc;

mod election;
pub use election::{
    ELECTION_PAUSE_CHANNEL_LENGTH, ELECTION_PAUSE_TIMEOUT, ELECTION_RESUME_TIMEOUT, ElectionError,
    ElectionSwitch, watch_leader,
};

mod info;
pub use info::{ConfKey, InputInfo};

mod registry;
pub use registry::{ArcInputInfo, InputRegistry};
#[cfg(test)]
pub(crate) use registry::tests as registry_tests;

mod signal;
pub use signal::StopSignal;

use measurement::MeasurementInfo;

pub type EnvMap = HashMap<String, String>;

/// Create a fresh, unconfigured instance of one input kind.
pub type Creator = fn() -> Box<dyn Input>;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("no input named {0} registered")]
    NotRegistered(String),
    #[error("input {0} already registered")]
    AlreadyRegistered(String),
    #[error("invalid config for input {0}: {1:?}")]
    InvalidConfig(String, anyhow::Error),
}

#[async_trait]
pub trait ElectionInput: Send + Sync {
    async fn pause(&self) -> Result<(), ElectionError>;
    async fn resume(&self) -> Result<(), ElectionError>;
}

#[async_trait]
pub trait Input: Send + Sync {
    fn catalog(&self) -> &'static str;

    fn sample_config(&self) -> &'static str;

    fn sample_measurements(&self) -> Vec<MeasurementInfo> {
        Vec::new()
    }

    /// Empty means every platform.
    fn available_archs(&self) -> &'static [&'static str] {
        &[]
    }

    fn singleton(&self) -> bool {
        false
    }

    fn load_config(&mut self, table: &toml::Table) -> anyhow::Result<()>;

    fn read_env(&mut self, _envs: &EnvMap) -> anyhow::Result<()> {
        Ok(())
    }

    fn election(&self) -> Option<&dyn ElectionInput> {
        None
    }

    fn election_enabled(&self) -> bool {
        self.election().is_some()
    }

    async fn run(&self, ctx: InputContext);

    fn terminate(&self) {}
}

/// Everything a running input needs from the agent.
#[derive(Clone)]
pub struct InputContext {
    name: String,
    feeder: ArcFeeder,
    stats: Arc<FeedStats>,
    registry: Arc<InputRegistry>,
    global_tags: Arc<ArcSwap<GlobalTags>>,
    exit: ExitSignal,
    stop: StopSignal,
    election: bool,
    protect_mode: bool,
}

impl InputContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        feeder: ArcFeeder,
        stats: Arc<FeedStats>,
        registry: Arc<InputRegistry>,
        global_tags: Arc<ArcSwap<GlobalTags>>,
        exit: ExitSignal,
        stop: StopSignal,
        election: bool,
        protect_mode: bool,
    ) -> Self {
        InputContext {
            name: name.to_string(),
            feeder,
            stats,
            registry,
            global_tags,
            exit,
            stop,
            election,
            protect_mode,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn feeder(&self) -> &ArcFeeder {
        &self.feeder
    }

    #[inline]
    pub fn stats(&self) -> &Arc<FeedStats> {
        &self.stats
    }

    #[inline]
    pub fn registry(&self) -> &Arc<InputRegistry> {
        &self.registry
    }

    #[inline]
    pub fn exit(&self) -> &ExitSignal {
        &self.exit
    }

    #[inline]
    pub fn stop(&self) -> &StopSignal {
        &self.stop
    }

    #[inline]
    pub fn election(&self) -> bool {
        self.election
    }

    pub fn feed_option(&self) -> FeedOption {
        FeedOption::new(&self.name).with_election(self.election)
    }

    pub fn feed(&self, category: Category, points: Vec<Point>) -> Result<(), FeedError> {
        self.feeder.feed(category, points, &self.feed_option())
    }

    pub fn feed_error(&self, category: Category, message: String) {
        self.feeder
            .feed_last_error(LastError::new(&self.name, message).with_category(category));
    }

    /// Election inputs get the election tag set, the others the host tag set.
    pub fn global_tags(&self) -> TagMap {
        let tags = self.global_tags.load();
        if self.election {
            tags.election.clone()
        } else {
            tags.host.clone()
        }
    }

    pub fn protected_interval(&self, min: Duration, max: Duration, cur: Duration) -> Duration {
        crate::config::protected_interval(self.protect_mode, min, max, cur)
    }

    /// Resolve when either the process is exiting or this instance is stopped.
    pub async fn wait_quit(&self) {
        tokio::select! {
            _ = self.exit.wait() => {}
            _ = self.stop.wait() => {}
        }
    }

    pub fn should_quit(&self) -> bool {
        self.exit.is_triggered() || self.stop.is_stopped()
    }
}
