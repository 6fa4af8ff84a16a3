/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::election::sync_leader;
use super::{ArcInputInfo, InputContext, InputRegistry};
use crate::config::{GlobalTags, RunnerConfig};
use crate::control::ExitSignal;
use crate::control::panic::payload_message;
use crate::feed::{ArcFeeder, FeedStats, LastError};

/// Spawns and supervises input tasks.
pub struct InputRunner {
    registry: Arc<InputRegistry>,
    feeder: ArcFeeder,
    stats: Arc<FeedStats>,
    global_tags: Arc<ArcSwap<GlobalTags>>,
    exit: ExitSignal,
    config: RunnerConfig,
    protect_mode: bool,
    leader: Option<watch::Receiver<bool>>,
    tasks: Mutex<JoinSet<()>>,
}

impl InputRunner {
    pub fn new(
        registry: Arc<InputRegistry>,
        feeder: ArcFeeder,
        stats: Arc<FeedStats>,
        global_tags: Arc<ArcSwap<GlobalTags>>,
        exit: ExitSignal,
    ) -> Self {
        InputRunner {
            registry,
            feeder,
            stats,
            global_tags,
            exit,
            config: RunnerConfig::default(),
            protect_mode: true,
            leader: None,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_protect_mode(mut self, protect_mode: bool) -> Self {
        self.protect_mode = protect_mode;
        self
    }

    /// Election inputs started by this runner follow the given leader flag.
    pub fn with_leader(mut self, leader: watch::Receiver<bool>) -> Self {
        self.leader = Some(leader);
        self
    }

    #[inline]
    pub fn registry(&self) -> &Arc<InputRegistry> {
        &self.registry
    }

    fn startup_delay(&self) -> Duration {
        let max = self.config.startup_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..max))
    }

    fn context(&self, info: &ArcInputInfo) -> InputContext {
        InputContext::new(
            info.name(),
            Arc::clone(&self.feeder),
            Arc::clone(&self.stats),
            Arc::clone(&self.registry),
            Arc::clone(&self.global_tags),
            self.exit.clone(),
            info.stop_signal().clone(),
            info.input().election_enabled(),
            self.protect_mode,
        )
    }

    /// Start one supervised task for the instance.
    pub fn spawn(&self, info: ArcInputInfo) {
        let ctx = self.context(&info);
        let delay = self.startup_delay();
        let max_crash = self.config.max_crash;
        let leader = self.leader.clone();

        let mut tasks = self.tasks.lock().unwrap();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(protect_running_input(info, ctx, delay, max_crash, leader));
    }

    /// Start every live instance in the registry.
    pub fn run_inputs(&self) -> usize {
        let inputs = self.registry.iterate_inputs();
        let count = inputs.len();
        for info in inputs {
            debug!("starting input {} ({})", info.name(), info.conf_key());
            self.spawn(info);
        }
        info!("{count} inputs started");
        count
    }

    pub fn running_count(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap();
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Wait for all tasks to finish. Tasks still running at timeout are aborted.
    pub async fn join_all(&self, timeout: Duration) -> bool {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
        let joined = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        match joined {
            Ok(_) => true,
            Err(_) => {
                warn!("{} input tasks not quit in time, abort them", tasks.len());
                tasks.abort_all();
                false
            }
        }
    }
}

/// Run the input, re-run it after a panic until the crash limit is hit.
async fn protect_running_input(
    info: ArcInputInfo,
    ctx: InputContext,
    delay: Duration,
    max_crash: u32,
    leader: Option<watch::Receiver<bool>>,
) {
    let name = info.name().to_string();
    if ctx.should_quit() {
        return;
    }
    if !delay.is_zero() {
        debug!("input {name} will start after {delay:?}");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = ctx.wait_quit() => {
                debug!("input {name} quit before start");
                return;
            }
        }
    }

    let mut crash_times = 0u32;
    loop {
        if let Some(leader) = &leader {
            sync_leader(info.input().as_ref(), leader).await;
        }
        let input = Arc::clone(info.input());
        let run_ctx = ctx.clone();
        let handle = tokio::spawn(async move { input.run(run_ctx).await });

        match handle.await {
            Ok(_) => {
                info!("input {name} exited");
                return;
            }
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                let message = payload_message(payload.as_ref()).to_string();
                let source = format!("crash_{name}");

                crash_times += 1;
                ctx.registry().add_panic(&name);
                warn!("input {name} panicked ({crash_times}/{max_crash}): {message}");
                ctx.feeder()
                    .feed_last_error(LastError::new(&name, message).with_source(&source));

                if crash_times >= max_crash {
                    let message = format!(
                        "input '{name}' has exceeded the max crash times {max_crash} and it will be stopped."
                    );
                    warn!("{message}");
                    ctx.feeder()
                        .feed_last_error(LastError::new(&name, message).with_source(&source));
                    return;
                }
                if ctx.should_quit() {
                    return;
                }
            }
            Err(e) => {
                warn!("input {name} task cancelled: {e}");
                return;
            }
        }
    }
}
