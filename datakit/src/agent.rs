/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use arc_swap::ArcSwap;
use log::{info, warn};
use tokio::sync::{Mutex, watch};

use crate::config::inputs::InputMap;
use crate::config::{GlobalTags, HostInfo, MainConfig};
use crate::control::ExitSignal;
use crate::feed::{ArcFeeder, FeedStats, StatsFeeder};
use crate::input::confd::compare_inputs;
use crate::input::runner::InputRunner;
use crate::input::{EnvMap, InputRegistry};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// The running agent: live inputs, their supervisor and the feed pipeline.
pub struct Agent {
    config: MainConfig,
    envs: EnvMap,
    host: HostInfo,
    runner: InputRunner,
    stats: Arc<FeedStats>,
    global_tags: Arc<ArcSwap<GlobalTags>>,
    exit: ExitSignal,
    leader: watch::Sender<bool>,
    reload_lock: Mutex<()>,
}

impl Agent {
    pub fn new(config: MainConfig, registry: Arc<InputRegistry>, envs: EnvMap) -> Self {
        let host = HostInfo::detect(&config.hostname);
        info!("agent {} running on host {}", config.name, host.hostname);

        let stats_feeder = StatsFeeder::new(crate::feed::build(config.feeder));
        let stats = stats_feeder.stats();
        let feeder: ArcFeeder = Arc::new(stats_feeder);

        let global_tags = Arc::new(ArcSwap::from_pointee(GlobalTags::build(&config, &host)));
        let exit = ExitSignal::new();
        let (leader, _) = watch::channel(true);
        let mut runner = InputRunner::new(
            registry,
            feeder,
            Arc::clone(&stats),
            Arc::clone(&global_tags),
            exit.clone(),
        )
        .with_config(config.runner)
        .with_protect_mode(config.protect_mode);
        if config.election.enable {
            runner = runner.with_leader(leader.subscribe());
        }

        Agent {
            config,
            envs,
            host,
            runner,
            stats,
            global_tags,
            exit,
            leader,
            reload_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn config(&self) -> &MainConfig {
        &self.config
    }

    #[inline]
    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    #[inline]
    pub fn registry(&self) -> &Arc<InputRegistry> {
        self.runner.registry()
    }

    #[inline]
    pub fn stats(&self) -> &Arc<FeedStats> {
        &self.stats
    }

    #[inline]
    pub fn exit(&self) -> &ExitSignal {
        &self.exit
    }

    pub fn global_tags(&self) -> Arc<GlobalTags> {
        self.global_tags.load_full()
    }

    /// Flip the leader flag driving election inputs.
    pub fn set_leader(&self, leader: bool) {
        self.leader.send_replace(leader);
    }

    fn load_inputs(&self) -> InputMap {
        crate::config::inputs::load_all(self.registry(), &self.config, &self.envs)
    }

    /// Load the input confs and start every instance.
    pub fn start(&self) -> usize {
        let registry = self.registry();
        for (_, list) in self.load_inputs() {
            for info in list {
                registry.add_input(info);
            }
        }
        let count = self.runner.run_inputs();

        if self.config.election.enable {
            info!(
                "election enabled in namespace {}",
                self.config.election.namespace
            );
            tokio::spawn(crate::input::watch_leader(
                Arc::clone(registry),
                self.leader.subscribe(),
                self.exit.clone(),
            ));
        }
        count
    }

    async fn load_inputs_blocking(&self) -> anyhow::Result<InputMap> {
        let registry = Arc::clone(self.registry());
        let config = self.config.clone();
        let envs = self.envs.clone();
        tokio::task::spawn_blocking(move || {
            registry.clear_config_info_paths();
            crate::config::inputs::load_all(&registry, &config, &envs)
        })
        .await
        .map_err(|e| anyhow!("failed to join reload task: {e}"))
    }

    /// Re-read the conf dir and apply the difference to the live inputs.
    pub async fn reload(&self) {
        let _guard = self.reload_lock.lock().await;
        info!("reloading input confs");

        match self.load_inputs_blocking().await {
            Ok(map) => {
                let summary =
                    compare_inputs(&self.runner, map, &self.config.default_enabled_inputs);
                info!("reload finished: {summary}");
            }
            Err(e) => {
                warn!("error reloading input confs: {e:?}");
                warn!("reload aborted");
            }
        }
    }

    /// Stop all inputs and wait for them to quit.
    pub async fn shutdown(&self) {
        let _guard = self.reload_lock.lock().await;
        self.exit.trigger();
        self.registry().stop_inputs();
        if !self.runner.join_all(SHUTDOWN_TIMEOUT).await {
            warn!("some inputs did not quit in {SHUTDOWN_TIMEOUT:?}");
        }
        info!("all inputs stopped");
    }

    /// Start, then run until the exit signal fires.
    pub async fn run(&self) {
        let count = self.start();
        info!("{count} inputs running");
        self.exit.wait().await;
        self.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeederKind;
    use crate::input::builtin;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dk-agent-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &std::path::Path) -> MainConfig {
        MainConfig {
            confd_dir: dir.to_path_buf(),
            feeder: FeederKind::Discard,
            runner: crate::config::RunnerConfig {
                max_crash: 6,
                startup_jitter: Duration::ZERO,
            },
            ..Default::default()
        }
    }

    fn new_agent(config: MainConfig) -> Arc<Agent> {
        let registry = Arc::new(InputRegistry::default());
        builtin::register_all(&registry).unwrap();
        Arc::new(Agent::new(config, registry, EnvMap::new()))
    }

    fn agent(dir: &std::path::Path) -> Arc<Agent> {
        new_agent(config(dir))
    }

    #[tokio::test]
    async fn start_reload_shutdown() {
        let dir = temp_dir();
        std::fs::write(dir.join("self.conf"), "[[inputs.self]]\ninterval = \"10s\"").unwrap();

        let agent = agent(&dir);
        assert_eq!(agent.start(), 1);
        assert!(agent.registry().input_enabled("self"));
        assert_eq!(agent.global_tags().host.get("host"), Some(agent.host().hostname.as_str()));

        std::fs::write(dir.join("self.conf"), "[[inputs.self]]\ninterval = \"20s\"").unwrap();
        agent.reload().await;
        let instances = agent.registry().instances_of("self");
        assert_eq!(instances.len(), 1);
        assert_eq!(
            instances[0].table().get("interval").and_then(|v| v.as_str()),
            Some("20s")
        );

        std::fs::remove_file(dir.join("self.conf")).unwrap();
        agent.reload().await;
        assert!(!agent.registry().input_enabled("self"));

        agent.shutdown().await;
        assert!(agent.exit().is_triggered());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn reloaded_election_input_follows_leader() {
        let dir = temp_dir();
        let mut config = config(&dir);
        config.election.enable = true;
        let agent = new_agent(config);
        assert_eq!(agent.start(), 0);
        agent.set_leader(false);

        std::fs::write(
            dir.join("self.conf"),
            "[[inputs.self]]\ninterval = \"1s\"\nelection = true",
        )
        .unwrap();
        agent.reload().await;
        assert!(agent.registry().input_enabled("self"));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(agent.stats().total_points(), 0);

        agent.set_leader(true);
        let resumed = tokio::time::timeout(Duration::from_secs(5), async {
            while agent.stats().total_points() == 0 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;
        assert!(resumed.is_ok());

        agent.shutdown().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn run_until_exit() {
        let dir = temp_dir();
        let agent = agent(&dir);
        let a2 = Arc::clone(&agent);
        let handle = tokio::spawn(async move { a2.run().await });

        tokio::task::yield_now().await;
        agent.exit().trigger();
        handle.await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
