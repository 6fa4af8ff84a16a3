/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::info;

use crate::agent::Agent;
use crate::control::ExitSignal;

pub trait AsyncSignalAction: Clone + Send + 'static {
    fn run(&self) -> impl Future<Output = ()> + Send;
}

#[cfg(unix)]
mod unix {
    use std::future::poll_fn;

    use anyhow::anyhow;
    use log::info;
    use tokio::signal::unix::{SignalKind, signal};

    use super::AsyncSignalAction;

    fn spawn_once<A>(kind: SignalKind, kind_name: &str, action: A) -> anyhow::Result<()>
    where
        A: AsyncSignalAction,
    {
        let mut sig = signal(kind).map_err(|e| anyhow!("failed to create {kind_name} listener: {e}"))?;
        let kind_name = kind_name.to_string();
        tokio::spawn(async move {
            if poll_fn(|cx| sig.poll_recv(cx)).await.is_some() {
                info!("got {kind_name} signal");
                action.run().await;
            }
        });
        Ok(())
    }

    pub(super) fn register_quit<A: AsyncSignalAction>(do_quit: A) -> anyhow::Result<()> {
        spawn_once(SignalKind::quit(), "SIGQUIT", do_quit.clone())?;
        spawn_once(SignalKind::interrupt(), "SIGINT", do_quit)
    }

    pub(super) fn register_offline<A: AsyncSignalAction>(go_offline: A) -> anyhow::Result<()> {
        spawn_once(SignalKind::terminate(), "SIGTERM", go_offline)
    }

    pub(super) fn register_reload<A: AsyncSignalAction>(call_reload: A) -> anyhow::Result<()> {
        let mut hup_sig = signal(SignalKind::hangup())
            .map_err(|e| anyhow!("failed to create SIGHUP listener: {e}"))?;
        tokio::spawn(async move {
            loop {
                if poll_fn(|cx| hup_sig.poll_recv(cx)).await.is_none() {
                    break;
                }
                info!("got reload signal");
                call_reload.run().await;
            }
        });
        Ok(())
    }
}

#[cfg(not(unix))]
fn register_ctrl_c<A: AsyncSignalAction>(do_quit: A) -> anyhow::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("got ctrl-c");
            do_quit.run().await;
        }
    });
    Ok(())
}

#[derive(Clone)]
struct QuitAction {
    exit: ExitSignal,
}

impl AsyncSignalAction for QuitAction {
    async fn run(&self) {
        self.exit.trigger();
    }
}

#[cfg_attr(not(unix), allow(unused))]
#[derive(Clone)]
struct OfflineAction {
    exit: ExitSignal,
}

impl AsyncSignalAction for OfflineAction {
    async fn run(&self) {
        info!("going offline, stop all inputs");
        self.exit.trigger();
    }
}

#[cfg_attr(not(unix), allow(unused))]
#[derive(Clone)]
struct ReloadAction {
    agent: Arc<Agent>,
}

impl AsyncSignalAction for ReloadAction {
    async fn run(&self) {
        self.agent.reload().await
    }
}

/// Install signal handlers. Must be called inside the runtime.
pub fn register(agent: &Arc<Agent>) -> anyhow::Result<()> {
    let exit = agent.exit().clone();
    #[cfg(unix)]
    {
        unix::register_reload(ReloadAction {
            agent: Arc::clone(agent),
        })?;
        unix::register_offline(OfflineAction { exit: exit.clone() })?;
        unix::register_quit(QuitAction { exit })
    }
    #[cfg(not(unix))]
    register_ctrl_c(QuitAction { exit })
}
