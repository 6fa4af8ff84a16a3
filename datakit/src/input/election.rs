/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, mpsc, watch};

use super::{ElectionInput, Input, InputRegistry};
use crate::control::ExitSignal;

pub const ELECTION_PAUSE_TIMEOUT: Duration = Duration::from_secs(15);
pub const ELECTION_RESUME_TIMEOUT: Duration = Duration::from_secs(15);
pub const ELECTION_PAUSE_CHANNEL_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("pause {0} timed out")]
    PauseTimeout(String),
    #[error("resume {0} timed out")]
    ResumeTimeout(String),
    #[error("input {0} is not running")]
    Closed(String),
}

/// Pause/resume requests for one election input.
///
/// The sender side is used by the election coordinator, the receiver side is
/// polled by the input run loop. `true` means pause.
pub struct ElectionSwitch {
    name: String,
    sender: mpsc::Sender<bool>,
    receiver: Mutex<mpsc::Receiver<bool>>,
}

impl ElectionSwitch {
    pub fn new(name: &str) -> Self {
        let (sender, receiver) = mpsc::channel(ELECTION_PAUSE_CHANNEL_LENGTH);
        ElectionSwitch {
            name: name.to_string(),
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    async fn send(&self, pause: bool, timeout: Duration) -> Result<(), ElectionError> {
        match tokio::time::timeout(timeout, self.sender.send(pause)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(ElectionError::Closed(self.name.clone())),
            Err(_) if pause => Err(ElectionError::PauseTimeout(self.name.clone())),
            Err(_) => Err(ElectionError::ResumeTimeout(self.name.clone())),
        }
    }

    /// Lock the receiver for the lifetime of one run loop.
    pub async fn receiver(&self) -> MutexGuard<'_, mpsc::Receiver<bool>> {
        self.receiver.lock().await
    }
}

#[async_trait]
impl ElectionInput for ElectionSwitch {
    async fn pause(&self) -> Result<(), ElectionError> {
        self.send(true, ELECTION_PAUSE_TIMEOUT).await
    }

    async fn resume(&self) -> Result<(), ElectionError> {
        self.send(false, ELECTION_RESUME_TIMEOUT).await
    }
}

async fn apply_leader(registry: &InputRegistry, leader: bool) {
    for info in registry.iterate_inputs() {
        let input = info.input();
        let Some(election) = input.election() else {
            continue;
        };
        if !input.election_enabled() {
            continue;
        }

        let r = if leader {
            election.resume().await
        } else {
            election.pause().await
        };
        if let Err(e) = r {
            warn!("election: failed to switch input {}: {e}", info.name());
        }
    }
}

/// Bring one starting input in line with the current leader flag.
///
/// The flag is read again after a pause, a leader change racing with the
/// pause request would otherwise be lost.
pub(crate) async fn sync_leader(input: &dyn Input, leader: &watch::Receiver<bool>) {
    let Some(election) = input.election() else {
        return;
    };
    let is_leader = *leader.borrow();
    if is_leader {
        return;
    }
    if let Err(e) = election.pause().await {
        warn!("election: failed to pause new input: {e}");
        return;
    }
    let is_leader = *leader.borrow();
    if is_leader && let Err(e) = election.resume().await {
        warn!("election: failed to resume new input: {e}");
    }
}

/// Follow the external leader flag and pause or resume all election inputs.
pub async fn watch_leader(
    registry: Arc<InputRegistry>,
    mut leader: watch::Receiver<bool>,
    exit: ExitSignal,
) {
    loop {
        let is_leader = *leader.borrow_and_update();
        info!(
            "election: {} election inputs",
            if is_leader { "resume" } else { "pause" }
        );
        apply_leader(&registry, is_leader).await;

        tokio::select! {
            r = leader.changed() => {
                if r.is_err() {
                    break;
                }
            }
            _ = exit.wait() => break,
        }
    }
}
