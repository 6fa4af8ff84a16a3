/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::watch;

/// Process wide shutdown broadcast.
#[derive(Clone)]
pub struct ExitSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ExitSignal {
    fn default() -> Self {
        ExitSignal::new()
    }
}

impl ExitSignal {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        ExitSignal {
            sender: Arc::new(sender),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        let _ = receiver.wait_for(|v| *v).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiters() {
        let exit = ExitSignal::new();
        assert!(!exit.is_triggered());

        let exit2 = exit.clone();
        let waiter = tokio::spawn(async move { exit2.wait().await });
        tokio::task::yield_now().await;
        exit.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(exit.is_triggered());
    }

    #[tokio::test]
    async fn wait_after_trigger() {
        let exit = ExitSignal::new();
        exit.trigger();
        tokio::time::timeout(Duration::from_millis(100), exit.wait())
            .await
            .unwrap();
    }
}
