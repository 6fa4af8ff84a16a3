/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::Semaphore;

/// Per instance stop semaphore, closed on terminate.
#[derive(Clone)]
pub struct StopSignal {
    sem: Arc<Semaphore>,
}

impl Default for StopSignal {
    fn default() -> Self {
        StopSignal {
            sem: Arc::new(Semaphore::new(0)),
        }
    }
}

impl StopSignal {
    pub fn close(&self) {
        self.sem.close();
    }

    pub fn is_stopped(&self) -> bool {
        self.sem.is_closed()
    }

    pub async fn wait(&self) {
        // no permit is ever added, so acquire only returns once closed
        let _ = self.sem.acquire().await;
    }
}
