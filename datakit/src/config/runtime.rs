/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, anyhow};
use log::debug;
use tokio::runtime::{Builder, Runtime};
use toml::Table;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub thread_number: Option<usize>,
    pub thread_stack_size: Option<usize>,
}

impl RuntimeConfig {
    pub(super) fn parse(table: &Table) -> anyhow::Result<Self> {
        let mut config = RuntimeConfig::default();
        dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
            "thread_number" => {
                let n = dk_toml::value::as_usize(v)?;
                if n > 0 {
                    config.thread_number = Some(n);
                }
                Ok(())
            }
            "thread_stack_size" => {
                config.thread_stack_size = Some(dk_toml::value::as_usize(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }

    pub fn start(&self) -> anyhow::Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        if let Some(n) = self.thread_number {
            debug!("runtime: using {n} worker threads");
            builder.worker_threads(n);
        }
        if let Some(stack_size) = self.thread_stack_size {
            builder.thread_stack_size(stack_size);
        }
        builder.thread_name_fn(|| {
            static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
            let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
            format!("worker#{id}")
        });
        builder
            .enable_all()
            .build()
            .context("failed to start tokio runtime")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let table = dk_toml::parse_str("thread_number = 4\nthread_stack_size = 2097152").unwrap();
        let config = RuntimeConfig::parse(&table).unwrap();
        assert_eq!(config.thread_number, Some(4));
        assert_eq!(config.thread_stack_size, Some(2097152));

        let table = dk_toml::parse_str("thread_number = \"four\"").unwrap();
        assert!(RuntimeConfig::parse(&table).is_err());
    }

    #[test]
    fn start() {
        let config = RuntimeConfig {
            thread_number: Some(1),
            thread_stack_size: None,
        };
        let rt = config.start().unwrap();
        assert_eq!(rt.block_on(async { 1 + 1 }), 2);
    }
}
