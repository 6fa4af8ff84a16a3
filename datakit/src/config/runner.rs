/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::anyhow;
use toml::Table;

pub const DEFAULT_MAX_CRASH: u32 = 6;
pub const DEFAULT_STARTUP_JITTER: Duration = Duration::from_secs(10);

/// Supervision settings of input tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    pub max_crash: u32,
    pub startup_jitter: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            max_crash: DEFAULT_MAX_CRASH,
            startup_jitter: DEFAULT_STARTUP_JITTER,
        }
    }
}

impl RunnerConfig {
    pub(super) fn parse(table: &Table) -> anyhow::Result<Self> {
        let mut config = RunnerConfig::default();
        dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
            "max_crash" => {
                let n = dk_toml::value::as_u32(v)?;
                if n == 0 {
                    return Err(anyhow!("max crash should not be 0"));
                }
                config.max_crash = n;
                Ok(())
            }
            "startup_jitter" => {
                config.startup_jitter = dk_toml::humanize::as_duration(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let table = dk_toml::parse_str("max-crash = 2\nstartup_jitter = 0").unwrap();
        let config = RunnerConfig::parse(&table).unwrap();
        assert_eq!(config.max_crash, 2);
        assert_eq!(config.startup_jitter, Duration::ZERO);

        let table = dk_toml::parse_str("max_crash = 0").unwrap();
        assert!(RunnerConfig::parse(&table).is_err());
    }
}
