/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;

use super::{Creator, EnvMap, Input, InputError, StopSignal};

/// Digest of one input config table, identifies an instance across reloads.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfKey(String);

impl ConfKey {
    pub fn new(name: &str, table: &toml::Table) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
        hasher.update(table.to_string().as_bytes());
        ConfKey(hex::encode(&hasher.finalize().as_bytes()[..16]))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One live input instance.
pub struct InputInfo {
    name: String,
    input: Arc<dyn Input>,
    conf_key: ConfKey,
    config_path: Option<PathBuf>,
    table: toml::Table,
    stop: StopSignal,
}

impl InputInfo {
    /// Build an instance from its config table.
    pub fn create(
        name: &str,
        creator: Creator,
        table: toml::Table,
        config_path: Option<&Path>,
        envs: Option<&EnvMap>,
    ) -> Result<Self, InputError> {
        let mut input = creator();
        input
            .load_config(&table)
            .map_err(|e| InputError::InvalidConfig(name.to_string(), e))?;
        if let Some(envs) = envs
            && let Err(e) = input.read_env(envs)
        {
            warn!("input {name}: ignore invalid env settings: {e:?}");
        }
        Ok(InputInfo::new(name, Arc::from(input), table, config_path))
    }

    pub fn new(
        name: &str,
        input: Arc<dyn Input>,
        table: toml::Table,
        config_path: Option<&Path>,
    ) -> Self {
        InputInfo {
            name: name.to_string(),
            input,
            conf_key: ConfKey::new(name, &table),
            config_path: config_path.map(|p| p.to_path_buf()),
            table,
            stop: StopSignal::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn input(&self) -> &Arc<dyn Input> {
        &self.input
    }

    #[inline]
    pub fn conf_key(&self) -> &ConfKey {
        &self.conf_key
    }

    #[inline]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    #[inline]
    pub fn table(&self) -> &toml::Table {
        &self.table
    }

    #[inline]
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn terminate(&self) {
        self.stop.close();
        self.input.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conf_key() {
        let t1 = dk_toml::parse_str("interval = \"10s\"\n[tags]\na = \"1\"").unwrap();
        let t2 = dk_toml::parse_str("[tags]\na = \"1\"\n\ninterval = \"10s\"").unwrap();
        let t3 = dk_toml::parse_str("interval = \"20s\"").unwrap();
        assert_eq!(ConfKey::new("cpu", &t1), ConfKey::new("cpu", &t2));
        assert_ne!(ConfKey::new("cpu", &t1), ConfKey::new("mem", &t1));
        assert_ne!(ConfKey::new("cpu", &t1), ConfKey::new("cpu", &t3));
        assert_eq!(ConfKey::new("cpu", &t1).as_str().len(), 32);
    }
}
