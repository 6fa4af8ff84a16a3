/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use log::LevelFilter;
use toml::{Table, Value};

use dk_point::TagMap;

use crate::feed::FeederKind;
use crate::input::{EnvMap, InputRegistry, LoadStatus};

mod election;
pub use election::ElectionConfig;

mod env;
pub use env::{apply_env, parse_global_tags};

mod host;
pub use host::HostInfo;

pub mod inputs;

mod runner;
pub use runner::RunnerConfig;

mod runtime;
pub use runtime::RuntimeConfig;

mod tags;
pub use tags::GlobalTags;

const DEFAULT_CONFD_DIR: &str = "conf.d";

/// The main `datakit.conf`, with environment overrides applied.
#[derive(Clone, Debug)]
pub struct MainConfig {
    pub name: String,
    pub hostname: String,
    pub confd_dir: PathBuf,
    pub default_enabled_inputs: Vec<String>,
    pub protect_mode: bool,
    pub docker: bool,
    pub log_level: Option<LevelFilter>,
    pub global_host_tags: TagMap,
    pub election: ElectionConfig,
    pub feeder: FeederKind,
    pub runner: RunnerConfig,
    pub runtime: RuntimeConfig,
    /// Extra input conf passed through `ENV_DATAKIT_INPUTS`.
    pub extra_inputs: Option<String>,
}

impl Default for MainConfig {
    fn default() -> Self {
        MainConfig {
            name: String::new(),
            hostname: String::new(),
            confd_dir: PathBuf::from(DEFAULT_CONFD_DIR),
            default_enabled_inputs: Vec::new(),
            protect_mode: true,
            docker: false,
            log_level: None,
            global_host_tags: TagMap::default(),
            election: ElectionConfig::default(),
            feeder: FeederKind::default(),
            runner: RunnerConfig::default(),
            runtime: RuntimeConfig::default(),
            extra_inputs: None,
        }
    }
}

impl MainConfig {
    /// Parse the main config table. Relative paths are resolved against `base_dir`.
    pub fn parse(table: &Table, base_dir: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = MainConfig::default();
        dk_toml::foreach_kv(table, |k, v| config.set(k, v))?;

        if config.confd_dir.is_relative()
            && let Some(dir) = base_dir
        {
            config.confd_dir = dir.join(&config.confd_dir);
        }
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Value) -> anyhow::Result<()> {
        match dk_toml::key::normalize(k).as_str() {
            "name" => {
                self.name = dk_toml::value::as_string(v)?;
                Ok(())
            }
            "hostname" => {
                self.hostname = dk_toml::value::as_string(v)?;
                Ok(())
            }
            "confd_dir" | "conf_dir" => {
                let dir = dk_toml::value::as_string(v)?;
                if !dir.is_empty() {
                    self.confd_dir = PathBuf::from(dir);
                }
                Ok(())
            }
            "default_enabled_inputs" | "default_inputs" => {
                let list = dk_toml::value::as_list(v, dk_toml::value::as_string)?;
                self.default_enabled_inputs = dedup_input_names(list);
                Ok(())
            }
            "protect_mode" => {
                self.protect_mode = dk_toml::value::as_bool(v)?;
                Ok(())
            }
            "docker" | "docker_mode" => {
                self.docker = dk_toml::value::as_bool(v)?;
                Ok(())
            }
            "log_level" => {
                let s = dk_toml::value::as_string(v)?;
                let level = crate::log::parse_level(&s)
                    .ok_or_else(|| anyhow!("invalid log level {s}"))?;
                self.log_level = Some(level);
                Ok(())
            }
            "global_host_tags" | "global_tags" => {
                let tags = dk_toml::value::as_tag_map(v)?;
                self.global_host_tags.extend(tags);
                Ok(())
            }
            "election" => {
                let table = dk_toml::value::as_table(v)?;
                self.election = ElectionConfig::parse(table)?;
                Ok(())
            }
            "io" => {
                let table = dk_toml::value::as_table(v)?;
                dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
                    "feeder" => {
                        let s = dk_toml::value::as_string(v)?;
                        self.feeder = FeederKind::from_str(&s)?;
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })
            }
            "runner" => {
                let table = dk_toml::value::as_table(v)?;
                self.runner = RunnerConfig::parse(table)?;
                Ok(())
            }
            "runtime" => {
                let table = dk_toml::value::as_table(v)?;
                self.runtime = RuntimeConfig::parse(table)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k} in main conf")),
        }
    }
}

/// Drop duplicated names and the `-` placeholder, keep the order.
pub(crate) fn dedup_input_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || name == "-" {
            continue;
        }
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

pub const SAMPLE_MAIN_CONFIG: &str = r#"name = ""
hostname = ""
confd_dir = "conf.d"
default_enabled_inputs = ["self"]
protect_mode = true
docker = false

[global_host_tags]
# host_ip = "__datakit_ip"

[election]
enable = false
namespace = "default"
enable_namespace_tag = false
[election.tags]
# project = "a"

[io]
feeder = "console"

[runner]
max_crash = 6
startup_jitter = "10s"

[runtime]
# thread_number = 4
"#;

fn load_file(path: &Path, envs: &EnvMap) -> anyhow::Result<MainConfig> {
    let table = dk_toml::load_file(path)?;
    let mut config = MainConfig::parse(&table, path.parent())
        .context(format!("invalid main conf {}", path.display()))?;
    apply_env(&mut config, envs);
    Ok(config)
}

/// Load the main config file and apply the environment overrides.
///
/// The load status is recorded in the registry's config info.
pub fn load(path: &Path, envs: &EnvMap, registry: &InputRegistry) -> anyhow::Result<MainConfig> {
    match load_file(path, envs) {
        Ok(config) => {
            registry.update_datakit_config_info(path, LoadStatus::Loaded, Some(&config.confd_dir));
            Ok(config)
        }
        Err(e) => {
            registry.update_datakit_config_info(path, LoadStatus::Failed, None);
            Err(e)
        }
    }
}

/// Clamp a collect interval in protect mode.
pub fn protected_interval(
    protect_mode: bool,
    min: Duration,
    max: Duration,
    cur: Duration,
) -> Duration {
    if !protect_mode {
        return cur;
    }
    cur.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
name = "dk-node-1"
confd_dir = "conf.d"
default_enabled_inputs = ["self", "cpu", "self", "-"]
protect-mode = false

[global_host_tags]
region = "cn"

[election]
enable = true
namespace = "prod"
enable_namespace_tag = true
[election.tags]
project = "a"

[io]
feeder = "discard"

[runner]
max_crash = 3
startup_jitter = "2s"

[runtime]
thread_number = 2
"#;

    #[test]
    fn sample_main_config() {
        let table = dk_toml::parse_str(SAMPLE_MAIN_CONFIG).unwrap();
        let config = MainConfig::parse(&table, None).unwrap();
        assert_eq!(config.runner.max_crash, 6);
        assert_eq!(config.default_enabled_inputs, vec!["self".to_string()]);
    }

    #[test]
    fn load_records_status() {
        let dir = std::env::temp_dir().join(format!("dk-main-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("datakit.conf");
        let registry = InputRegistry::default();

        std::fs::write(&path, SAMPLE).unwrap();
        let config = load(&path, &EnvMap::new(), &registry).unwrap();
        assert_eq!(config.confd_dir, dir.join("conf.d"));
        let v = registry.config_info_json();
        assert_eq!(v["datakit"]["config_paths"][0]["loaded"], 1);
        assert_eq!(
            v["datakit"]["config_dir"],
            dir.join("conf.d").display().to_string()
        );

        std::fs::write(&path, "name = ").unwrap();
        assert!(load(&path, &EnvMap::new(), &registry).is_err());
        assert_eq!(
            registry.config_info().main_config_status(),
            Some(LoadStatus::Failed)
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn parse_sample() {
        let table = dk_toml::parse_str(SAMPLE).unwrap();
        let config = MainConfig::parse(&table, Some(Path::new("/etc/datakit"))).unwrap();
        assert_eq!(config.name, "dk-node-1");
        assert_eq!(config.confd_dir, PathBuf::from("/etc/datakit/conf.d"));
        assert_eq!(config.default_enabled_inputs, vec!["self", "cpu"]);
        assert!(!config.protect_mode);
        assert_eq!(config.global_host_tags.get("region"), Some("cn"));
        assert!(config.election.enable);
        assert_eq!(config.election.namespace, "prod");
        assert!(config.election.enable_namespace_tag);
        assert_eq!(config.election.tags.get("project"), Some("a"));
        assert_eq!(config.feeder, FeederKind::Discard);
        assert_eq!(config.runner.max_crash, 3);
        assert_eq!(config.runner.startup_jitter, Duration::from_secs(2));
        assert_eq!(config.runtime.thread_number, Some(2));
    }

    #[test]
    fn parse_err() {
        let table = dk_toml::parse_str("unknown = 1").unwrap();
        assert!(MainConfig::parse(&table, None).is_err());

        let table = dk_toml::parse_str("[io]\nfeeder = \"kafka\"").unwrap();
        assert!(MainConfig::parse(&table, None).is_err());

        let table = dk_toml::parse_str("log_level = \"loud\"").unwrap();
        assert!(MainConfig::parse(&table, None).is_err());
    }

    #[test]
    fn defaults() {
        let config = MainConfig::parse(&Table::new(), None).unwrap();
        assert_eq!(config.confd_dir, PathBuf::from("conf.d"));
        assert!(config.protect_mode);
        assert_eq!(config.runner.max_crash, 6);
        assert_eq!(config.feeder, FeederKind::Console);
    }

    #[test]
    fn protected() {
        let min = Duration::from_secs(10);
        let max = Duration::from_secs(60);
        assert_eq!(
            protected_interval(true, min, max, Duration::from_secs(1)),
            min
        );
        assert_eq!(
            protected_interval(true, min, max, Duration::from_secs(120)),
            max
        );
        assert_eq!(
            protected_interval(true, min, max, Duration::from_secs(30)),
            Duration::from_secs(30)
        );
        assert_eq!(
            protected_interval(false, min, max, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn dedup() {
        let names = vec!["a", "b", "-", "a", " c ", ""]
            .into_iter()
            .map(String::from);
        assert_eq!(dedup_input_names(names), vec!["a", "b", "c"]);
    }
}
