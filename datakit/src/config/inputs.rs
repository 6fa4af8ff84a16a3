/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use toml::{Table, Value};

use super::MainConfig;
use crate::input::{ArcInputInfo, EnvMap, InputInfo, InputRegistry, LoadStatus};

const CONF_EXTENSION: &str = "conf";

/// Input instances by input name, as loaded from config.
pub type InputMap = BTreeMap<String, Vec<ArcInputInfo>>;

/// Collect every `*.conf` file under `dir`, sorted.
pub fn list_conf_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).context(format!("failed to read conf dir {}", dir.display()))?;
    for d_entry in entries {
        let d_entry = match d_entry {
            Ok(d) => d,
            Err(e) => {
                warn!("failed to read entry in conf dir {}: {e}", dir.display());
                continue;
            }
        };
        let path = d_entry.path();

        // this get the real file type, no following
        let file_type = match d_entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!("failed to get file type of {}: {e}", path.display());
                continue;
            }
        };
        if file_type.is_dir() {
            if let Err(e) = walk_dir(&path, files) {
                warn!("{e:?}");
            }
            continue;
        }
        if path.extension().map(|e| e != CONF_EXTENSION).unwrap_or(true) {
            continue;
        }
        if file_type.is_file() {
            files.push(path);
        } else if file_type.is_symlink() {
            match path.canonicalize() {
                Ok(real_file) if real_file.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("skip broken conf link {}: {e}", path.display()),
            }
        }
    }
    Ok(())
}

fn arch_supported(archs: &[&str]) -> bool {
    if archs.is_empty() {
        return true;
    }
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        os => os,
    };
    archs.iter().any(|a| *a == os || *a == "all")
}

fn push_instance(map: &mut InputMap, info: ArcInputInfo) {
    let list = map.entry(info.name().to_string()).or_default();
    if info.input().singleton() && !list.is_empty() {
        warn!("input {} is singleton, extra instance ignored", info.name());
        return;
    }
    if list.iter().any(|i| i.conf_key() == info.conf_key()) {
        debug!("duplicated config for input {}, ignored", info.name());
        return;
    }
    list.push(info);
}

/// Build instances from one conf document.
///
/// Both `[[inputs.<name>]]` arrays and `[inputs.<name>]` tables are accepted.
pub fn parse_inputs(
    registry: &InputRegistry,
    table: &Table,
    path: Option<&Path>,
    envs: Option<&EnvMap>,
) -> anyhow::Result<InputMap> {
    let mut map = InputMap::new();
    dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
        "inputs" => {
            let inputs = dk_toml::value::as_table(v)?;
            for (name, v) in inputs {
                let Some(creator) = registry.creator(name) else {
                    warn!("unknown input {name}, ignored");
                    continue;
                };

                let tables: Vec<&Table> = match v {
                    Value::Table(t) => vec![t],
                    Value::Array(list) => list
                        .iter()
                        .enumerate()
                        .map(|(i, v)| {
                            dk_toml::value::as_table(v)
                                .context(format!("invalid element #{i} of input {name}"))
                        })
                        .collect::<anyhow::Result<Vec<_>>>()?,
                    _ => return Err(anyhow!("invalid value for input {name}")),
                };

                for t in tables {
                    let info = InputInfo::create(name, creator, t.clone(), path, envs)?;
                    if !arch_supported(info.input().available_archs()) {
                        warn!("input {name} is not supported on this platform, ignored");
                        continue;
                    }
                    push_instance(&mut map, Arc::new(info));
                }
            }
            Ok(())
        }
        _ => {
            warn!("unknown top level key {k} in input conf, ignored");
            Ok(())
        }
    })?;
    Ok(map)
}

fn merge(map: &mut InputMap, other: InputMap) {
    for (_, list) in other {
        for info in list {
            push_instance(map, info);
        }
    }
}

fn load_conf_file(
    registry: &InputRegistry,
    path: &Path,
    envs: Option<&EnvMap>,
) -> anyhow::Result<InputMap> {
    let table = dk_toml::load_file(path)?;
    parse_inputs(registry, &table, Some(path), envs)
}

/// Load all input instances: conf dir, `ENV_DATAKIT_INPUTS`, then default-enabled inputs.
///
/// A broken conf file is recorded as failed and skipped.
pub fn load_all(registry: &InputRegistry, config: &MainConfig, envs: &EnvMap) -> InputMap {
    let envs = config.docker.then_some(envs);
    let mut map = InputMap::new();

    match list_conf_files(&config.confd_dir) {
        Ok(files) => {
            for path in files {
                match load_conf_file(registry, &path, envs) {
                    Ok(loaded) => {
                        if loaded.is_empty() {
                            debug!("no input found in conf {}", path.display());
                        }
                        for name in loaded.keys() {
                            registry.add_config_info_path(name, &path, LoadStatus::Loaded);
                        }
                        merge(&mut map, loaded);
                    }
                    Err(e) => {
                        warn!("failed to load input conf {}: {e:?}", path.display());
                        registry.update_config_path_status(&path, LoadStatus::Failed);
                    }
                }
            }
        }
        Err(e) => warn!("{e:?}"),
    }

    if let Some(s) = &config.extra_inputs {
        match dk_toml::parse_str(s).and_then(|t| parse_inputs(registry, &t, None, envs)) {
            Ok(loaded) => merge(&mut map, loaded),
            Err(e) => warn!("invalid inputs conf in ENV_DATAKIT_INPUTS: {e:?}"),
        }
    }

    for name in &config.default_enabled_inputs {
        if map.contains_key(name) {
            continue;
        }
        let Some(creator) = registry.creator(name) else {
            warn!("default enabled input {name} not found, ignored");
            continue;
        };
        match InputInfo::create(name, creator, Table::new(), None, envs) {
            Ok(info) => {
                info!("enable default input {name}");
                push_instance(&mut map, Arc::new(info));
            }
            Err(e) => warn!("failed to create default input {name}: {e}"),
        }
    }

    map
}
