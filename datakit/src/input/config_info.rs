/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Failed = 0,
    Loaded = 1,
    ModifiedNotLoaded = 2,
}

#[derive(Clone, Debug, Default)]
struct InputConfigInfo {
    category: String,
    sample_config: String,
    paths: BTreeSet<PathBuf>,
}

#[derive(Clone, Debug)]
struct MainConfigInfo {
    path: PathBuf,
    status: LoadStatus,
    config_dir: Option<PathBuf>,
    sample_config: &'static str,
}

/// Which conf file loaded which input, and how that went.
#[derive(Clone, Debug, Default)]
pub struct ConfigInfo {
    datakit: Option<MainConfigInfo>,
    inputs: BTreeMap<String, InputConfigInfo>,
    paths: BTreeMap<PathBuf, LoadStatus>,
}

impl ConfigInfo {
    /// Record the main config file. The conf dir is only known after a successful load.
    pub fn set_main_config(
        &mut self,
        path: &Path,
        status: LoadStatus,
        config_dir: Option<&Path>,
        sample_config: &'static str,
    ) {
        self.datakit = Some(MainConfigInfo {
            path: path.to_path_buf(),
            status,
            config_dir: config_dir.map(|p| p.to_path_buf()),
            sample_config,
        });
    }

    pub fn main_config_status(&self) -> Option<LoadStatus> {
        self.datakit.as_ref().map(|d| d.status)
    }

    pub fn set_input_meta(&mut self, name: &str, category: &str, sample_config: &str) {
        let entry = self.inputs.entry(name.to_string()).or_default();
        entry.category = category.to_string();
        entry.sample_config = sample_config.to_string();
    }

    pub fn add_path(&mut self, name: &str, path: &Path, status: LoadStatus) {
        let entry = self.inputs.entry(name.to_string()).or_default();
        entry.paths.insert(path.to_path_buf());
        self.paths.insert(path.to_path_buf(), status);
    }

    /// Record the status of a path no input could be loaded from.
    pub fn set_path_status(&mut self, path: &Path, status: LoadStatus) {
        self.paths.insert(path.to_path_buf(), status);
    }

    pub fn mark_modified(&mut self, path: &Path) -> bool {
        match self.paths.get_mut(path) {
            Some(status) => {
                *status = LoadStatus::ModifiedNotLoaded;
                true
            }
            None => false,
        }
    }

    pub fn delete_path(&mut self, name: &str, path: &Path) {
        if let Some(entry) = self.inputs.get_mut(name) {
            entry.paths.remove(path);
        }
        let referenced = self.inputs.values().any(|e| e.paths.contains(path));
        if !referenced {
            self.paths.remove(path);
        }
    }

    pub fn path_status(&self, path: &Path) -> Option<LoadStatus> {
        self.paths.get(path).copied()
    }

    pub fn input_paths(&self, name: &str) -> Vec<PathBuf> {
        self.inputs
            .get(name)
            .map(|e| e.paths.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_paths(&mut self) {
        self.paths.clear();
        for entry in self.inputs.values_mut() {
            entry.paths.clear();
        }
    }

    pub fn to_json(&self) -> Value {
        let mut inputs = serde_json::Map::new();
        for (name, info) in &self.inputs {
            let paths: Vec<Value> = info
                .paths
                .iter()
                .map(|p| {
                    let loaded = self
                        .paths
                        .get(p)
                        .copied()
                        .unwrap_or(LoadStatus::ModifiedNotLoaded);
                    json!({
                        "path": p.display().to_string(),
                        "loaded": loaded as u8,
                    })
                })
                .collect();
            inputs.insert(
                name.clone(),
                json!({
                    "category": info.category,
                    "sample_config": info.sample_config,
                    "config_paths": paths,
                }),
            );
        }

        let failed: Vec<Value> = self
            .paths
            .iter()
            .filter(|(_, s)| **s == LoadStatus::Failed)
            .map(|(p, _)| Value::String(p.display().to_string()))
            .collect();

        let datakit = match &self.datakit {
            Some(d) => json!({
                "config_paths": [{
                    "path": d.path.display().to_string(),
                    "loaded": d.status as u8,
                }],
                "config_dir": d.config_dir.as_ref().map(|p| p.display().to_string()),
                "sample_config": d.sample_config,
            }),
            None => Value::Null,
        };

        json!({
            "datakit": datakit,
            "inputs": inputs,
            "failed_paths": failed,
        })
    }
}
