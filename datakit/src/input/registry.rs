/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use foldhash::fast::FixedState;
use log::{debug, warn};

use super::{ConfKey, ConfigInfo, Creator, InputError, InputInfo, LoadStatus};

pub type ArcInputInfo = Arc<InputInfo>;

/// Input creators and live instances of one agent.
pub struct InputRegistry {
    creators: Mutex<HashMap<String, Creator, FixedState>>,
    inputs: Mutex<HashMap<String, Vec<ArcInputInfo>, FixedState>>,
    panics: Mutex<HashMap<String, u32, FixedState>>,
    config_info: Mutex<ConfigInfo>,
}

impl Default for InputRegistry {
    fn default() -> Self {
        InputRegistry {
            creators: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
            inputs: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
            panics: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
            config_info: Mutex::new(ConfigInfo::default()),
        }
    }
}

impl InputRegistry {
    pub fn add_creator(&self, name: &str, creator: Creator) -> Result<(), InputError> {
        let mut ht = self.creators.lock().unwrap();
        if ht.contains_key(name) {
            return Err(InputError::AlreadyRegistered(name.to_string()));
        }
        ht.insert(name.to_string(), creator);
        drop(ht);

        let sample = creator();
        let mut config_info = self.config_info.lock().unwrap();
        config_info.set_input_meta(name, sample.catalog(), sample.sample_config());
        Ok(())
    }

    pub fn creator(&self, name: &str) -> Option<Creator> {
        let ht = self.creators.lock().unwrap();
        ht.get(name).copied()
    }

    pub fn creator_names(&self) -> Vec<String> {
        let ht = self.creators.lock().unwrap();
        let mut names: Vec<String> = ht.keys().cloned().collect();
        names.sort();
        names
    }

    /// Add a live instance. Returns false if it was dropped.
    pub fn add_input(&self, info: ArcInputInfo) -> bool {
        let name = info.name().to_string();
        let mut ht = self.inputs.lock().unwrap();
        let list = ht.entry(name.clone()).or_default();

        if info.input().singleton() && !list.is_empty() {
            warn!("input {name} is singleton, ignore the new instance");
            return false;
        }
        if list.iter().any(|i| i.conf_key() == info.conf_key()) {
            debug!("input {name} with conf key {} already added", info.conf_key());
            return false;
        }

        list.push(info);
        true
    }

    /// Remove the instance with the given conf key and terminate it.
    pub fn remove_input(&self, name: &str, conf_key: &ConfKey) -> Option<ArcInputInfo> {
        let mut ht = self.inputs.lock().unwrap();
        let list = ht.get_mut(name)?;
        let pos = list.iter().position(|i| i.conf_key() == conf_key)?;
        let info = list.remove(pos);
        if list.is_empty() {
            ht.remove(name);
        }
        drop(ht);

        info.terminate();
        Some(info)
    }

    /// Remove all instances of the input kind and terminate them.
    pub fn remove_all(&self, name: &str) -> Vec<ArcInputInfo> {
        let mut ht = self.inputs.lock().unwrap();
        let list = ht.remove(name).unwrap_or_default();
        drop(ht);

        for info in &list {
            info.terminate();
        }
        list
    }

    pub fn reset_inputs(&self) {
        let mut ht = self.inputs.lock().unwrap();
        ht.clear();
    }

    pub fn stop_inputs(&self) {
        let ht = self.inputs.lock().unwrap();
        for list in ht.values() {
            for info in list {
                info.terminate();
            }
        }
    }

    pub fn input_names(&self) -> Vec<String> {
        let ht = self.inputs.lock().unwrap();
        let mut names: Vec<String> = ht.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn input_enabled(&self, name: &str) -> bool {
        let ht = self.inputs.lock().unwrap();
        ht.get(name).map(|l| !l.is_empty()).unwrap_or(false)
    }

    pub fn instances_of(&self, name: &str) -> Vec<ArcInputInfo> {
        let ht = self.inputs.lock().unwrap();
        ht.get(name).cloned().unwrap_or_default()
    }

    /// Snapshot of all live instances, at most one for a singleton kind.
    pub fn iterate_inputs(&self) -> Vec<ArcInputInfo> {
        let ht = self.inputs.lock().unwrap();
        let mut all = Vec::new();
        for list in ht.values() {
            match list.first() {
                Some(first) if first.input().singleton() => all.push(Arc::clone(first)),
                Some(_) => all.extend(list.iter().cloned()),
                None => {}
            }
        }
        all
    }

    pub fn input_count(&self) -> usize {
        self.iterate_inputs().len()
    }

    pub fn get_inputs_by_conf_key(&self, name: &str, conf_key: &ConfKey) -> Option<ArcInputInfo> {
        let ht = self.inputs.lock().unwrap();
        ht.get(name)?
            .iter()
            .find(|i| i.conf_key() == conf_key)
            .cloned()
    }

    pub fn add_panic(&self, name: &str) -> u32 {
        let mut ht = self.panics.lock().unwrap();
        let count = ht.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn panic_count(&self, name: &str) -> u32 {
        let ht = self.panics.lock().unwrap();
        ht.get(name).copied().unwrap_or(0)
    }

    pub fn add_config_info_path(&self, name: &str, path: &Path, status: LoadStatus) {
        let mut info = self.config_info.lock().unwrap();
        info.add_path(name, path, status);
    }

    pub fn update_datakit_config_info(
        &self,
        path: &Path,
        status: LoadStatus,
        config_dir: Option<&Path>,
    ) {
        let mut info = self.config_info.lock().unwrap();
        info.set_main_config(path, status, config_dir, crate::config::SAMPLE_MAIN_CONFIG);
    }

    pub fn update_config_path_status(&self, path: &Path, status: LoadStatus) {
        let mut info = self.config_info.lock().unwrap();
        info.set_path_status(path, status);
    }

    pub fn mark_config_path_modified(&self, path: &Path) -> bool {
        let mut info = self.config_info.lock().unwrap();
        info.mark_modified(path)
    }

    pub fn delete_config_info_path(&self, name: &str, path: &Path) {
        let mut info = self.config_info.lock().unwrap();
        info.delete_path(name, path);
    }

    pub fn clear_config_info_paths(&self) {
        let mut info = self.config_info.lock().unwrap();
        info.clear_paths();
    }

    pub fn config_info(&self) -> ConfigInfo {
        self.config_info.lock().unwrap().clone()
    }

    pub fn config_info_json(&self) -> serde_json::Value {
        self.config_info.lock().unwrap().to_json()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::{Input, InputContext};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    pub(crate) struct NopInput {
        singleton: bool,
        terminated: AtomicBool,
    }

    #[async_trait]
    impl Input for NopInput {
        fn catalog(&self) -> &'static str {
            "test"
        }

        fn sample_config(&self) -> &'static str {
            "[[inputs.nop]]"
        }

        fn singleton(&self) -> bool {
            self.singleton
        }

        fn load_config(&mut self, table: &toml::Table) -> anyhow::Result<()> {
            if table.contains_key("bad") {
                return Err(anyhow::anyhow!("bad key"));
            }
            Ok(())
        }

        async fn run(&self, ctx: InputContext) {
            ctx.wait_quit().await;
        }

        fn terminate(&self) {
            self.terminated.store(true, Ordering::Relaxed);
        }
    }

    pub(crate) fn nop_creator() -> Box<dyn Input> {
        Box::new(NopInput::default())
    }

    pub(crate) fn singleton_creator() -> Box<dyn Input> {
        Box::new(NopInput {
            singleton: true,
            ..Default::default()
        })
    }

    pub(crate) fn nop_info(name: &str, conf: &str, creator: Creator) -> ArcInputInfo {
        let table = dk_toml::parse_str(conf).unwrap();
        Arc::new(InputInfo::create(name, creator, table, None, None).unwrap())
    }

    #[test]
    fn creators() {
        let registry = InputRegistry::default();
        registry.add_creator("nop", nop_creator).unwrap();
        assert!(matches!(
            registry.add_creator("nop", nop_creator),
            Err(InputError::AlreadyRegistered(_))
        ));
        assert!(registry.creator("nop").is_some());
        assert!(registry.creator("cpu").is_none());
        assert_eq!(registry.creator_names(), vec!["nop".to_string()]);
        assert_eq!(
            registry.config_info_json()["inputs"]["nop"]["category"],
            "test"
        );
    }

    #[test]
    fn add_and_remove() {
        let registry = InputRegistry::default();
        let a = nop_info("nop", "a = 1", nop_creator);
        let b = nop_info("nop", "b = 1", nop_creator);
        assert!(registry.add_input(Arc::clone(&a)));
        assert!(registry.add_input(Arc::clone(&b)));
        assert!(!registry.add_input(nop_info("nop", "a = 1", nop_creator)));
        assert_eq!(registry.instances_of("nop").len(), 2);
        assert!(registry.input_enabled("nop"));

        let found = registry.get_inputs_by_conf_key("nop", b.conf_key()).unwrap();
        assert!(Arc::ptr_eq(&found, &b));

        let removed = registry.remove_input("nop", a.conf_key()).unwrap();
        assert!(removed.stop_signal().is_stopped());
        assert!(registry.remove_input("nop", a.conf_key()).is_none());
        assert_eq!(registry.iterate_inputs().len(), 1);

        registry.remove_all("nop");
        assert!(b.stop_signal().is_stopped());
        assert!(!registry.input_enabled("nop"));
    }

    #[test]
    fn singleton() {
        let registry = InputRegistry::default();
        assert!(registry.add_input(nop_info("self", "a = 1", singleton_creator)));
        assert!(!registry.add_input(nop_info("self", "a = 2", singleton_creator)));
        assert_eq!(registry.iterate_inputs().len(), 1);
    }

    #[test]
    fn stop_and_reset() {
        let registry = InputRegistry::default();
        let a = nop_info("nop", "a = 1", nop_creator);
        registry.add_input(Arc::clone(&a));
        registry.stop_inputs();
        assert!(a.stop_signal().is_stopped());
        registry.reset_inputs();
        assert_eq!(registry.input_count(), 0);
    }

    #[test]
    fn panics() {
        let registry = InputRegistry::default();
        assert_eq!(registry.panic_count("nop"), 0);
        assert_eq!(registry.add_panic("nop"), 1);
        assert_eq!(registry.add_panic("nop"), 2);
        assert_eq!(registry.panic_count("nop"), 2);
    }

    #[test]
    fn config_paths() {
        let registry = InputRegistry::default();
        let p = Path::new("/conf.d/nop.conf");
        registry.add_config_info_path("nop", p, LoadStatus::Loaded);
        assert!(registry.mark_config_path_modified(p));
        assert_eq!(
            registry.config_info().path_status(p),
            Some(LoadStatus::ModifiedNotLoaded)
        );
        registry.delete_config_info_path("nop", p);
        assert!(registry.config_info().input_paths("nop").is_empty());
    }
}
