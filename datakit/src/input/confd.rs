/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use super::ConfKey;
use super::runner::InputRunner;
use crate::config::inputs::InputMap;

/// Input kinds that survive a reload even if no conf mentions them.
const RESERVED_INPUTS: &[&str] = &["dk"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompareSummary {
    pub added: usize,
    pub removed: usize,
    pub kept: usize,
}

impl fmt::Display for CompareSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added {}, removed {}, kept {}",
            self.added, self.removed, self.kept
        )
    }
}

/// Bring the live instances in line with a freshly loaded input map.
///
/// Instances whose conf key is unchanged keep running.
pub fn compare_inputs(
    runner: &InputRunner,
    new: InputMap,
    default_enabled: &[String],
) -> CompareSummary {
    let registry = runner.registry();
    let mut summary = CompareSummary::default();

    for (name, list) in &new {
        let keys: BTreeSet<&ConfKey> = list.iter().map(|i| i.conf_key()).collect();
        for old in registry.instances_of(name) {
            if !keys.contains(old.conf_key()) {
                debug!("confd: stop input {name} ({})", old.conf_key());
                registry.remove_input(name, old.conf_key());
                summary.removed += 1;
            }
        }

        for info in list {
            if registry
                .get_inputs_by_conf_key(name, info.conf_key())
                .is_some()
            {
                summary.kept += 1;
                continue;
            }
            if registry.add_input(Arc::clone(info)) {
                debug!("confd: start input {name} ({})", info.conf_key());
                runner.spawn(Arc::clone(info));
                summary.added += 1;
            }
        }
    }

    for name in registry.input_names() {
        if new.contains_key(&name)
            || default_enabled.contains(&name)
            || RESERVED_INPUTS.contains(&name.as_str())
        {
            continue;
        }
        let removed = registry.remove_all(&name);
        debug!("confd: stop all {} instances of input {name}", removed.len());
        summary.removed += removed.len();
    }

    info!("confd: {summary}");
    summary
}
