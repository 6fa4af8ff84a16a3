/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::{info, warn};

use dk_point::TagMap;

use super::MainConfig;
use crate::input::EnvMap;

/// Parse `k1=v1,k2=v2`. Invalid parts are skipped.
pub fn parse_global_tags(s: &str) -> TagMap {
    let mut tags = TagMap::default();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                tags.insert(k.trim(), v.trim());
            }
            _ => warn!("invalid global tag {part}, ignored"),
        }
    }
    tags
}

fn env_enabled(v: &str) -> bool {
    !matches!(
        v.trim().to_lowercase().as_str(),
        "" | "0" | "off" | "false" | "no"
    )
}

/// Apply `ENV_*` overrides on top of the main config file.
pub fn apply_env(config: &mut MainConfig, envs: &EnvMap) {
    if let Some(v) = envs.get("ENV_HOSTNAME")
        && !v.is_empty()
    {
        info!("set hostname to {v} from env");
        config.hostname = v.clone();
    }
    if let Some(v) = envs.get("ENV_NAME")
        && !v.is_empty()
    {
        config.name = v.clone();
    }

    if let Some(v) = envs.get("ENV_ENABLE_ELECTION") {
        config.election.enable = env_enabled(v);
    }
    if let Some(v) = envs.get("ENV_NAMESPACE") {
        config.election.set_namespace(v.trim().to_string());
    }
    if let Some(v) = envs.get("ENV_ENABLE_ELECTION_NAMESPACE_TAG") {
        config.election.enable_namespace_tag = env_enabled(v);
    }

    if let Some(v) = envs.get("ENV_GLOBAL_HOST_TAGS") {
        config.global_host_tags.extend(parse_global_tags(v));
    }
    if let Some(v) = envs.get("ENV_GLOBAL_ELECTION_TAGS") {
        config.election.tags.extend(parse_global_tags(v));
    }

    if let Some(v) = envs.get("ENV_DEFAULT_ENABLED_INPUTS") {
        config.default_enabled_inputs =
            super::dedup_input_names(v.split(',').map(|s| s.to_string()));
    }
    if let Some(v) = envs.get("ENV_DATAKIT_INPUTS")
        && !v.trim().is_empty()
    {
        config.extra_inputs = Some(v.clone());
    }

    if let Some(v) = envs.get("ENV_LOG_LEVEL") {
        match crate::log::parse_level(v) {
            Some(level) => config.log_level = Some(level),
            None => warn!("invalid log level {v} in env, ignored"),
        }
    }
}
