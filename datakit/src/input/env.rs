/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::EnvMap;

const ENV_PREFIXES: &[&str] = &["ENV_", "DK_"];

fn is_agent_env(key: &str) -> bool {
    ENV_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Filter the agent related variables out of `vars`.
pub fn collect_from<I>(vars: I) -> EnvMap
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter().filter(|(k, _)| is_agent_env(k)).collect()
}

/// All `ENV_` and `DK_` prefixed variables of the process.
pub fn collect() -> EnvMap {
    collect_from(std::env::vars())
}
