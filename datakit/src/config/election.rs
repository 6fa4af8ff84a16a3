/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use toml::Table;

use dk_point::TagMap;

pub const DEFAULT_ELECTION_NAMESPACE: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectionConfig {
    pub enable: bool,
    pub namespace: String,
    pub enable_namespace_tag: bool,
    pub tags: TagMap,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        ElectionConfig {
            enable: false,
            namespace: DEFAULT_ELECTION_NAMESPACE.to_string(),
            enable_namespace_tag: false,
            tags: TagMap::default(),
        }
    }
}

impl ElectionConfig {
    pub(super) fn parse(table: &Table) -> anyhow::Result<Self> {
        let mut config = ElectionConfig::default();
        dk_toml::foreach_kv(table, |k, v| match dk_toml::key::normalize(k).as_str() {
            "enable" => {
                config.enable = dk_toml::value::as_bool(v)?;
                Ok(())
            }
            "namespace" => {
                config.set_namespace(dk_toml::value::as_string(v)?);
                Ok(())
            }
            "enable_namespace_tag" => {
                config.enable_namespace_tag = dk_toml::value::as_bool(v)?;
                Ok(())
            }
            "tags" => {
                config.tags = dk_toml::value::as_tag_map(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }

    pub(super) fn set_namespace(&mut self, namespace: String) {
        if namespace.is_empty() {
            self.namespace = DEFAULT_ELECTION_NAMESPACE.to_string();
        } else {
            self.namespace = namespace;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let table = dk_toml::parse_str("enable = \"on\"\nnamespace = \"\"\n[tags]\na = \"1\"").unwrap();
        let config = ElectionConfig::parse(&table).unwrap();
        assert!(config.enable);
        assert_eq!(config.namespace, "default");
        assert_eq!(config.tags.get("a"), Some("1"));

        let table = dk_toml::parse_str("leader = true").unwrap();
        assert!(ElectionConfig::parse(&table).is_err());
    }
}
