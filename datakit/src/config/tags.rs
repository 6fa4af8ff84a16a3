/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::warn;

use dk_point::TagMap;

use super::{HostInfo, MainConfig};

const TAG_HOST: &str = "host";
const TAG_ELECTION_NAMESPACE: &str = "election_namespace";
const IP_UNAVAILABLE: &str = "unavailable";

/// Tags added to every point, by gating mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalTags {
    pub host: TagMap,
    pub election: TagMap,
}

impl GlobalTags {
    pub fn build(config: &MainConfig, host: &HostInfo) -> Self {
        let mut host_tags = resolve_placeholders(&config.global_host_tags, host);
        // not user modifiable
        host_tags.insert(TAG_HOST, host.hostname.as_str());

        let election = if config.election.enable {
            let mut tags = resolve_placeholders(&config.election.tags, host);
            if config.election.enable_namespace_tag {
                tags.insert(TAG_ELECTION_NAMESPACE, config.election.namespace.as_str());
            }
            tags
        } else {
            host_tags.clone()
        };

        GlobalTags {
            host: host_tags,
            election,
        }
    }
}

fn resolve_placeholders(tags: &TagMap, host: &HostInfo) -> TagMap {
    let mut out = TagMap::default();
    for (k, v) in tags.iter() {
        match v.to_lowercase().as_str() {
            "__datakit_hostname" | "$datakit_hostname" => {
                out.insert(k, host.hostname.as_str());
            }
            "__datakit_ip" | "$datakit_ip" => match host.ip {
                Some(ip) => {
                    out.insert(k, ip.to_string());
                }
                None => {
                    warn!("no local ip address found, set global tag {k} to {IP_UNAVAILABLE}");
                    out.insert(k, IP_UNAVAILABLE);
                }
            },
            "__datakit_uuid" | "__datakit_id" | "$datakit_uuid" | "$datakit_id" => {
                out.insert(k, host.run_id.as_str());
            }
            _ => {
                out.insert(k, v);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn host() -> HostInfo {
        HostInfo {
            hostname: "node-1".to_string(),
            ip: Some(Ipv4Addr::new(192, 168, 1, 2)),
            run_id: "abc".to_string(),
        }
    }

    #[test]
    fn placeholders() {
        let mut config = MainConfig::default();
        config.global_host_tags.insert("h", "__datakit_hostname");
        config.global_host_tags.insert("ip", "$datakit_ip");
        config.global_host_tags.insert("id", "__datakit_id");
        config.global_host_tags.insert("uuid", "$datakit_uuid");
        config.global_host_tags.insert("rid", "$DATAKIT_ID");
        config.global_host_tags.insert("region", "cn");

        let tags = GlobalTags::build(&config, &host());
        assert_eq!(tags.host.get("h"), Some("node-1"));
        assert_eq!(tags.host.get("ip"), Some("192.168.1.2"));
        assert_eq!(tags.host.get("id"), Some("abc"));
        assert_eq!(tags.host.get("uuid"), Some("abc"));
        assert_eq!(tags.host.get("rid"), Some("abc"));
        assert_eq!(tags.host.get("region"), Some("cn"));
        assert_eq!(tags.host.get("host"), Some("node-1"));
        assert_eq!(tags.election, tags.host);

        let mut no_ip = host();
        no_ip.ip = None;
        let tags = GlobalTags::build(&config, &no_ip);
        assert_eq!(tags.host.get("ip"), Some("unavailable"));
    }

    #[test]
    fn election() {
        let mut config = MainConfig::default();
        config.global_host_tags.insert("host", "h1");
        config.election.enable = true;
        config.election.namespace = "prod".to_string();
        config.election.enable_namespace_tag = true;
        config.election.tags.insert("project", "a");

        let tags = GlobalTags::build(&config, &host());
        assert_eq!(tags.host.get("host"), Some("node-1"));
        assert_eq!(tags.election.get("project"), Some("a"));
        assert_eq!(tags.election.get("election_namespace"), Some("prod"));
        assert!(!tags.election.contains_key("host"));
    }
}
