/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

use url::Url;

use dk_point::TagMap;

fn is_loopback_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    let host = host.trim_start_matches('[').trim_end_matches(']');
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback(),
        Err(_) => false,
    }
}

fn parse_remote_host(remote: &str) -> Option<String> {
    if let Ok(u) = Url::parse(remote)
        && let Some(host) = u.host_str()
        && !host.is_empty()
    {
        return Some(host.trim_start_matches('[').trim_end_matches(']').to_string());
    }

    // plain host:port
    let host = match remote.rsplit_once(':') {
        Some((h, port)) if port.parse::<u16>().is_ok() => h,
        _ => remote,
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() || host.contains('/') {
        None
    } else {
        Some(host.to_string())
    }
}

/// Merge input tags with the global tags.
///
/// When `remote` is given and `origin` has no `host` tag, the host part of
/// `remote` becomes the `host` tag unless it is a loopback address.
/// Global tags only fill keys that are still missing.
pub fn merge_tags(global: &TagMap, origin: &TagMap, remote: &str) -> TagMap {
    let mut out = origin.clone();

    if !remote.is_empty()
        && !out.contains_key("host")
        && let Some(host) = parse_remote_host(remote)
        && !is_loopback_host(&host)
    {
        out.insert("host", host);
    }

    out.fill(global);
    out
}

/// Like [`merge_tags`] but fill `input_tags` into `origin` first.
pub fn merge_tags_wrapper(
    origin: &TagMap,
    global: &TagMap,
    input_tags: &TagMap,
    remote: &str,
) -> TagMap {
    let mut origin = origin.clone();
    origin.fill(input_tags);
    merge_tags(global, &origin, remote)
}

/// Align the next collect time to the last one.
///
/// All values are in milliseconds. The aligned value is `last + interval`,
/// unless the trigger time drifted more than 10% of the interval away from it.
pub fn align_time_millis(trigger: i64, last: i64, interval: i64) -> i64 {
    let next = last.saturating_add(interval);
    if interval <= 0 {
        return trigger;
    }
    let drift = (trigger - next).unsigned_abs() as f64;
    if drift / interval as f64 > 0.1 {
        trigger
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(kv: &[(&str, &str)]) -> TagMap {
        TagMap::from_iter(kv.iter().copied())
    }

    #[test]
    fn merge_remote_url() {
        let global = tags(&[("project", "p1"), ("host", "dk-host")]);
        let origin = tags(&[("service", "nginx")]);

        let out = merge_tags(&global, &origin, "http://10.0.0.8:8080/status");
        assert_eq!(out.get("host"), Some("10.0.0.8"));
        assert_eq!(out.get("project"), Some("p1"));
        assert_eq!(out.get("service"), Some("nginx"));
    }

    #[test]
    fn merge_remote_host_port() {
        let out = merge_tags(&TagMap::default(), &TagMap::default(), "db.internal:3306");
        assert_eq!(out.get("host"), Some("db.internal"));
    }

    #[test]
    fn merge_loopback() {
        let global = tags(&[("host", "dk-host")]);
        for remote in [
            "http://localhost:80",
            "http://127.0.0.1/status",
            "localhost:9200",
            "http://[::1]:8080",
        ] {
            let out = merge_tags(&global, &TagMap::default(), remote);
            assert_eq!(out.get("host"), Some("dk-host"), "remote {remote}");
        }
    }

    #[test]
    fn merge_origin_host_kept() {
        let origin = tags(&[("host", "mine")]);
        let out = merge_tags(&TagMap::default(), &origin, "http://10.1.1.1");
        assert_eq!(out.get("host"), Some("mine"));
    }

    #[test]
    fn merge_no_remote() {
        let global = tags(&[("a", "g"), ("b", "g")]);
        let origin = tags(&[("a", "o")]);
        let out = merge_tags(&global, &origin, "");
        assert_eq!(out.get("a"), Some("o"));
        assert_eq!(out.get("b"), Some("g"));
        assert!(!out.contains_key("host"));
    }

    #[test]
    fn wrapper() {
        let origin = tags(&[("a", "o")]);
        let input_tags = tags(&[("a", "i"), ("c", "i")]);
        let global = tags(&[("c", "g"), ("d", "g")]);
        let out = merge_tags_wrapper(&origin, &global, &input_tags, "");
        assert_eq!(out.get("a"), Some("o"));
        assert_eq!(out.get("c"), Some("i"));
        assert_eq!(out.get("d"), Some("g"));
    }

    #[test]
    fn align() {
        // within 10% of the interval
        assert_eq!(align_time_millis(10_500, 0, 10_000), 10_000);
        assert_eq!(align_time_millis(9_000, 0, 10_000), 10_000);
        // drifted too far
        assert_eq!(align_time_millis(11_001, 0, 10_000), 11_001);
        assert_eq!(align_time_millis(30_000, 0, 10_000), 30_000);
        assert_eq!(align_time_millis(5_000, 1_000, 0), 5_000);
    }
}
