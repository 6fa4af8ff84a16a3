/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use toml::Value;

use dk_point::{Category, TagMap};

pub fn as_tag_map(v: &Value) -> anyhow::Result<TagMap> {
    let table = super::as_table(v)?;
    let mut tags = TagMap::default();
    for (k, v) in table.iter() {
        if k.is_empty() {
            return Err(anyhow!("empty tag key is not allowed"));
        }
        let value = super::as_string(v).map_err(|e| anyhow!("invalid value for tag {k}: {e}"))?;
        tags.insert(k, value);
    }
    Ok(tags)
}

pub fn as_category(v: &Value) -> anyhow::Result<Category> {
    if let Value::String(s) = v {
        Category::from_str(s).map_err(|e| anyhow!("invalid category: {e}"))
    } else {
        Err(anyhow!("toml value type for 'category' should be 'string'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_map() {
        let table = toml_table!("[tags]\nregion = \"cn\"\nport = 9100");
        let tags = as_tag_map(table.get("tags").unwrap()).unwrap();
        assert_eq!(tags.get("region"), Some("cn"));
        assert_eq!(tags.get("port"), Some("9100"));

        let table = toml_table!("[tags]\nsub = { a = 1 }");
        assert!(as_tag_map(table.get("tags").unwrap()).is_err());

        assert!(as_tag_map(&Value::String("a=b".to_string())).is_err());
    }

    #[test]
    fn category() {
        let v = Value::String("metric".to_string());
        assert_eq!(as_category(&v).unwrap(), Category::Metric);
        let v = Value::String("L".to_string());
        assert_eq!(as_category(&v).unwrap(), Category::Logging);
        let v = Value::String("unknown".to_string());
        assert!(as_category(&v).is_err());
        assert!(as_category(&Value::Integer(1)).is_err());
    }
}
