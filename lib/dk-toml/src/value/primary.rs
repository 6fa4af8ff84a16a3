/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use toml::{Table, Value};

pub fn as_u32(v: &Value) -> anyhow::Result<u32> {
    match v {
        Value::String(s) => Ok(u32::from_str(s)?),
        Value::Integer(i) => Ok(u32::try_from(*i)?),
        _ => Err(anyhow!(
            "toml value type for 'u32' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_usize(v: &Value) -> anyhow::Result<usize> {
    match v {
        Value::String(s) => Ok(usize::from_str(s)?),
        Value::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "toml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub fn as_bool(v: &Value) -> anyhow::Result<bool> {
    match v {
        Value::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid toml string value for 'bool': {s}")),
        },
        Value::Boolean(value) => Ok(*value),
        Value::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "toml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

pub fn as_string(v: &Value) -> anyhow::Result<String> {
    match v {
        Value::String(s) => Ok(s.to_string()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        _ => Err(anyhow!(
            "toml value type for string should be 'string' / 'integer' / 'float' / 'boolean'"
        )),
    }
}

pub fn as_table(v: &Value) -> anyhow::Result<&Table> {
    match v {
        Value::Table(t) => Ok(t),
        _ => Err(anyhow!("the toml value should be a 'table'")),
    }
}

pub fn as_list<T, F>(v: &Value, convert: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&Value) -> anyhow::Result<T>,
{
    let mut vec = Vec::new();
    match v {
        Value::Array(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let node = convert(v).context(format!("invalid value for list element #{i}"))?;
                vec.push(node);
            }
        }
        _ => {
            let node = convert(v).context("invalid single value for the list")?;
            vec.push(node);
        }
    }
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_usize_ok() {
        assert_eq!(as_usize(&Value::Integer(6)).unwrap(), 6);
        assert!(as_usize(&Value::String("six".to_string())).is_err());
    }

    #[test]
    fn as_bool_ok() {
        assert!(as_bool(&Value::Boolean(true)).unwrap());
        assert!(as_bool(&Value::String("On".to_string())).unwrap());
        assert!(!as_bool(&Value::String("no".to_string())).unwrap());
        assert!(!as_bool(&Value::Integer(0)).unwrap());
        assert!(as_bool(&Value::String("maybe".to_string())).is_err());
        assert!(as_bool(&Value::Float(1.0)).is_err());
    }

    #[test]
    fn as_string_ok() {
        assert_eq!(as_string(&Value::String("a".to_string())).unwrap(), "a");
        assert_eq!(as_string(&Value::Integer(10)).unwrap(), "10");
        assert_eq!(as_string(&Value::Boolean(false)).unwrap(), "false");
        assert!(as_string(&Value::Array(vec![])).is_err());
    }

    #[test]
    fn as_list_ok() {
        let table = toml_table!("a = [\"x\", \"y\"]\nb = \"z\"\nc = [1, []]");
        let v = as_list(table.get("a").unwrap(), as_string).unwrap();
        assert_eq!(v, vec!["x".to_string(), "y".to_string()]);
        let v = as_list(table.get("b").unwrap(), as_string).unwrap();
        assert_eq!(v, vec!["z".to_string()]);
        assert!(as_list(table.get("c").unwrap(), as_string).is_err());
    }
}
