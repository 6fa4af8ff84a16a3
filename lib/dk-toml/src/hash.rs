/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use toml::{Table, Value};

pub fn foreach_kv<F>(table: &Table, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Value) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        f(k, v).context(format!("failed to parse value of key {k}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn foreach_kv_ok() {
        let table = toml_table!("a = 1\nb = 2");
        let mut result = Vec::new();
        let res = foreach_kv(&table, |k, v| {
            result.push((k.to_owned(), v.as_integer().unwrap()));
            Ok(())
        });
        assert!(res.is_ok());
        assert_eq!(result, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn foreach_kv_err() {
        let table = toml_table!("a = 1");
        let e = foreach_kv(&table, |k, _| Err(anyhow!("error at {k}"))).unwrap_err();
        assert_eq!(e.to_string(), "failed to parse value of key a");
    }
}
