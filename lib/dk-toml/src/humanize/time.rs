/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use humanize_rs::ParseError;
use toml::Value;

pub fn as_duration(v: &Value) -> anyhow::Result<Duration> {
    match v {
        Value::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Value::Integer(value) => {
            if let Ok(u) = u64::try_from(*value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("negative duration value"))
            }
        }
        Value::Float(f) => Duration::try_from_secs_f64(*f).map_err(anyhow::Error::new),
        _ => Err(anyhow!(
            "toml value type for humanize duration should be 'string' or 'integer' or 'float'"
        )),
    }
}
