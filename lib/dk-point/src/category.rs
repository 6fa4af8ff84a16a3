/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown category {0}")]
pub struct ParseCategoryError(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Metric,
    Network,
    KeyEvent,
    Object,
    CustomObject,
    Logging,
    Tracing,
    Rum,
    Security,
    Profiling,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Metric,
        Category::Network,
        Category::KeyEvent,
        Category::Object,
        Category::CustomObject,
        Category::Logging,
        Category::Tracing,
        Category::Rum,
        Category::Security,
        Category::Profiling,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Metric => "metric",
            Category::Network => "network",
            Category::KeyEvent => "keyevent",
            Category::Object => "object",
            Category::CustomObject => "custom_object",
            Category::Logging => "logging",
            Category::Tracing => "tracing",
            Category::Rum => "rum",
            Category::Security => "security",
            Category::Profiling => "profiling",
        }
    }

    pub const fn alias(&self) -> &'static str {
        match self {
            Category::Metric => "M",
            Category::Network => "N",
            Category::KeyEvent => "E",
            Category::Object => "O",
            Category::CustomObject => "CO",
            Category::Logging => "L",
            Category::Tracing => "T",
            Category::Rum => "R",
            Category::Security => "S",
            Category::Profiling => "P",
        }
    }

    pub const fn url(&self) -> &'static str {
        match self {
            Category::Metric => "/v1/write/metric",
            Category::Network => "/v1/write/network",
            Category::KeyEvent => "/v1/write/keyevent",
            Category::Object => "/v1/write/object",
            Category::CustomObject => "/v1/write/custom_object",
            Category::Logging => "/v1/write/logging",
            Category::Tracing => "/v1/write/tracing",
            Category::Rum => "/v1/write/rum",
            Category::Security => "/v1/write/security",
            Category::Profiling => "/v1/write/profiling",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Category::ALL {
            if s == c.alias() || s == c.url() || s.eq_ignore_ascii_case(c.as_str()) {
                return Ok(c);
            }
        }
        match s.to_lowercase().as_str() {
            "key_event" | "event" => Ok(Category::KeyEvent),
            "customobject" | "custom-object" => Ok(Category::CustomObject),
            "log" => Ok(Category::Logging),
            "trace" => Ok(Category::Tracing),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}
