/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{FieldValue, TagMap};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointError {
    #[error("empty measurement name")]
    EmptyName,
    #[error("no field in point {0}")]
    NoField(String),
    #[error("empty tag key")]
    EmptyTagKey,
    #[error("empty field key")]
    EmptyFieldKey,
    #[error("key {0} used both as tag and field")]
    KeyConflict(String),
    #[error("field {0} has non-finite float value")]
    InvalidFloat(String),
}

/// A single observation. Built once through [`PointBuilder`] and never
/// modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    name: String,
    tags: TagMap,
    fields: BTreeMap<String, FieldValue>,
    time: DateTime<Utc>,
}

impl Point {
    pub fn builder<S: Into<String>>(name: S) -> PointBuilder {
        PointBuilder::new(name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    #[inline]
    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    #[inline]
    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    #[inline]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn unix_nanos(&self) -> i64 {
        self.time
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.time.timestamp().saturating_mul(1_000_000_000))
    }
}

pub struct PointBuilder {
    name: String,
    tags: TagMap,
    fields: BTreeMap<String, FieldValue>,
    time: Option<DateTime<Utc>>,
}

impl PointBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        PointBuilder {
            name: name.into(),
            tags: TagMap::default(),
            fields: BTreeMap::new(),
            time: None,
        }
    }

    pub fn tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.insert(key, value);
        self
    }

    pub fn tags(mut self, tags: &TagMap) -> Self {
        for (k, v) in tags.iter() {
            self.tags.insert(k, v);
        }
        self
    }

    pub fn field<K: Into<String>, V: Into<FieldValue>>(mut self, key: K, value: V) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn build(self) -> Result<Point, PointError> {
        if self.name.is_empty() {
            return Err(PointError::EmptyName);
        }
        if self.fields.is_empty() {
            return Err(PointError::NoField(self.name));
        }
        if self.tags.keys().any(|k| k.is_empty()) {
            return Err(PointError::EmptyTagKey);
        }
        for (k, v) in &self.fields {
            if k.is_empty() {
                return Err(PointError::EmptyFieldKey);
            }
            if self.tags.contains_key(k) {
                return Err(PointError::KeyConflict(k.clone()));
            }
            if let FieldValue::Float(f) = v
                && !f.is_finite()
            {
                return Err(PointError::InvalidFloat(k.clone()));
            }
        }

        Ok(Point {
            name: self.name,
            tags: self.tags,
            fields: self.fields,
            time: self.time.unwrap_or_else(Utc::now),
        })
    }
}
