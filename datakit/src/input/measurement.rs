/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt;

use dk_point::{Category, DataType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Gauge,
    Count,
    Summary,
    Histogram,
    Rate,
    Unknown,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Gauge => "gauge",
            FieldType::Count => "count",
            FieldType::Summary => "summary",
            FieldType::Histogram => "histogram",
            FieldType::Rate => "rate",
            FieldType::Unknown => "-",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    NoUnit,
    Count,
    SizeByte,
    SizeKB,
    SizeMB,
    DurationNS,
    DurationUS,
    DurationMS,
    DurationSecond,
    Percent,
    RequestsPerSec,
    BytesPerSec,
    TimestampMS,
    TimestampSec,
}

impl Unit {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Unit::NoUnit => "-",
            Unit::Count => "count",
            Unit::SizeByte => "B",
            Unit::SizeKB => "KB",
            Unit::SizeMB => "MB",
            Unit::DurationNS => "ns",
            Unit::DurationUS => "μs",
            Unit::DurationMS => "ms",
            Unit::DurationSecond => "s",
            Unit::Percent => "%",
            Unit::RequestsPerSec => "req/s",
            Unit::BytesPerSec => "B/S",
            Unit::TimestampMS => "msec",
            Unit::TimestampSec => "sec",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub data_type: DataType,
    pub field_type: FieldType,
    pub unit: Unit,
    pub desc: String,
}

impl FieldInfo {
    pub fn new(data_type: DataType, field_type: FieldType, unit: Unit, desc: &str) -> Self {
        FieldInfo {
            data_type,
            field_type,
            unit,
            desc: desc.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagInfo {
    pub desc: String,
}

/// Static documentation of one measurement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasurementInfo {
    pub name: String,
    pub category: Category,
    pub desc: String,
    pub fields: BTreeMap<String, FieldInfo>,
    pub tags: BTreeMap<String, TagInfo>,
}

impl MeasurementInfo {
    pub fn new(name: &str, category: Category) -> Self {
        MeasurementInfo {
            name: name.to_string(),
            category,
            desc: String::new(),
            fields: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    pub fn field(mut self, name: &str, info: FieldInfo) -> Self {
        self.fields.insert(name.to_string(), info);
        self
    }

    pub fn tag(mut self, name: &str, desc: &str) -> Self {
        self.tags.insert(
            name.to_string(),
            TagInfo {
                desc: desc.to_string(),
            },
        );
        self
    }
}

/// Markdown tables, as shown in the input documents.
impl fmt::Display for MeasurementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### `{}`", self.name)?;
        if !self.desc.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.desc)?;
        }

        if !self.tags.is_empty() {
            writeln!(f)?;
            writeln!(f, "| Tag | Description |")?;
            writeln!(f, "| ---- | --------- |")?;
            for (name, tag) in &self.tags {
                writeln!(f, "| `{name}` | {} |", tag.desc)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "| Metric | Description | Type | Unit |")?;
        writeln!(f, "| ---- | ---- | :---: | :----: |")?;
        for (name, field) in &self.fields {
            writeln!(
                f,
                "| `{name}` | {} | {} | {} |",
                field.desc, field.data_type, field.unit.as_str()
            )?;
        }
        Ok(())
    }
}
