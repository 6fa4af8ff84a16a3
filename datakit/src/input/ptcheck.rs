/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Compare points emitted by an input against its documentation.

use std::collections::HashSet;

use dk_point::{Point, TagMap};

use super::measurement::MeasurementInfo;

pub struct PointChecker {
    doc: Option<MeasurementInfo>,
    optional_tags: HashSet<String>,
    optional_fields: HashSet<String>,
    extra_tags: TagMap,
    type_checking: bool,
    expect: Option<Point>,
}

impl Default for PointChecker {
    fn default() -> Self {
        PointChecker {
            doc: None,
            optional_tags: HashSet::new(),
            optional_fields: HashSet::new(),
            extra_tags: TagMap::default(),
            type_checking: true,
            expect: None,
        }
    }
}

impl PointChecker {
    pub fn with_doc(mut self, doc: MeasurementInfo) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn with_optional_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_optional_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_extra_tags(mut self, tags: &TagMap) -> Self {
        for (k, v) in tags.iter() {
            self.extra_tags.insert(k, v);
        }
        self
    }

    pub fn with_type_checking(mut self, on: bool) -> Self {
        self.type_checking = on;
        self
    }

    pub fn with_expect_point(mut self, pt: Point) -> Self {
        self.expect = Some(pt);
        self
    }

    pub fn check(&self, pt: &Point) -> Vec<String> {
        let mut msgs = Vec::new();

        for (k, v) in self.extra_tags.iter() {
            match pt.get_tag(k) {
                Some(got) if got == v => {}
                Some(got) => msgs.push(format!(
                    "extra tag {k} should be {v:?}, got {got:?}"
                )),
                None => msgs.push(format!("extra tag {k} not found")),
            }
        }

        if let Some(doc) = &self.doc {
            self.check_doc(doc, pt, &mut msgs);
        }
        if let Some(expect) = &self.expect {
            check_expect(expect, pt, &mut msgs);
        }
        msgs
    }

    fn check_doc(&self, doc: &MeasurementInfo, pt: &Point, msgs: &mut Vec<String>) {
        if doc.name != pt.name() {
            msgs.push(format!(
                "measurement name not equal, expect {}, got {}",
                doc.name,
                pt.name()
            ));
        }

        for k in doc.tags.keys() {
            if !pt.tags().contains_key(k) && !self.optional_tags.contains(k) {
                msgs.push(format!("tag {k} not found, point: {}", pt.display_line_proto()));
            }
        }
        for k in pt.tags().keys() {
            if !doc.tags.contains_key(k) && !self.extra_tags.contains_key(k) {
                msgs.push(format!("unknown tag {k} in point"));
            }
        }

        for (k, info) in &doc.fields {
            match pt.get_field(k) {
                Some(v) => {
                    let actual = v.data_type();
                    if self.type_checking && info.data_type != actual {
                        msgs.push(format!(
                            "field {k} type mismatch, expect {}, got {actual}",
                            info.data_type
                        ));
                    }
                }
                None => {
                    if !self.optional_fields.contains(k) {
                        msgs.push(format!("field {k} not found"));
                    }
                }
            }
        }
        for k in pt.fields().keys() {
            if !doc.fields.contains_key(k) {
                msgs.push(format!("unknown field {k} in point"));
            }
        }
    }
}

fn check_expect(expect: &Point, pt: &Point, msgs: &mut Vec<String>) {
    if expect.name() != pt.name() {
        msgs.push(format!(
            "measurement name not equal, expect {}, got {}",
            expect.name(),
            pt.name()
        ));
    }

    for (k, v) in expect.tags().iter() {
        match pt.get_tag(k) {
            Some(got) if got == v => {}
            Some(got) => msgs.push(format!("tag {k} expect {v:?}, got {got:?}")),
            None => msgs.push(format!("tag {k} not found")),
        }
    }
    for k in pt.tags().keys() {
        if !expect.tags().contains_key(k) {
            msgs.push(format!("unexpected tag {k}"));
        }
    }

    for (k, v) in expect.fields() {
        match pt.get_field(k) {
            Some(got) if got == v => {}
            Some(got) => msgs.push(format!("field {k} expect {v}, got {got}")),
            None => msgs.push(format!("field {k} not found")),
        }
    }
    for k in pt.fields().keys() {
        if !expect.fields().contains_key(k) {
            msgs.push(format!("unexpected field {k}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::measurement::{FieldInfo, FieldType, Unit};
    use dk_point::{Category, DataType};

    fn doc() -> MeasurementInfo {
        MeasurementInfo::new("apache", Category::Metric)
            .tag("url", "Apache server status url")
            .tag("server_version", "Apache server version")
            .field(
                "idle_workers",
                FieldInfo::new(DataType::Int, FieldType::Gauge, Unit::Count, "idle"),
            )
            .field(
                "cpu_load",
                FieldInfo::new(DataType::Float, FieldType::Gauge, Unit::Percent, "load"),
            )
            .field(
                "closing_connection",
                FieldInfo::new(DataType::Int, FieldType::Gauge, Unit::Count, "closing"),
            )
    }

    fn point() -> Point {
        Point::builder("apache")
            .tag("url", "http://127.0.0.1/server-status?auto")
            .tag("host", "web-1")
            .field("idle_workers", 12u64)
            .field("cpu_load", 0.3)
            .build()
            .unwrap()
    }

    #[test]
    fn doc_ok() {
        let extra = TagMap::from_iter([("host", "web-1")]);
        let checker = PointChecker::default()
            .with_doc(doc())
            .with_optional_tags(["server_version"])
            .with_optional_fields(["closing_connection"])
            .with_extra_tags(&extra);
        let msgs = checker.check(&point());
        assert!(msgs.is_empty(), "{msgs:?}");
    }

    #[test]
    fn doc_missing_and_unknown() {
        let checker = PointChecker::default().with_doc(doc());
        let msgs = checker.check(&point());
        assert_eq!(msgs.len(), 3, "{msgs:?}");
        assert!(msgs.iter().any(|m| m.starts_with("tag server_version not found")));
        assert!(msgs.iter().any(|m| m == "field closing_connection not found"));
        assert!(msgs.iter().any(|m| m == "unknown tag host in point"));
    }

    #[test]
    fn type_check() {
        let pt = Point::builder("apache")
            .field("idle_workers", "12")
            .field("cpu_load", 1i64)
            .field("closing_connection", 0i64)
            .build()
            .unwrap();
        let checker = PointChecker::default()
            .with_doc(doc())
            .with_optional_tags(["url", "server_version"]);
        assert_eq!(checker.check(&pt).len(), 2);

        let checker = checker.with_type_checking(false);
        assert!(checker.check(&pt).is_empty());
    }

    #[test]
    fn extra_tag_value() {
        let extra = TagMap::from_iter([("host", "web-2"), ("zone", "a")]);
        let msgs = PointChecker::default()
            .with_extra_tags(&extra)
            .check(&point());
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn expect_point() {
        let expect = point();
        assert!(
            PointChecker::default()
                .with_expect_point(expect.clone())
                .check(&point())
                .is_empty()
        );

        let other = Point::builder("apache")
            .tag("url", "http://127.0.0.1/server-status?auto")
            .field("idle_workers", 13u64)
            .field("busy_workers", 1u64)
            .build()
            .unwrap();
        let msgs = PointChecker::default()
            .with_expect_point(expect)
            .check(&other);
        assert_eq!(msgs.len(), 4, "{msgs:?}");
    }
}
