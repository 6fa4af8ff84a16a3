/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};

use crate::{FieldValue, Point};

impl Point {
    pub fn display_line_proto(&self) -> DisplayLineProto<'_> {
        DisplayLineProto(self)
    }
}

pub struct DisplayLineProto<'a>(&'a Point);

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, escape_equal: bool) -> fmt::Result {
    for c in s.chars() {
        match c {
            ',' | ' ' => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            '=' if escape_equal => f.write_str("\\=")?,
            '\n' => f.write_str("\\n")?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

fn write_value(f: &mut fmt::Formatter<'_>, v: &FieldValue) -> fmt::Result {
    match v {
        FieldValue::Int(i) => {
            f.write_str(itoa::Buffer::new().format(*i))?;
            f.write_char('i')
        }
        FieldValue::Uint(u) => {
            f.write_str(itoa::Buffer::new().format(*u))?;
            f.write_char('u')
        }
        FieldValue::Float(v) => f.write_str(ryu::Buffer::new().format(*v)),
        FieldValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        FieldValue::String(s) => write_quoted(f, s),
        FieldValue::Bytes(b) => write_quoted(f, &hex::encode(b)),
    }
}

impl fmt::Display for DisplayLineProto<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pt = self.0;
        write_escaped(f, pt.name(), false)?;
        for (k, v) in pt.tags().iter() {
            f.write_char(',')?;
            write_escaped(f, k, true)?;
            f.write_char('=')?;
            write_escaped(f, v, true)?;
        }

        let mut first = true;
        for (k, v) in pt.fields() {
            f.write_char(if first { ' ' } else { ',' })?;
            first = false;
            write_escaped(f, k, true)?;
            f.write_char('=')?;
            write_value(f, v)?;
        }

        f.write_char(' ')?;
        f.write_str(itoa::Buffer::new().format(pt.unix_nanos()))
    }
}

/// Encode points as newline separated line protocol.
pub fn encode_lines(points: &[Point]) -> String {
    let mut s = String::with_capacity(points.len() * 128);
    for pt in points {
        let _ = writeln!(s, "{}", pt.display_line_proto());
    }
    s
}
