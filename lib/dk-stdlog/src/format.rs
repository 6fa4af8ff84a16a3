/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Arguments;

use slog::{KV, OwnedKVList, Record, Serializer};

use super::StdLogValue;

pub struct StdLogFormatter {
    append_code_position: bool,
}

impl StdLogFormatter {
    pub(crate) fn new(append_code_position: bool) -> Self {
        StdLogFormatter {
            append_code_position,
        }
    }

    pub(crate) fn format_slog(
        &self,
        record: &Record,
        logger_values: &OwnedKVList,
    ) -> Result<StdLogValue, slog::Error> {
        let mut kv_pairs = Vec::new();
        let mut kv_formatter = FormatterKv(&mut kv_pairs);

        logger_values.serialize(record, &mut kv_formatter)?;
        record.kv().serialize(record, &mut kv_formatter)?;

        let position = if self.append_code_position {
            let file = record.file();
            let file = file.rsplit_once('/').map(|x| x.1).unwrap_or(file);
            Some(format!("{file}:{}", record.line()))
        } else {
            None
        };

        Ok(StdLogValue {
            level: record.level(),
            module: record.module().to_string(),
            message: record.msg().to_string(),
            kv_pairs,
            position,
        })
    }
}

struct FormatterKv<'a>(&'a mut Vec<(String, String)>);

impl Serializer for FormatterKv<'_> {
    fn emit_u64(&mut self, key: slog::Key, value: u64) -> slog::Result {
        self.emit_str(key, itoa::Buffer::new().format(value))
    }

    fn emit_i64(&mut self, key: slog::Key, value: i64) -> slog::Result {
        self.emit_str(key, itoa::Buffer::new().format(value))
    }

    fn emit_bool(&mut self, key: slog::Key, value: bool) -> slog::Result {
        self.emit_str(key, if value { "true" } else { "false" })
    }

    fn emit_none(&mut self, _key: slog::Key) -> slog::Result {
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, value: &str) -> slog::Result {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn emit_arguments(&mut self, key: slog::Key, value: &Arguments) -> slog::Result {
        self.0.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
