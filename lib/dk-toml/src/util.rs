/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use toml::Table;

pub fn parse_str(s: &str) -> anyhow::Result<Table> {
    s.parse::<Table>()
        .map_err(|e| anyhow!("invalid toml document: {e}"))
}

pub fn load_file(path: &Path) -> anyhow::Result<Table> {
    let content = std::fs::read_to_string(path)
        .context(format!("failed to read file {}", path.display()))?;
    parse_str(&content).context(format!("failed to parse file {}", path.display()))
}
