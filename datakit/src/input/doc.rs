/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use anyhow::Context;

use super::{InputError, InputRegistry};

fn write_doc<W: Write>(registry: &InputRegistry, name: &str, w: &mut W) -> anyhow::Result<()> {
    let creator = registry
        .creator(name)
        .ok_or_else(|| InputError::NotRegistered(name.to_string()))?;
    let input = creator();

    writeln!(w, "# {name}\n")?;
    writeln!(w, "catalog: {}\n", input.catalog())?;
    let archs = input.available_archs();
    if !archs.is_empty() {
        writeln!(w, "platforms: {}\n", archs.join(", "))?;
    }
    writeln!(w, "## Config\n")?;
    writeln!(w, "```toml\n{}\n```", input.sample_config().trim_end())?;

    for m in input.sample_measurements() {
        writeln!(w)?;
        write!(w, "{m}")?;
    }
    Ok(())
}

/// Print the sample config and measurements of one input to stdout.
pub fn print_doc(registry: &InputRegistry, name: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_doc(registry, name, &mut stdout).context(format!("failed to print doc of input {name}"))
}
