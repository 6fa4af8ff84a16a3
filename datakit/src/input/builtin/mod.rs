/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::{InputError, InputRegistry};

mod selfstat;
pub use selfstat::{SELF_INPUT_NAME, SelfInput};

/// Register every input shipped with the agent.
pub fn register_all(registry: &InputRegistry) -> Result<(), InputError> {
    selfstat::mark_start();
    registry.add_creator(SELF_INPUT_NAME, selfstat::create)?;
    Ok(())
}
