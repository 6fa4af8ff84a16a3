/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod point;
mod primary;

pub use point::{as_category, as_tag_map};
pub use primary::{as_bool, as_list, as_string, as_table, as_u32, as_usize};
