/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

macro_rules! toml_table {
    ($s:expr) => {
        $s.parse::<toml::Table>().unwrap()
    };
}
