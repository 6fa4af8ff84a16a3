/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::env;

fn main() {
    for (name, var) in [
        ("DK_BUILD_HOST", "HOST"),
        ("DK_BUILD_TARGET", "TARGET"),
        ("DK_BUILD_PROFILE", "PROFILE"),
        ("DK_BUILD_OPT_LEVEL", "OPT_LEVEL"),
        ("DK_BUILD_DEBUG", "DEBUG"),
    ] {
        let value = env::var(var).unwrap_or_default();
        println!("cargo:rustc-env={name}={value}");
    }

    println!("cargo:rerun-if-env-changed=DK_PACKAGE_VERSION");
    if let Ok(v) = env::var("DK_PACKAGE_VERSION") {
        println!("cargo:rustc-env=DK_PACKAGE_VERSION={v}");
    }
}
