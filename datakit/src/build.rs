/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

const BUILD_HOST: &str = env!("DK_BUILD_HOST");
const BUILD_TARGET: &str = env!("DK_BUILD_TARGET");
const BUILD_PROFILE: &str = env!("DK_BUILD_PROFILE");
const BUILD_OPT_LEVEL: &str = env!("DK_BUILD_OPT_LEVEL");
const BUILD_DEBUG: &str = env!("DK_BUILD_DEBUG");

const PACKAGE_VERSION: Option<&str> = option_env!("DK_PACKAGE_VERSION");

pub fn print_version(verbose_level: u8) {
    println!("{PKG_NAME} {VERSION}");
    if verbose_level > 1 {
        println!("Host: {BUILD_HOST}, Target: {BUILD_TARGET}");
        println!("Profile: {BUILD_PROFILE}, Opt Level: {BUILD_OPT_LEVEL}, Debug: {BUILD_DEBUG}");
        if let Some(package_version) = PACKAGE_VERSION {
            println!("Package Version: {package_version}");
        }
    }
}
