/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod agent;
pub mod build;
pub mod config;
pub mod control;
pub mod feed;
pub mod input;
pub mod log;
pub mod opts;
pub mod signal;
