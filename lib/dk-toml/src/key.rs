/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t() {
        assert_eq!(normalize("Abc"), "abc");
        assert_eq!(normalize("MAX-CRASH"), "max_crash");
        assert_eq!(normalize("startup-Jitter"), "startup_jitter");
        assert_eq!(normalize("thread_number"), "thread_number");
    }
}
