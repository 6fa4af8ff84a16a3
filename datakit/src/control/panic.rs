/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::any::Any;

use log::warn;

/// Extract the message of a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "-"
    }
}

pub fn set_hook() {
    std::panic::set_hook(Box::new(move |panic_info| {
        let panic_message = payload_message(panic_info.payload());

        let thread = std::thread::current();
        let thread = thread.name().unwrap_or("unknown");
        if let Some(location) = panic_info.location() {
            warn!(
                "thread '{thread}' panicked at {}:{}:{}: {panic_message}",
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            warn!("thread '{thread}' panicked: {panic_message}");
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message() {
        let p: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(payload_message(p.as_ref()), "static");
        let p: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(payload_message(p.as_ref()), "owned");
        let p: Box<dyn Any + Send> = Box::new(1u8);
        assert_eq!(payload_message(p.as_ref()), "-");
    }
}
