//! Common test utilities for fhost
//!
//! Helpers for building timestamps and command lists so individual tests
//! stay focused on the behavior they check.

#![allow(dead_code)]

use fhost_lib::operations::Output;

/// ISO-8601 timestamp `secs` seconds after 2023-01-01T00:00:00.
pub fn ts(secs: u32) -> String {
    format!(
        "2023-01-01T{:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Build a raw command from string-like parts.
pub fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// Shorthand for a names output.
pub fn names(names: &[&str]) -> Output {
    Output::Names(names.iter().map(|n| n.to_string()).collect())
}
