// Shared helpers for the integration tests. Not every test target
// uses every helper.
#![allow(dead_code)]

pub mod daemon_guard;
pub mod polling;
